// Grouping engine: random partition of the participant list into
// fixed-size groups, plus CSV export of the result.
//
// Groups are produced by a uniform shuffle followed by contiguous chunking,
// so every permutation of members across groups is equally likely. The last
// group may be short when the size does not divide the list length.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Local;
use tracing::info;

use crate::rng::RandomSource;

/// Smallest allowed group size.
pub const MIN_GROUP_SIZE: usize = 2;

/// One group of the partition: 1-based sequential id plus its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub id: usize,
    pub members: Vec<String>,
}

/// Grouping configuration and partition logic.
#[derive(Debug, Clone)]
pub struct GroupingEngine {
    size: usize,
}

impl GroupingEngine {
    pub fn new(size: usize) -> Self {
        GroupingEngine {
            size: size.max(MIN_GROUP_SIZE),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Set the per-group member count, clamped to the minimum of 2.
    pub fn set_size(&mut self, size: usize) {
        self.size = size.max(MIN_GROUP_SIZE);
    }

    /// Partition `list` into groups of `size` members in shuffled order.
    ///
    /// An empty list produces an empty result. Each call fully replaces any
    /// previous partition; nothing accumulates across calls.
    pub fn generate<R: RandomSource>(&self, list: &[String], rng: &mut R) -> Vec<Group> {
        if list.is_empty() {
            return Vec::new();
        }

        let mut shuffled = list.to_vec();
        rng.shuffle(&mut shuffled);

        shuffled
            .chunks(self.size)
            .enumerate()
            .map(|(idx, chunk)| Group {
                id: idx + 1,
                members: chunk.to_vec(),
            })
            .collect()
    }
}

impl Default for GroupingEngine {
    fn default() -> Self {
        Self::new(4)
    }
}

/// Write the grouping result as CSV: header `組別,成員姓名`, one row per
/// (group, member) pair, rows ordered by ascending group id.
pub fn write_csv<W: Write>(groups: &[Group], writer: W) -> anyhow::Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["組別", "成員姓名"])
        .context("failed to write CSV header")?;
    for group in groups {
        let label = format!("第 {} 組", group.id);
        for member in &group.members {
            csv_writer
                .write_record([label.as_str(), member.as_str()])
                .context("failed to write CSV row")?;
        }
    }
    csv_writer.flush().context("failed to flush CSV output")?;
    Ok(())
}

/// Export the grouping result to `dir`, named with the local date
/// (`分組結果_YYYY-MM-DD.csv`). Returns the path written.
pub fn export_csv(groups: &[Group], dir: &Path) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create export directory {}", dir.display()))?;

    let file_name = format!("分組結果_{}.csv", Local::now().format("%Y-%m-%d"));
    let path = dir.join(file_name);
    let file = File::create(&path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    write_csv(groups, file)?;

    info!(path = %path.display(), groups = groups.len(), "exported grouping result");
    Ok(path)
}
