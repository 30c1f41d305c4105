// Name list normalization: parsing raw text into participant names,
// duplicate detection, and deduplication.
//
// The roster is the single source of truth for a session. Raw input comes
// from the import editor (typed, pasted, or loaded from a text/CSV file by
// the TUI); names are separated by newlines and/or commas. This module only
// ever consumes already-decoded text.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

/// Built-in sample roster for the quick-start path.
pub const SAMPLE_ROSTER: &[&str] = &[
    "王小明", "李美玲", "張大衛", "林志豪", "陳嘉欣",
    "黃雅婷", "劉傑森", "趙自強", "孫曉華", "周公瑾",
    "吳芳如", "徐文才", "朱麗葉", "馬英勇", "郭富貴",
    "曾文玲", "韓小強", "沈佳宜", "潘瑋柏", "蔡英文",
];

#[derive(Debug, Error)]
pub enum ImportError {
    /// The raw text yielded zero valid names after trimming.
    #[error("no valid names found in the input")]
    EmptyInput,

    /// A draw animation is running; the list cannot be replaced mid-spin.
    #[error("a draw is in progress; wait for it to finish before importing")]
    DrawInFlight,
}

/// Tokenize raw text into participant names.
///
/// Splits on newlines and commas, trims whitespace (including `\r` from
/// CRLF files), and drops empty tokens. Input order is preserved and
/// duplicates are retained positionally.
pub fn parse(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Names that occur more than once in the raw input.
///
/// Each duplicated name is reported exactly once, in the order it was
/// first seen, so the report is deterministic for a given input.
pub fn find_duplicates(raw: &str) -> Vec<String> {
    let names = parse(raw);
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for name in &names {
        *counts.entry(name.as_str()).or_insert(0) += 1;
    }

    let mut reported: HashSet<&str> = HashSet::new();
    let mut duplicates = Vec::new();
    for name in &names {
        if counts[name.as_str()] > 1 && reported.insert(name.as_str()) {
            duplicates.push(name.clone());
        }
    }
    duplicates
}

/// Parse raw text keeping only the first occurrence of each name.
pub fn deduplicate(raw: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    parse(raw)
        .into_iter()
        .filter(|name| seen.insert(name.clone()))
        .collect()
}

/// Render a name list back to editor text (comma + space separated).
pub fn render(names: &[String]) -> String {
    names.join(", ")
}

/// The sample roster as editor text.
pub fn sample_text() -> String {
    SAMPLE_ROSTER.join(", ")
}
