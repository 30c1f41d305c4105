// Application state and orchestration logic.
//
// The central event loop that owns all mutable session state: the imported
// participant list, the draw engine, and the grouping engine. User commands
// arrive over an mpsc channel from the TUI; state snapshots and spin frames
// are pushed back over another. The spin animation is driven by a timer
// tick here, and the winner is selected exactly once when the spin window
// closes.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::draw::{DrawEngine, DrawError, DrawPhase};
use crate::grouping::{self, Group, GroupingEngine};
use crate::protocol::{AppSnapshot, TabId, UiUpdate, UserCommand};
use crate::rng::{RandomSource, SystemRng};
use crate::roster::{self, ImportError};

/// Result of a successful import: how many names were loaded, and which
/// names appear more than once (a non-fatal advisory).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSummary {
    pub count: usize,
    pub duplicates: Vec<String>,
}

/// The complete session state.
///
/// Every transition is a method taking `&mut self` and returning a
/// `Result`; a rejected transition leaves the state exactly as it was.
pub struct AppState {
    pub config: Config,
    /// The current participant list, the single source of truth. The draw
    /// engine holds its own snapshot taken at import time.
    pub participants: Vec<String>,
    pub draw: DrawEngine,
    pub grouping: GroupingEngine,
    /// The last generated partition. Left stale (not cleared) when a new
    /// list is imported; the user regenerates it manually.
    pub groups: Vec<Group>,
    pub active_tab: TabId,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let mut draw = DrawEngine::new();
        if config.allow_repeat {
            // Engine starts in no-repeat mode; honor the configured default.
            let _ = draw.toggle_repeat();
        }
        let grouping = GroupingEngine::new(config.default_group_size);
        AppState {
            config,
            participants: Vec::new(),
            draw,
            grouping,
            groups: Vec::new(),
            active_tab: TabId::Import,
        }
    }

    /// Replace the participant list from raw editor text.
    ///
    /// Refused while a spin is running (`DrawInFlight`) and when the text
    /// contains no valid names (`EmptyInput`); both leave state unchanged.
    /// Duplicate names do not block the import; they are reported in the
    /// summary so the user can decide to deduplicate and re-import.
    pub fn import(&mut self, raw: &str) -> Result<ImportSummary, ImportError> {
        if self.draw.is_spinning() {
            return Err(ImportError::DrawInFlight);
        }
        let names = roster::parse(raw);
        if names.is_empty() {
            return Err(ImportError::EmptyInput);
        }
        let duplicates = roster::find_duplicates(raw);

        self.participants = names;
        self.draw.reset(&self.participants);
        info!(
            count = self.participants.len(),
            duplicates = duplicates.len(),
            "participant list imported"
        );
        Ok(ImportSummary {
            count: self.participants.len(),
            duplicates,
        })
    }

    /// Open the spin window for a draw.
    pub fn start_spin(&mut self) -> Result<(), DrawError> {
        self.draw.begin_draw()
    }

    /// Close the spin window and commit the winner.
    pub fn settle<R: RandomSource>(&mut self, rng: &mut R) -> Result<String, DrawError> {
        self.draw.settle(rng)
    }

    pub fn toggle_repeat(&mut self) -> Result<bool, DrawError> {
        self.draw.toggle_repeat()
    }

    pub fn clear_draw(&mut self) -> Result<(), DrawError> {
        self.draw.clear()
    }

    pub fn set_group_size(&mut self, size: usize) {
        self.grouping.set_size(size);
    }

    /// Regenerate the partition over the full participant list. A session
    /// with no participants is a no-op returning zero groups.
    pub fn generate_groups<R: RandomSource>(&mut self, rng: &mut R) -> usize {
        self.groups = self.grouping.generate(&self.participants, rng);
        self.groups.len()
    }

    /// Build the snapshot pushed to the TUI after each transition.
    pub fn snapshot(&self) -> AppSnapshot {
        let settled_winner = match self.draw.phase() {
            DrawPhase::Settled(winner) => Some(winner.clone()),
            _ => None,
        };
        AppSnapshot {
            participant_count: self.participants.len(),
            remaining: self.draw.pool().len(),
            winners: self.draw.winners().to_vec(),
            allow_repeat: self.draw.allow_repeat(),
            spinning: self.draw.is_spinning(),
            settled_winner,
            group_size: self.grouping.size(),
            groups: self.groups.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// In-flight spin animation bookkeeping.
///
/// `frames` is a uniformly shuffled copy of the participant list; the loop
/// flashes one name per tick, wrapping around. The frames are display-only:
/// the winner comes from the engine at settle time.
struct SpinState {
    frames: Vec<String>,
    next_frame: usize,
    elapsed: Duration,
}

/// Run the app orchestrator until `Quit` or channel closure.
///
/// Single logical owner of all session state; commands and timer ticks are
/// serialized through one `select!` loop, so no locking is needed.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    let mut rng = SystemRng;
    let tick = Duration::from_millis(state.config.draw_tick_ms);
    let spin_duration = Duration::from_millis(state.config.draw_duration_ms);

    let mut spin: Option<SpinState> = None;
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    // Initial snapshot so the TUI renders the configured defaults.
    let _ = ui_tx
        .send(UiUpdate::StateSnapshot(Box::new(state.snapshot())))
        .await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                let Some(cmd) = cmd else {
                    // TUI side dropped; shut down.
                    break;
                };
                match cmd {
                    UserCommand::ImportList(raw) => {
                        match state.import(&raw) {
                            Ok(summary) => {
                                let mut notice =
                                    format!("Imported {} participants", summary.count);
                                if !summary.duplicates.is_empty() {
                                    notice.push_str(&format!(
                                        " ({} duplicated: {})",
                                        summary.duplicates.len(),
                                        summary.duplicates.join(", ")
                                    ));
                                }
                                let _ = ui_tx.send(UiUpdate::Notice(notice)).await;
                            }
                            Err(e) => {
                                let _ = ui_tx.send(UiUpdate::Notice(e.to_string())).await;
                            }
                        }
                    }
                    UserCommand::StartDraw => {
                        match state.start_spin() {
                            Ok(()) => {
                                let mut frames = state.participants.clone();
                                rng.shuffle(&mut frames);
                                spin = Some(SpinState {
                                    frames,
                                    next_frame: 0,
                                    elapsed: Duration::ZERO,
                                });
                                ticker.reset();
                            }
                            Err(e) => {
                                let _ = ui_tx.send(UiUpdate::Notice(e.to_string())).await;
                            }
                        }
                    }
                    UserCommand::ToggleRepeat => {
                        match state.toggle_repeat() {
                            Ok(on) => {
                                let text = if on {
                                    "Repeat wins allowed"
                                } else {
                                    "Repeat wins disallowed"
                                };
                                let _ = ui_tx.send(UiUpdate::Notice(text.to_string())).await;
                            }
                            Err(e) => {
                                let _ = ui_tx.send(UiUpdate::Notice(e.to_string())).await;
                            }
                        }
                    }
                    UserCommand::ClearDraw => {
                        match state.clear_draw() {
                            Ok(()) => {
                                let _ = ui_tx
                                    .send(UiUpdate::Notice("Draw history cleared".to_string()))
                                    .await;
                            }
                            Err(e) => {
                                let _ = ui_tx.send(UiUpdate::Notice(e.to_string())).await;
                            }
                        }
                    }
                    UserCommand::SetGroupSize(size) => {
                        state.set_group_size(size);
                    }
                    UserCommand::GenerateGroups => {
                        if state.participants.is_empty() {
                            let _ = ui_tx
                                .send(UiUpdate::Notice(
                                    "Import a participant list first".to_string(),
                                ))
                                .await;
                        } else {
                            let count = state.generate_groups(&mut rng);
                            let _ = ui_tx
                                .send(UiUpdate::Notice(format!("Generated {count} groups")))
                                .await;
                        }
                    }
                    UserCommand::ExportGroups => {
                        if state.groups.is_empty() {
                            let _ = ui_tx
                                .send(UiUpdate::Notice("No grouping result to export".to_string()))
                                .await;
                        } else {
                            match grouping::export_csv(&state.groups, &state.config.export_dir) {
                                Ok(path) => {
                                    let _ = ui_tx
                                        .send(UiUpdate::Notice(format!(
                                            "Exported to {}",
                                            path.display()
                                        )))
                                        .await;
                                }
                                Err(e) => {
                                    warn!("CSV export failed: {e:#}");
                                    let _ = ui_tx
                                        .send(UiUpdate::Notice(format!("Export failed: {e}")))
                                        .await;
                                }
                            }
                        }
                    }
                    UserCommand::SwitchTab(tab) => {
                        state.active_tab = tab;
                    }
                    UserCommand::Quit => {
                        info!("quit command received");
                        break;
                    }
                }
                let _ = ui_tx
                    .send(UiUpdate::StateSnapshot(Box::new(state.snapshot())))
                    .await;
            }

            _ = ticker.tick(), if spin.is_some() => {
                let Some(active) = spin.as_mut() else { unreachable!() };
                active.elapsed += tick;
                if active.elapsed >= spin_duration {
                    spin = None;
                    match state.settle(&mut rng) {
                        Ok(winner) => {
                            let _ = ui_tx.send(UiUpdate::WinnerSettled(winner)).await;
                        }
                        Err(e) => {
                            // begin_draw ran, nothing else can mutate mid-spin.
                            warn!("settle failed unexpectedly: {e}");
                        }
                    }
                    let _ = ui_tx
                        .send(UiUpdate::StateSnapshot(Box::new(state.snapshot())))
                        .await;
                } else {
                    let frame =
                        active.frames[active.next_frame % active.frames.len()].clone();
                    active.next_frame += 1;
                    let _ = ui_tx.send(UiUpdate::SpinFrame(frame)).await;
                }
            }
        }
    }

    info!("app orchestrator shut down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SeededRng;

    fn imported_state(raw: &str) -> AppState {
        let mut state = AppState::new(Config::default());
        state.import(raw).expect("import");
        state
    }

    #[test]
    fn new_state_uses_config_defaults() {
        let mut config = Config::default();
        config.allow_repeat = true;
        config.default_group_size = 6;
        let state = AppState::new(config);

        assert!(state.draw.allow_repeat());
        assert_eq!(state.grouping.size(), 6);
        assert!(state.participants.is_empty());
        assert_eq!(state.active_tab, TabId::Import);
    }

    #[test]
    fn import_replaces_list_and_resets_draw() {
        let mut state = imported_state("A, B, C");
        let mut rng = SeededRng::from_seed(1);
        state.start_spin().expect("spin");
        state.settle(&mut rng).expect("settle");
        assert_eq!(state.draw.winners().len(), 1);

        let summary = state.import("D, E").expect("re-import");
        assert_eq!(summary.count, 2);
        assert_eq!(state.participants, vec!["D", "E"]);
        assert!(state.draw.winners().is_empty());
        assert_eq!(state.draw.pool().len(), 2);
    }

    #[test]
    fn import_empty_input_is_refused_without_state_change() {
        let mut state = imported_state("A, B");
        let err = state.import(" ,, \n ").expect_err("empty");
        assert!(matches!(err, ImportError::EmptyInput));
        assert_eq!(state.participants, vec!["A", "B"]);
    }

    #[test]
    fn import_reports_duplicates_but_proceeds() {
        let mut state = AppState::new(Config::default());
        let summary = state.import("Alice, Bob, Bob, Carol").expect("import");
        assert_eq!(summary.count, 4);
        assert_eq!(summary.duplicates, vec!["Bob"]);
        assert_eq!(state.participants.len(), 4);
    }

    #[test]
    fn import_rejected_while_spinning() {
        let mut state = imported_state("A, B, C");
        state.start_spin().expect("spin");

        let err = state.import("D, E").expect_err("mid-spin import");
        assert!(matches!(err, ImportError::DrawInFlight));
        assert_eq!(state.participants, vec!["A", "B", "C"]);
        assert!(state.draw.is_spinning());
    }

    #[test]
    fn groups_survive_reimport_until_regenerated() {
        let mut state = imported_state("A, B, C, D");
        let mut rng = SeededRng::from_seed(2);
        state.set_group_size(2);
        assert_eq!(state.generate_groups(&mut rng), 2);

        state.import("E, F, G").expect("re-import");
        assert_eq!(state.groups.len(), 2, "stale result kept");

        assert_eq!(state.generate_groups(&mut rng), 2);
        let members: Vec<String> = state
            .groups
            .iter()
            .flat_map(|g| g.members.clone())
            .collect();
        assert_eq!(members.len(), 3);
        assert!(members.iter().all(|m| ["E", "F", "G"].contains(&m.as_str())));
    }

    #[test]
    fn generate_groups_with_no_participants_is_noop() {
        let mut state = AppState::new(Config::default());
        let mut rng = SeededRng::from_seed(3);
        assert_eq!(state.generate_groups(&mut rng), 0);
        assert!(state.groups.is_empty());
    }

    #[test]
    fn snapshot_reflects_draw_progress() {
        let mut state = imported_state("A, B, C");
        let mut rng = SeededRng::from_seed(4);

        state.start_spin().expect("spin");
        assert!(state.snapshot().spinning);

        let winner = state.settle(&mut rng).expect("settle");
        let snapshot = state.snapshot();
        assert!(!snapshot.spinning);
        assert_eq!(snapshot.settled_winner, Some(winner));
        assert_eq!(snapshot.participant_count, 3);
        assert_eq!(snapshot.remaining, 2);
        assert_eq!(snapshot.winners.len(), 1);
    }
}
