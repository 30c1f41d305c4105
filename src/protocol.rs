// Message types shared between the app orchestrator and the TUI.
//
// The TUI sends `UserCommand`s over one mpsc channel; the app task applies
// them to its state and pushes `UiUpdate`s back over another. Neither side
// ever touches the other's state directly.

use crate::grouping::Group;

/// The three main tabs, mirroring the tool's workflow:
/// import a list, run the draw, partition into groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabId {
    Import,
    Draw,
    Group,
}

/// Commands from the TUI to the app orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Replace the participant list with the parse of this raw text.
    ImportList(String),
    /// Start a draw (opens the spin window).
    StartDraw,
    /// Flip repeat-win mode.
    ToggleRepeat,
    /// Clear the winner history and restore the full pool.
    ClearDraw,
    /// Set the per-group member count.
    SetGroupSize(usize),
    /// Regenerate the grouping partition.
    GenerateGroups,
    /// Write the current partition to a CSV file.
    ExportGroups,
    /// Record the active tab (for the status line).
    SwitchTab(TabId),
    /// Shut down the app task.
    Quit,
}

/// Full state snapshot pushed to the TUI after each transition.
#[derive(Debug, Clone, Default)]
pub struct AppSnapshot {
    pub participant_count: usize,
    pub remaining: usize,
    pub winners: Vec<String>,
    pub allow_repeat: bool,
    pub spinning: bool,
    pub settled_winner: Option<String>,
    pub group_size: usize,
    pub groups: Vec<Group>,
}

/// Updates from the app orchestrator to the TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// Complete refreshed state.
    StateSnapshot(Box<AppSnapshot>),
    /// One animation frame: the name to flash in the winner cell.
    SpinFrame(String),
    /// The draw committed this winner.
    WinnerSettled(String),
    /// A user-visible message (import summary, rejection reason, export path).
    Notice(String),
}
