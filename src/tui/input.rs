// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app orchestrator, or into local ViewState mutations (tab switching, the
// import text editor, the group size stepper).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::grouping::MIN_GROUP_SIZE;
use crate::protocol::{TabId, UserCommand};
use crate::roster;

use super::ViewState;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to
/// the app orchestrator. Returns `None` when it was handled locally by
/// mutating `ViewState`.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // On Windows, crossterm emits both Press and Release events for each
    // physical keypress; ignoring non-Press events prevents double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    // Editor mode on the import tab captures printable characters.
    if view_state.editing {
        return handle_editor_mode(key_event, view_state);
    }

    match key_event.code {
        // Tab switching
        KeyCode::Char('1') => switch_tab(view_state, TabId::Import),
        KeyCode::Char('2') => switch_tab(view_state, TabId::Draw),
        KeyCode::Char('3') => switch_tab(view_state, TabId::Group),

        KeyCode::Char('q') => Some(UserCommand::Quit),

        _ => match view_state.active_tab {
            TabId::Import => handle_import_tab(key_event, view_state),
            TabId::Draw => handle_draw_tab(key_event),
            TabId::Group => handle_group_tab(key_event, view_state),
        },
    }
}

fn switch_tab(view_state: &mut ViewState, tab: TabId) -> Option<UserCommand> {
    view_state.active_tab = tab;
    Some(UserCommand::SwitchTab(tab))
}

/// Keys while the import editor is active.
///
/// Esc leaves the editor; Enter inserts a newline (names can be separated
/// by newlines or commas); Ctrl+S submits the buffer as the new list.
fn handle_editor_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    if key_event.modifiers.contains(KeyModifiers::CONTROL) {
        if key_event.code == KeyCode::Char('s') {
            view_state.editing = false;
            return submit_editor(view_state);
        }
        return None;
    }

    match key_event.code {
        KeyCode::Esc => {
            view_state.editing = false;
            None
        }
        KeyCode::Enter => {
            view_state.editor.push('\n');
            None
        }
        KeyCode::Backspace => {
            view_state.editor.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.editor.push(c);
            None
        }
        _ => None,
    }
}

fn handle_import_tab(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        // Enter editor mode
        KeyCode::Char('i') => {
            view_state.editing = true;
            None
        }
        // Load the built-in sample roster into the editor
        KeyCode::Char('m') => {
            view_state.editor = roster::sample_text();
            view_state.notice = "Sample roster loaded into editor".to_string();
            None
        }
        // One-key dedupe: rewrite the buffer keeping first occurrences
        KeyCode::Char('d') => {
            let deduped = roster::deduplicate(&view_state.editor);
            view_state.editor = roster::render(&deduped);
            view_state.notice = format!("Editor deduplicated to {} names", deduped.len());
            None
        }
        // Submit the buffer as the new participant list
        KeyCode::Enter => submit_editor(view_state),
        _ => None,
    }
}

fn handle_draw_tab(key_event: KeyEvent) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char(' ') | KeyCode::Enter => Some(UserCommand::StartDraw),
        KeyCode::Char('r') => Some(UserCommand::ToggleRepeat),
        KeyCode::Char('c') => Some(UserCommand::ClearDraw),
        _ => None,
    }
}

fn handle_group_tab(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('+') | KeyCode::Char('=') => {
            view_state.group_size += 1;
            Some(UserCommand::SetGroupSize(view_state.group_size))
        }
        KeyCode::Char('-') => {
            view_state.group_size = view_state.group_size.saturating_sub(1).max(MIN_GROUP_SIZE);
            Some(UserCommand::SetGroupSize(view_state.group_size))
        }
        KeyCode::Char('g') | KeyCode::Enter => Some(UserCommand::GenerateGroups),
        KeyCode::Char('x') => Some(UserCommand::ExportGroups),
        _ => None,
    }
}

/// Submit the editor buffer.
///
/// A buffer of the form `@path/to/file` loads that file into the editor
/// instead of importing, so text/CSV files can be pulled in without
/// leaving the terminal.
fn submit_editor(view_state: &mut ViewState) -> Option<UserCommand> {
    let buffer = view_state.editor.trim();
    if let Some(path) = buffer.strip_prefix('@') {
        let path = path.trim().to_string();
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                view_state.editor = contents;
                view_state.notice = format!("Loaded {}", path);
            }
            Err(e) => {
                view_state.notice = format!("Could not read {}: {}", path, e);
            }
        }
        return None;
    }
    Some(UserCommand::ImportList(view_state.editor.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn number_keys_switch_tabs() {
        let mut state = ViewState::default();
        assert_eq!(
            handle_key(key(KeyCode::Char('2')), &mut state),
            Some(UserCommand::SwitchTab(TabId::Draw))
        );
        assert_eq!(state.active_tab, TabId::Draw);

        assert_eq!(
            handle_key(key(KeyCode::Char('3')), &mut state),
            Some(UserCommand::SwitchTab(TabId::Group))
        );
        assert_eq!(state.active_tab, TabId::Group);
    }

    #[test]
    fn ctrl_c_quits_even_while_editing() {
        let mut state = ViewState::default();
        state.editing = true;
        assert_eq!(handle_key(ctrl('c'), &mut state), Some(UserCommand::Quit));
    }

    #[test]
    fn editor_captures_characters_and_backspace() {
        let mut state = ViewState::default();
        state.editing = true;

        for c in "Amy".chars() {
            assert_eq!(handle_key(key(KeyCode::Char(c)), &mut state), None);
        }
        handle_key(key(KeyCode::Enter), &mut state);
        handle_key(key(KeyCode::Char('B')), &mut state);
        handle_key(key(KeyCode::Backspace), &mut state);

        assert_eq!(state.editor, "Amy\n");
        // 'q' is text while editing, not quit
        assert_eq!(handle_key(key(KeyCode::Char('q')), &mut state), None);
        assert_eq!(state.editor, "Amy\nq");
    }

    #[test]
    fn esc_leaves_editor_mode() {
        let mut state = ViewState::default();
        state.editing = true;
        assert_eq!(handle_key(key(KeyCode::Esc), &mut state), None);
        assert!(!state.editing);
    }

    #[test]
    fn ctrl_s_submits_from_editor_mode() {
        let mut state = ViewState::default();
        state.editing = true;
        state.editor = "A, B".to_string();
        assert_eq!(
            handle_key(ctrl('s'), &mut state),
            Some(UserCommand::ImportList("A, B".to_string()))
        );
        assert!(!state.editing);
    }

    #[test]
    fn enter_on_import_tab_submits_buffer() {
        let mut state = ViewState::default();
        state.editor = "A, B, C".to_string();
        assert_eq!(
            handle_key(key(KeyCode::Enter), &mut state),
            Some(UserCommand::ImportList("A, B, C".to_string()))
        );
    }

    #[test]
    fn dedupe_key_rewrites_editor() {
        let mut state = ViewState::default();
        state.editor = "Bob, Alice, Bob".to_string();
        assert_eq!(handle_key(key(KeyCode::Char('d')), &mut state), None);
        assert_eq!(state.editor, "Bob, Alice");
    }

    #[test]
    fn sample_key_fills_editor() {
        let mut state = ViewState::default();
        handle_key(key(KeyCode::Char('m')), &mut state);
        assert_eq!(state.editor, roster::sample_text());
    }

    #[test]
    fn draw_tab_keys_map_to_commands() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Draw;
        assert_eq!(
            handle_key(key(KeyCode::Char(' ')), &mut state),
            Some(UserCommand::StartDraw)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('r')), &mut state),
            Some(UserCommand::ToggleRepeat)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('c')), &mut state),
            Some(UserCommand::ClearDraw)
        );
    }

    #[test]
    fn group_size_stepper_clamps_at_minimum() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Group;
        state.group_size = 2;

        assert_eq!(
            handle_key(key(KeyCode::Char('-')), &mut state),
            Some(UserCommand::SetGroupSize(2))
        );
        assert_eq!(state.group_size, 2);

        assert_eq!(
            handle_key(key(KeyCode::Char('+')), &mut state),
            Some(UserCommand::SetGroupSize(3))
        );
        assert_eq!(state.group_size, 3);
    }

    #[test]
    fn group_tab_generate_and_export() {
        let mut state = ViewState::default();
        state.active_tab = TabId::Group;
        assert_eq!(
            handle_key(key(KeyCode::Char('g')), &mut state),
            Some(UserCommand::GenerateGroups)
        );
        assert_eq!(
            handle_key(key(KeyCode::Char('x')), &mut state),
            Some(UserCommand::ExportGroups)
        );
    }

    #[test]
    fn q_quits_in_normal_mode() {
        let mut state = ViewState::default();
        assert_eq!(
            handle_key(key(KeyCode::Char('q')), &mut state),
            Some(UserCommand::Quit)
        );
    }
}
