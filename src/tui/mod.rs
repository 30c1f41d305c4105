// TUI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors relevant parts of the application
// state. The app orchestrator pushes `UiUpdate` messages over an mpsc
// channel; the TUI applies them to `ViewState` and re-renders at ~30 fps.
// The import editor buffer is purely local until submitted.

pub mod input;
pub mod layout;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::config::DEFAULT_GROUP_SIZE;
use crate::grouping::Group;
use crate::protocol::{TabId, UiUpdate, UserCommand};
use crate::roster;

use layout::{build_layout, AppLayout};

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state that mirrors the application state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app orchestrator.
/// The `render_frame` function reads this struct to draw the screen.
pub struct ViewState {
    /// Which tab is active.
    pub active_tab: TabId,
    /// Import editor buffer (local until submitted).
    pub editor: String,
    /// Whether the import editor is capturing keystrokes.
    pub editing: bool,
    /// Number of imported participants.
    pub participant_count: usize,
    /// Names still eligible in no-repeat mode.
    pub remaining: usize,
    /// Winner history, most recent first.
    pub winners: Vec<String>,
    /// Whether repeat wins are allowed.
    pub allow_repeat: bool,
    /// Whether a spin animation is running.
    pub spinning: bool,
    /// The name currently flashing in the winner cell.
    pub spin_name: Option<String>,
    /// The last settled winner.
    pub settled_winner: Option<String>,
    /// Per-group member count.
    pub group_size: usize,
    /// The last generated partition.
    pub groups: Vec<Group>,
    /// The most recent notice message.
    pub notice: String,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            active_tab: TabId::Import,
            editor: String::new(),
            editing: false,
            participant_count: 0,
            remaining: 0,
            winners: Vec::new(),
            allow_repeat: false,
            spinning: false,
            spin_name: None,
            settled_winner: None,
            group_size: DEFAULT_GROUP_SIZE,
            groups: Vec::new(),
            notice: String::new(),
        }
    }
}

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::StateSnapshot(snapshot) => {
            state.participant_count = snapshot.participant_count;
            state.remaining = snapshot.remaining;
            state.winners = snapshot.winners;
            state.allow_repeat = snapshot.allow_repeat;
            state.spinning = snapshot.spinning;
            state.settled_winner = snapshot.settled_winner;
            state.group_size = snapshot.group_size;
            state.groups = snapshot.groups;
            if !state.spinning {
                state.spin_name = None;
            }
        }
        UiUpdate::SpinFrame(name) => {
            state.spinning = true;
            state.spin_name = Some(name);
        }
        UiUpdate::WinnerSettled(winner) => {
            state.spinning = false;
            state.spin_name = None;
            state.settled_winner = Some(winner);
        }
        UiUpdate::Notice(text) => {
            state.notice = text;
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Render the complete frame.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    render_status_bar(frame, &layout, state);
    match state.active_tab {
        TabId::Import => render_import_panel(frame, &layout, state),
        TabId::Draw => render_draw_panel(frame, &layout, state),
        TabId::Group => render_group_panel(frame, &layout, state),
    }
    render_side_panel(frame, &layout, state);
    render_notice_bar(frame, &layout, state);
    render_help_bar(frame, &layout, state);
}

fn tab_label(tab: TabId) -> &'static str {
    match tab {
        TabId::Import => "1:Import",
        TabId::Draw => "2:Draw",
        TabId::Group => "3:Group",
    }
}

fn render_status_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let mut spans = vec![Span::raw(" ")];
    for tab in [TabId::Import, TabId::Draw, TabId::Group] {
        let style = if tab == state.active_tab {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(tab_label(tab), style));
        spans.push(Span::raw("  "));
    }
    spans.push(Span::styled(
        format!(
            "| {} participants | {} remaining | repeat: {}",
            state.participant_count,
            state.remaining,
            if state.allow_repeat { "on" } else { "off" }
        ),
        Style::default().fg(Color::Gray),
    ));

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.status_bar);
}

fn render_import_panel(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let title = if state.editing {
        "Import - editing (Esc to stop, Ctrl+S to submit)"
    } else {
        "Import"
    };

    let mut lines: Vec<Line> = Vec::new();
    if state.editor.is_empty() {
        lines.push(Line::from(Span::styled(
            "Type names separated by commas or newlines.",
            Style::default().fg(Color::DarkGray),
        )));
        lines.push(Line::from(Span::styled(
            "i edit | m sample | @path + Enter loads a file",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for text_line in state.editor.lines() {
            lines.push(Line::from(text_line.to_string()));
        }
        if state.editing {
            lines.push(Line::from(Span::styled(
                "_",
                Style::default().add_modifier(Modifier::SLOW_BLINK),
            )));
        }
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, layout.main_panel);
}

fn render_draw_panel(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let mut lines: Vec<Line> = vec![Line::from("")];

    if state.participant_count == 0 {
        lines.push(Line::from(Span::styled(
            "Import a participant list first (tab 1).",
            Style::default().fg(Color::DarkGray),
        )));
    } else if state.spinning {
        let name = state.spin_name.as_deref().unwrap_or("...");
        lines.push(Line::from(Span::styled(
            format!("  >>> {name} <<<"),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        lines.push(Line::from("Drawing..."));
    } else if let Some(winner) = &state.settled_winner {
        lines.push(Line::from(Span::styled(
            "  WINNER",
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {winner}"),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "  ? ? ?",
            Style::default().fg(Color::DarkGray),
        )));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(format!(
        "Pool remaining: {}   Repeat wins: {}",
        state.remaining,
        if state.allow_repeat { "on" } else { "off" }
    )));

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Lucky Draw"),
    );
    frame.render_widget(paragraph, layout.main_panel);
}

fn render_group_panel(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let mut lines: Vec<Line> = vec![Line::from(format!(
        "Group size: {}  (+/- to adjust, g to generate, x to export)",
        state.group_size
    ))];
    lines.push(Line::from(""));

    if state.groups.is_empty() {
        lines.push(Line::from(Span::styled(
            "No grouping result yet.",
            Style::default().fg(Color::DarkGray),
        )));
    } else {
        for group in &state.groups {
            lines.push(Line::from(Span::styled(
                format!("第 {} 組 ({})", group.id, group.members.len()),
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(format!("  {}", group.members.join(", "))));
        }
    }

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Grouping"));
    frame.render_widget(paragraph, layout.main_panel);
}

fn render_side_panel(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let (title, lines) = match state.active_tab {
        TabId::Import => ("List Check", import_side_lines(state)),
        TabId::Draw => ("Winners", winner_side_lines(state)),
        TabId::Group => ("Summary", group_side_lines(state)),
    };

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, layout.side_panel);
}

/// Live parse of the editor buffer: counts, duplicates, preview.
fn import_side_lines(state: &ViewState) -> Vec<Line<'static>> {
    let names = roster::parse(&state.editor);
    let duplicates = roster::find_duplicates(&state.editor);

    let mut lines = vec![
        Line::from(format!("Names in editor: {}", names.len())),
        Line::from(format!("Duplicates: {}", duplicates.len())),
    ];
    if !duplicates.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {}", duplicates.join(", ")),
            Style::default().fg(Color::Red),
        )));
        lines.push(Line::from(Span::styled(
            "  press d to deduplicate",
            Style::default().fg(Color::DarkGray),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from("Preview:"));
    for (idx, name) in names.iter().take(10).enumerate() {
        lines.push(Line::from(format!("  {}. {}", idx + 1, name)));
    }
    if names.len() > 10 {
        lines.push(Line::from(format!("  ... and {} more", names.len() - 10)));
    }
    lines
}

fn winner_side_lines(state: &ViewState) -> Vec<Line<'static>> {
    if state.winners.is_empty() {
        return vec![Line::from(Span::styled(
            "No winners yet.",
            Style::default().fg(Color::DarkGray),
        ))];
    }
    let total = state.winners.len();
    state
        .winners
        .iter()
        .enumerate()
        .map(|(idx, winner)| Line::from(format!("#{:<3} {}", total - idx, winner)))
        .collect()
}

fn group_side_lines(state: &ViewState) -> Vec<Line<'static>> {
    let member_total: usize = state.groups.iter().map(|g| g.members.len()).sum();
    vec![
        Line::from(format!("Groups: {}", state.groups.len())),
        Line::from(format!("Members placed: {member_total}")),
        Line::from(format!("Participants: {}", state.participant_count)),
    ]
}

fn render_notice_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(Span::styled(
        format!(" {}", state.notice),
        Style::default().fg(Color::Magenta),
    )));
    frame.render_widget(paragraph, layout.notice_bar);
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let text = match state.active_tab {
        TabId::Import => " 1-3:Tabs | i:Edit | m:Sample | d:Dedupe | Enter:Import | q:Quit",
        TabId::Draw => " 1-3:Tabs | Space:Draw | r:Repeat | c:Clear | q:Quit",
        TabId::Group => " 1-3:Tabs | +/-:Size | g:Generate | x:Export CSV | q:Quit",
    };
    let paragraph = Paragraph::new(Line::from(Span::styled(
        text,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    None => break, // app task is shutting down
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quitting = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quitting {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse and resize events need no handling; the next
                        // render tick redraws against the current area.
                    }
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_tick.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
