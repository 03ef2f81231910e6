//! Core TUI application state and event loop.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use color_eyre::eyre::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};
use tracing::{info, warn};
use wikiresearch_core::report::{export_file_name, render_markdown};
use wikiresearch_shared::{AppConfig, ResearchState};

use crate::screens::{Action, ScreenId, Screens};
use crate::session::Session;
use crate::widgets::status_bar;

/// Application state.
pub(crate) struct App {
    /// Currently active screen tab.
    pub active_tab: usize,
    /// Available screens.
    pub screens: Vec<ScreenId>,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Status message shown in bottom bar.
    pub status: String,
    /// Whether help overlay is visible.
    pub show_help: bool,
    /// Per-screen state.
    pub screen_states: Screens,
    pub session: Session,
}

impl App {
    pub(crate) fn new(session: Session) -> Self {
        let status = match session.unavailable_reason() {
            Some(reason) => first_line(reason).to_string(),
            None => "Ready — press ? for help".to_string(),
        };
        let screen_states = Screens::new(session.settings().clone());

        Self {
            active_tab: 0,
            screens: vec![ScreenId::Research, ScreenId::History, ScreenId::Settings],
            should_quit: false,
            status,
            show_help: false,
            screen_states,
            session,
        }
    }

    fn current_screen(&self) -> ScreenId {
        self.screens[self.active_tab]
    }

    fn is_editing(&self) -> bool {
        self.screen_states.is_editing(self.current_screen())
    }

    fn switch_to(&mut self, id: ScreenId) {
        if let Some(idx) = self.screens.iter().position(|s| *s == id) {
            self.active_tab = idx;
        }
    }

    fn perform(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Status(msg) => self.status = msg,
            Action::Research(query) => self.start_research(query),
            Action::Rerun(index) => {
                let query = self
                    .session
                    .history()
                    .recent(self.session.history().capacity())
                    .get(index)
                    .map(|e| e.query.clone());
                if let Some(query) = query {
                    self.switch_to(ScreenId::Research);
                    self.start_research(query);
                }
            }
            Action::Export => self.export(),
            Action::ApplySettings(settings) => {
                self.status = match self.session.apply_settings(settings) {
                    Ok(()) => "Settings applied.".to_string(),
                    Err(reason) => first_line(&reason).to_string(),
                };
            }
        }
    }

    fn start_research(&mut self, query: String) {
        info!(%query, "starting research");
        self.status = match self.session.start(query) {
            Ok(()) => "Starting research...".to_string(),
            Err(reason) => first_line(&reason).to_string(),
        };
    }

    /// Pick up a finished research run and show it.
    fn collect_finished(&mut self) {
        if let Some(state) = self.session.poll() {
            self.status = completion_status(&state);
            self.screen_states.show_result(state);
        } else if let Some(label) = self.session.progress_label() {
            self.status = label;
        }
    }

    fn export(&mut self) {
        let Some(state) = self.screen_states.research.result() else {
            return;
        };
        let path = PathBuf::from(export_file_name(&chrono::Local::now()));
        self.status = match std::fs::write(&path, render_markdown(state)) {
            Ok(()) => {
                info!(path = %path.display(), "exported report");
                format!("Saved {}", path.display())
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "export failed");
                format!("Export failed: {e}")
            }
        };
    }
}

fn completion_status(state: &ResearchState) -> String {
    match &state.error {
        Some(error) if state.sources.is_empty() => format!("Finished: {error}"),
        _ => format!("Research complete — {} source(s)", state.sources.len()),
    }
}

fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or(s)
}

/// Entry point: owns the terminal for the lifetime of the event loop.
pub(crate) fn run(config: AppConfig) -> Result<()> {
    let session = Session::new(config)?;

    // Setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, App::new(session));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        app.collect_finished();
        terminal.draw(|f| draw(f, &app))?;

        // Poll for events with 100ms timeout for responsive UI
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(&mut app, key.code, key.modifiers);
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // Global keybindings (always active)
    match code {
        KeyCode::Char('q') | KeyCode::Char('c')
            if modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('q') if !app.is_editing() => {
            app.should_quit = true;
            return;
        }
        KeyCode::Char('?') if !app.is_editing() => {
            app.show_help = !app.show_help;
            return;
        }
        KeyCode::Esc if app.show_help => {
            app.show_help = false;
            return;
        }
        // Tab navigation with number keys
        KeyCode::Char(c @ '1'..='3') if !app.is_editing() => {
            let idx = (c as usize) - ('1' as usize);
            if idx < app.screens.len() {
                app.active_tab = idx;
                app.status = format!("{}", app.screens[idx]);
            }
            return;
        }
        KeyCode::Tab if !app.is_editing() => {
            app.active_tab = (app.active_tab + 1) % app.screens.len();
            app.status = format!("{}", app.screens[app.active_tab]);
            return;
        }
        KeyCode::BackTab if !app.is_editing() => {
            app.active_tab = if app.active_tab == 0 {
                app.screens.len() - 1
            } else {
                app.active_tab - 1
            };
            app.status = format!("{}", app.screens[app.active_tab]);
            return;
        }
        _ => {}
    }

    // If help is showing, consume any key to dismiss
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Delegate to current screen
    let id = app.current_screen();
    let action = app
        .screen_states
        .handle_key(id, code, modifiers, app.session.history());
    app.perform(action);
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    // Tab bar
    let tab_titles: Vec<Line> = app
        .screens
        .iter()
        .map(|s| Line::from(format!("{s}")))
        .collect();

    let tabs = Tabs::new(tab_titles)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Wikipedia Research Assistant "),
        )
        .select(app.active_tab)
        .style(Style::default().fg(Color::White))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" │ ");

    f.render_widget(tabs, chunks[0]);

    // Content area
    app.screen_states
        .draw(app.current_screen(), f, chunks[1], app.session.history());

    // Status bar
    let bar = status_bar(&app.status, app.session.is_busy());
    f.render_widget(bar, chunks[2]);

    // Help overlay
    if app.show_help {
        draw_help_overlay(f);
    }
}

fn draw_help_overlay(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());

    let help_text = vec![
        Line::from("Keybindings").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from(""),
        Line::from("  1-3          Switch to screen"),
        Line::from("  Tab/S-Tab    Next/previous screen"),
        Line::from("  ?            Toggle this help"),
        Line::from("  q / Ctrl-C   Quit"),
        Line::from(""),
        Line::from("Research:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  Enter        Edit question / run research"),
        Line::from("  c            Clear question and answer"),
        Line::from("  e            Export answer as Markdown"),
        Line::from("  ↑/↓          Scroll answer"),
        Line::from(""),
        Line::from("History:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓, Enter   Select and rerun a past question"),
        Line::from(""),
        Line::from("Settings:").style(Style::default().add_modifier(Modifier::BOLD)),
        Line::from("  ↑/↓, ←/→     Select and change a setting"),
    ];

    let help = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Help — press any key to close ")
                .style(Style::default().bg(Color::DarkGray)),
        )
        .style(Style::default().fg(Color::White).bg(Color::DarkGray));

    // Clear background
    f.render_widget(ratatui::widgets::Clear, area);
    f.render_widget(help, area);
}

/// Create a centered rectangle with percentage width and height.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
