//! "Research" screen: question input plus the cited answer.

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use wikiresearch_core::report::format_sources;
use wikiresearch_shared::ResearchState;

use super::Action;

pub(crate) struct ResearchScreen {
    query: String,
    editing: bool,
    result: Option<ResearchState>,
    scroll: u16,
}

impl ResearchScreen {
    pub(crate) fn new() -> Self {
        Self {
            query: String::new(),
            editing: false,
            result: None,
            scroll: 0,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn result(&self) -> Option<&ResearchState> {
        self.result.as_ref()
    }

    /// Replace the displayed result and put the query back in the input.
    pub(crate) fn show_result(&mut self, state: ResearchState) {
        self.query = state.query.clone();
        self.result = Some(state);
        self.scroll = 0;
        self.editing = false;
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Query
                Constraint::Length(1), // Hint
                Constraint::Min(1),    // Answer + sources
            ])
            .split(area);

        let query_style = if self.editing {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let query_block = Block::default()
            .borders(Borders::ALL)
            .title(" Research question ")
            .border_style(query_style);
        f.render_widget(Paragraph::new(self.query.as_str()).block(query_block), chunks[0]);

        let hint = if self.editing {
            "Type your question · Enter to research · Esc to stop editing"
        } else {
            "Enter to edit · c to clear · e to export · ↑/↓ to scroll"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[1]);

        let body = match &self.result {
            Some(state) => result_text(state),
            None => Text::from(
                "Ask a question, e.g. \"How does photosynthesis work?\"\n\n\
                 Answers are drawn only from the Wikipedia articles found for it.",
            ),
        };
        let answer = Paragraph::new(body)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll, 0))
            .block(Block::default().borders(Borders::ALL).title(" Answer "));
        f.render_widget(answer, chunks[2]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) -> Action {
        if self.editing {
            match code {
                KeyCode::Esc => self.editing = false,
                KeyCode::Enter => {
                    let query = self.query.trim().to_string();
                    if query.is_empty() {
                        return Action::Status("Please enter a research question.".into());
                    }
                    self.editing = false;
                    return Action::Research(query);
                }
                KeyCode::Backspace => {
                    self.query.pop();
                }
                KeyCode::Char(c) => self.query.push(c),
                _ => {}
            }
            return Action::None;
        }

        match code {
            KeyCode::Enter | KeyCode::Char('i') | KeyCode::Char('/') => self.editing = true,
            KeyCode::Char('c') => {
                self.query.clear();
                self.result = None;
                self.scroll = 0;
                return Action::Status("Cleared.".into());
            }
            KeyCode::Char('e') => {
                return if self.result.is_some() {
                    Action::Export
                } else {
                    Action::Status("Nothing to export yet.".into())
                };
            }
            KeyCode::Up | KeyCode::Char('k') => self.scroll = self.scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.scroll = self.scroll.saturating_add(1),
            KeyCode::PageUp => self.scroll = self.scroll.saturating_sub(10),
            KeyCode::PageDown => self.scroll = self.scroll.saturating_add(10),
            _ => {}
        }
        Action::None
    }
}

fn result_text(state: &ResearchState) -> Text<'static> {
    let mut lines: Vec<Line> = state
        .answer
        .lines()
        .map(|l| Line::from(l.to_string()))
        .collect();

    lines.push(Line::from(""));
    lines.push(Line::from("Sources").style(Style::default().add_modifier(Modifier::BOLD)));
    for l in format_sources(&state.sources).lines() {
        lines.push(Line::from(l.to_string()));
    }

    if let Some(error) = &state.error {
        lines.push(Line::from(""));
        lines.push(Line::from(format!("Note: {error}")).style(Style::default().fg(Color::Red)));
    }

    Text::from(lines)
}
