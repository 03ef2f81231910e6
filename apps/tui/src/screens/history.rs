//! "History" screen: past questions, newest first.

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph};
use wikiresearch_core::ResearchHistory;
use wikiresearch_core::report::history_label;

use super::Action;

pub(crate) struct HistoryScreen {
    /// Index into the newest-first listing.
    selected: usize,
}

impl HistoryScreen {
    pub(crate) fn new() -> Self {
        Self { selected: 0 }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect, history: &ResearchHistory) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Min(1),    // List
                Constraint::Length(3), // Hint
            ])
            .split(area);

        if history.is_empty() {
            let empty = Paragraph::new(
                "No research yet.\n\nAsk a question on the 'Research' tab.",
            )
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title(" History "));
            f.render_widget(empty, chunks[0]);
        } else {
            let items: Vec<ListItem> = history
                .recent(history.capacity())
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let style = if i == self.selected {
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD)
                    } else {
                        Style::default()
                    };
                    let prefix = if i == self.selected { "▸ " } else { "  " };
                    ListItem::new(format!(
                        "{prefix}{}. {}  ({} sources, {})",
                        i + 1,
                        history_label(&entry.query),
                        entry.result.sources.len(),
                        entry.timestamp.with_timezone(&chrono::Local).format("%H:%M:%S"),
                    ))
                    .style(style)
                })
                .collect();

            let list = List::new(items).block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" History ({}) ", history.len())),
            );
            f.render_widget(list, chunks[0]);
        }

        let hint = Paragraph::new("↑/↓ to select · Enter to rerun")
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint, chunks[1]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, len: usize) -> Action {
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < len {
                    self.selected += 1;
                }
            }
            KeyCode::Enter if len > 0 => return Action::Rerun(self.selected),
            _ => {}
        }
        Action::None
    }
}
