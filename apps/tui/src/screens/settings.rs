//! "Settings" screen: retrieval limits and language.

use crossterm::event::KeyCode;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use wikiresearch_shared::{MAX_CONTENT_LENGTH_RANGE, MAX_SEARCH_RESULTS_RANGE, ResearchSettings};

use super::Action;

/// Increment for the content length setting.
const CONTENT_LENGTH_STEP: usize = 500;

/// Which setting is focused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    MaxArticles,
    ContentLength,
    Language,
}

pub(crate) struct SettingsScreen {
    settings: ResearchSettings,
    focused: Field,
    editing: bool,
    /// Language being typed; committed on Enter.
    language_draft: String,
}

impl SettingsScreen {
    pub(crate) fn new(settings: ResearchSettings) -> Self {
        let language_draft = settings.language.clone();
        Self {
            settings,
            focused: Field::MaxArticles,
            editing: false,
            language_draft,
        }
    }

    pub(crate) fn is_editing(&self) -> bool {
        self.editing
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Max articles
                Constraint::Length(3), // Content length
                Constraint::Length(3), // Language
                Constraint::Length(3), // Hint
                Constraint::Min(0),
            ])
            .split(area);

        let articles = Paragraph::new(format!(
            "< {} >  ({}-{})",
            self.settings.max_search_results,
            MAX_SEARCH_RESULTS_RANGE.start(),
            MAX_SEARCH_RESULTS_RANGE.end()
        ))
        .block(self.field_block(Field::MaxArticles, " Max articles to retrieve "));
        f.render_widget(articles, chunks[0]);

        let length = Paragraph::new(format!(
            "< {} >  ({}-{}, step {CONTENT_LENGTH_STEP})",
            self.settings.max_content_length,
            MAX_CONTENT_LENGTH_RANGE.start(),
            MAX_CONTENT_LENGTH_RANGE.end()
        ))
        .block(self.field_block(Field::ContentLength, " Max content length per article "));
        f.render_widget(length, chunks[1]);

        let language = if self.editing {
            self.language_draft.as_str()
        } else {
            self.settings.language.as_str()
        };
        let lang = Paragraph::new(language)
            .block(self.field_block(Field::Language, " Wikipedia language "));
        f.render_widget(lang, chunks[2]);

        let hint = if self.editing {
            "Type a language code · Enter to apply · Esc to cancel"
        } else {
            "↑/↓ to select · ←/→ to change · Enter to edit language"
        };
        let hint_p = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(Alignment::Center);
        f.render_widget(hint_p, chunks[3]);
    }

    fn field_block(&self, field: Field, title: &'static str) -> Block<'static> {
        let style = if self.focused == field && self.editing {
            Style::default().fg(Color::Yellow)
        } else if self.focused == field {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(style)
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode) -> Action {
        if self.editing {
            match code {
                KeyCode::Esc => {
                    self.editing = false;
                    self.language_draft = self.settings.language.clone();
                }
                KeyCode::Enter => {
                    let lang = self.language_draft.trim().to_lowercase();
                    if lang.is_empty() {
                        return Action::Status("Language must not be empty.".into());
                    }
                    self.editing = false;
                    self.language_draft = lang.clone();
                    if lang != self.settings.language {
                        self.settings.language = lang;
                        return Action::ApplySettings(self.settings.clone());
                    }
                }
                KeyCode::Backspace => {
                    self.language_draft.pop();
                }
                KeyCode::Char(c) => self.language_draft.push(c),
                _ => {}
            }
            return Action::None;
        }

        match code {
            KeyCode::Up => self.prev_field(),
            KeyCode::Down => self.next_field(),
            KeyCode::Enter if self.focused == Field::Language => self.editing = true,
            KeyCode::Left => return self.adjust(false),
            KeyCode::Right => return self.adjust(true),
            _ => {}
        }
        Action::None
    }

    /// Step the focused numeric setting, clamped to its range.
    fn adjust(&mut self, up: bool) -> Action {
        let before = self.settings.clone();
        match self.focused {
            Field::MaxArticles => {
                let n = self.settings.max_search_results;
                let next = if up { n + 1 } else { n.saturating_sub(1) };
                self.settings.max_search_results =
                    next.clamp(*MAX_SEARCH_RESULTS_RANGE.start(), *MAX_SEARCH_RESULTS_RANGE.end());
            }
            Field::ContentLength => {
                let n = self.settings.max_content_length;
                let next = if up {
                    n + CONTENT_LENGTH_STEP
                } else {
                    n.saturating_sub(CONTENT_LENGTH_STEP)
                };
                self.settings.max_content_length =
                    next.clamp(*MAX_CONTENT_LENGTH_RANGE.start(), *MAX_CONTENT_LENGTH_RANGE.end());
            }
            Field::Language => return Action::None,
        }

        if self.settings == before {
            Action::None
        } else {
            Action::ApplySettings(self.settings.clone())
        }
    }

    fn next_field(&mut self) {
        self.focused = match self.focused {
            Field::MaxArticles => Field::ContentLength,
            Field::ContentLength => Field::Language,
            Field::Language => Field::MaxArticles,
        };
    }

    fn prev_field(&mut self) {
        self.focused = match self.focused {
            Field::MaxArticles => Field::Language,
            Field::ContentLength => Field::MaxArticles,
            Field::Language => Field::ContentLength,
        };
    }
}
