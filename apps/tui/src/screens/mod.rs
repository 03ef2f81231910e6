//! TUI screen definitions.
//!
//! Each screen corresponds to a tab in the TUI. Screens own their input
//! state and turn keys into [`Action`]s; the app carries them out.

mod history;
mod research;
mod settings;

use std::fmt;

use crossterm::event::{KeyCode, KeyModifiers};
use ratatui::prelude::*;
use wikiresearch_core::ResearchHistory;
use wikiresearch_shared::{ResearchSettings, ResearchState};

pub(crate) use history::HistoryScreen;
pub(crate) use research::ResearchScreen;
pub(crate) use settings::SettingsScreen;

/// Screen identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScreenId {
    Research,
    History,
    Settings,
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Research => write!(f, "Research"),
            Self::History => write!(f, "History"),
            Self::Settings => write!(f, "Settings"),
        }
    }
}

/// What a key press asks the app to do.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Action {
    None,
    /// Run the pipeline for this query.
    Research(String),
    /// Rerun the n-th history entry, newest first.
    Rerun(usize),
    /// Save the current result as Markdown.
    Export,
    /// Rebuild the pipeline with new settings.
    ApplySettings(ResearchSettings),
    Status(String),
}

/// Per-screen state for every tab.
pub(crate) struct Screens {
    pub research: ResearchScreen,
    pub history: HistoryScreen,
    pub settings: SettingsScreen,
}

impl Screens {
    pub(crate) fn new(settings: ResearchSettings) -> Self {
        Self {
            research: ResearchScreen::new(),
            history: HistoryScreen::new(),
            settings: SettingsScreen::new(settings),
        }
    }

    /// Whether the given screen has an active text input field.
    pub(crate) fn is_editing(&self, id: ScreenId) -> bool {
        match id {
            ScreenId::Research => self.research.is_editing(),
            ScreenId::History => false,
            ScreenId::Settings => self.settings.is_editing(),
        }
    }

    pub(crate) fn draw(&self, id: ScreenId, f: &mut Frame, area: Rect, history: &ResearchHistory) {
        match id {
            ScreenId::Research => self.research.draw(f, area),
            ScreenId::History => self.history.draw(f, area, history),
            ScreenId::Settings => self.settings.draw(f, area),
        }
    }

    pub(crate) fn handle_key(
        &mut self,
        id: ScreenId,
        code: KeyCode,
        modifiers: KeyModifiers,
        history: &ResearchHistory,
    ) -> Action {
        match id {
            ScreenId::Research => self.research.handle_key(code, modifiers),
            ScreenId::History => self.history.handle_key(code, history.len()),
            ScreenId::Settings => self.settings.handle_key(code),
        }
    }

    /// Show a finished research result on the Research tab.
    pub(crate) fn show_result(&mut self, state: ResearchState) {
        self.research.show_result(state);
    }
}
