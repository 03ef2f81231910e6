//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Bottom status bar; highlighted while research is running.
pub(crate) fn status_bar(msg: &str, busy: bool) -> Paragraph<'_> {
    let bg = if busy { Color::Blue } else { Color::DarkGray };
    let marker = if busy { "⟳ " } else { "" };
    Paragraph::new(format!(" {marker}{msg}"))
        .style(
            Style::default()
                .bg(bg)
                .fg(Color::White),
        )
}
