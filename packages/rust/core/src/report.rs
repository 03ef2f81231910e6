//! Plain-text and Markdown renderings of a research result.

use chrono::{DateTime, TimeZone};
use wikiresearch_shared::{ResearchState, Source};

/// Characters of a source summary shown in the citation list.
pub const SUMMARY_PREVIEW_CHARS: usize = 200;

/// Longest history label before it is shortened.
pub const HISTORY_LABEL_MAX: usize = 50;

/// Numbered citation list with linked titles and a short summary preview.
pub fn format_sources(sources: &[Source]) -> String {
    if sources.is_empty() {
        return "No sources available".to_string();
    }

    sources
        .iter()
        .enumerate()
        .map(|(i, source)| {
            let mut line = format!("{}. **[{}]({})**", i + 1, source.title, source.url);
            if !source.summary.is_empty() {
                line.push_str(&format!(
                    "\n   *{}*",
                    shorten(&source.summary, SUMMARY_PREVIEW_CHARS, 0)
                ));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Markdown document suitable for saving to disk.
pub fn render_markdown(state: &ResearchState) -> String {
    let mut out = format!(
        "# Research Query: {}\n\n## Answer:\n{}\n\n## Sources:\n",
        state.query, state.answer
    );
    for (i, source) in state.sources.iter().enumerate() {
        out.push_str(&format!("{}. {} - {}\n", i + 1, source.title, source.url));
    }
    out
}

/// `wikipedia_research_YYYYmmdd_HHMMSS.md` for the given moment.
pub fn export_file_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("wikipedia_research_{}.md", at.format("%Y%m%d_%H%M%S"))
}

/// Query shortened to at most [`HISTORY_LABEL_MAX`] characters.
pub fn history_label(query: &str) -> String {
    shorten(query, HISTORY_LABEL_MAX, 3)
}

/// Keep `text` when it fits in `max` chars; otherwise keep `max - reserve`
/// chars and append "...".
fn shorten(text: &str, max: usize, reserve: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max - reserve).collect();
    format!("{kept}...")
}
