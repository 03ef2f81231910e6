//! Fetch stage: candidate titles → length-capped documents.
//!
//! Every title is resolved independently into a [`FetchOutcome`]; a title
//! that cannot be resolved becomes a skip and never aborts the batch.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use wikiresearch_shared::{
    Article, Document, FetchProvider, ProviderError, ResearchState, Result,
};

use crate::stage::Stage;

/// Error recorded when there is nothing to fetch.
pub const NO_SEARCH_RESULTS: &str = "No search results to process";

/// Appended to a body that was cut at the content limit.
pub const TRUNCATION_MARKER: &str = "... [Content truncated]";

/// Maximum characters kept from an article summary.
pub const MAX_SUMMARY_CHARS: usize = 500;

/// Result of resolving one candidate title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Fetched(Document),
    Skipped { title: String, reason: String },
}

/// Retrieves article content for each candidate title.
pub struct FetchStage {
    provider: Arc<dyn FetchProvider>,
    max_content_length: usize,
}

impl FetchStage {
    pub fn new(provider: Arc<dyn FetchProvider>, max_content_length: usize) -> Self {
        Self {
            provider,
            max_content_length,
        }
    }

    /// Resolve a single title, following at most one disambiguation hop.
    pub async fn fetch_one(&self, title: &str) -> FetchOutcome {
        match self.provider.fetch(title).await {
            Ok(article) => FetchOutcome::Fetched(self.to_document(title, article)),
            Err(ProviderError::Disambiguation { options, .. }) => {
                let Some(alternative) = options.into_iter().next() else {
                    warn!(%title, "disambiguation without alternatives");
                    return skipped(title, "disambiguation page lists no alternatives");
                };
                match self.provider.fetch(&alternative).await {
                    Ok(article) => {
                        info!(%title, %alternative, "resolved disambiguation");
                        FetchOutcome::Fetched(self.to_document(&alternative, article))
                    }
                    Err(e) => {
                        warn!(%title, error = %e, "could not resolve disambiguation");
                        skipped(title, format!("could not resolve disambiguation: {e}"))
                    }
                }
            }
            Err(e @ ProviderError::PageNotFound(_)) => {
                warn!(%title, "page not found");
                skipped(title, e.to_string())
            }
            Err(e) => {
                error!(%title, error = %e, "error retrieving page");
                skipped(title, e.to_string())
            }
        }
    }

    fn to_document(&self, title: &str, article: Article) -> Document {
        Document {
            title: title.to_string(),
            body: truncate_body(&article.content, self.max_content_length),
            url: article.url,
            summary: article
                .summary
                .map(|s| s.chars().take(MAX_SUMMARY_CHARS).collect())
                .unwrap_or_default(),
        }
    }
}

fn skipped(title: &str, reason: impl Into<String>) -> FetchOutcome {
    FetchOutcome::Skipped {
        title: title.to_string(),
        reason: reason.into(),
    }
}

/// Keep the first `max_chars` characters of `content`, appending
/// [`TRUNCATION_MARKER`] when anything was cut.
pub fn truncate_body(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{TRUNCATION_MARKER}", &content[..cut]),
        None => content.to_string(),
    }
}

#[async_trait::async_trait]
impl Stage for FetchStage {
    fn name(&self) -> &'static str {
        "fetch"
    }

    fn label(&self) -> &'static str {
        "Extracting article content..."
    }

    #[instrument(skip_all, fields(titles = state.search_results.len()))]
    async fn run(&self, state: &mut ResearchState) -> Result<()> {
        if state.search_results.is_empty() {
            state.documents.clear();
            state.error = Some(NO_SEARCH_RESULTS.into());
            return Ok(());
        }

        let mut outcomes = Vec::with_capacity(state.search_results.len());
        for title in &state.search_results {
            info!(%title, "retrieving content");
            outcomes.push(self.fetch_one(title).await);
        }

        state.documents = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                FetchOutcome::Fetched(doc) => Some(doc),
                FetchOutcome::Skipped { .. } => None,
            })
            .collect();

        info!(documents = state.documents.len(), "retrieval complete");
        Ok(())
    }
}
