//! Search stage: query → candidate article titles.

use std::sync::Arc;

use tracing::{error, info, instrument};
use wikiresearch_shared::{
    ProviderError, ProviderResult, ResearchState, Result, SearchProvider,
};

use crate::stage::Stage;

/// Error recorded when the query is empty or whitespace-only.
pub const NO_QUERY_PROVIDED: &str = "No query provided";

/// Looks up candidate titles for the query, falling back to a broader term
/// when the full query finds nothing.
pub struct SearchStage {
    provider: Arc<dyn SearchProvider>,
    max_results: usize,
}

impl SearchStage {
    pub fn new(provider: Arc<dyn SearchProvider>, max_results: usize) -> Self {
        Self {
            provider,
            max_results,
        }
    }

    /// Search for `query`; on zero hits, retry once with its first token.
    async fn search_with_broadening(&self, query: &str) -> ProviderResult<Vec<String>> {
        let titles = self.provider.search(query, self.max_results).await?;
        if !titles.is_empty() {
            return Ok(titles);
        }

        let broadened = broadened_term(query);
        info!(%broadened, "no results, retrying with broadened term");
        self.provider.search(broadened, self.max_results).await
    }
}

/// First whitespace-delimited token of the query (the query itself if it
/// has none).
pub fn broadened_term(query: &str) -> &str {
    query.split_whitespace().next().unwrap_or(query)
}

#[async_trait::async_trait]
impl Stage for SearchStage {
    fn name(&self) -> &'static str {
        "search"
    }

    fn label(&self) -> &'static str {
        "Searching Wikipedia articles..."
    }

    #[instrument(skip_all, fields(query = %state.query, provider = self.provider.name()))]
    async fn run(&self, state: &mut ResearchState) -> Result<()> {
        if state.has_blank_query() {
            state.search_results.clear();
            state.error = Some(NO_QUERY_PROVIDED.into());
            return Ok(());
        }

        info!(max_results = self.max_results, "searching");

        match self.search_with_broadening(&state.query).await {
            Ok(mut titles) => {
                titles.truncate(self.max_results);
                info!(found = titles.len(), "search complete");
                state.search_results = titles;
            }
            Err(ProviderError::Disambiguation { title, options }) => {
                info!(%title, "disambiguation found, using first {} options", self.max_results);
                state.search_results = options.into_iter().take(self.max_results).collect();
            }
            Err(e) => {
                error!(error = %e, "search failed");
                state.search_results.clear();
                state.error = Some(e.to_string());
            }
        }

        Ok(())
    }
}
