//! Contracts for the external services the pipeline consumes.
//!
//! The pipeline only sees these traits; the HTTP implementations live in
//! `wikiresearch-wikipedia` and `wikiresearch-llm`.

use serde::{Deserialize, Serialize};

use crate::error::ProviderResult;

/// Full article content as returned by a [`FetchProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Title the provider resolved (may differ from the requested one after
    /// redirects).
    pub title: String,
    /// Full plain-text content.
    pub content: String,
    /// Canonical URL.
    pub url: String,
    /// Short lead-section summary, if the provider has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// A single text-generation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub prompt: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Maps a search term to an ordered list of article titles.
///
/// Zero hits is `Ok(vec![])`, not an error. Implementations may report
/// [`ProviderError::Disambiguation`](crate::ProviderError::Disambiguation)
/// with alternative titles.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    async fn search(&self, term: &str, limit: usize) -> ProviderResult<Vec<String>>;
}

/// Resolves a title to its article content.
///
/// Must report
/// [`ProviderError::Disambiguation`](crate::ProviderError::Disambiguation) and
/// [`ProviderError::PageNotFound`](crate::ProviderError::PageNotFound)
/// distinguishably from other faults.
#[async_trait::async_trait]
pub trait FetchProvider: Send + Sync {
    async fn fetch(&self, title: &str) -> ProviderResult<Article>;
}

/// Single request/response text generation.
#[async_trait::async_trait]
pub trait GenerationProvider: Send + Sync {
    fn model(&self) -> &str;
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String>;
}
