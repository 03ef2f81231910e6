//! Core domain types for a research run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// ResearchId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper identifying one research run (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResearchId(pub Uuid);

impl ResearchId {
    /// Generate a new time-sortable identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ResearchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ResearchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ResearchId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

// ---------------------------------------------------------------------------
// Document / Source
// ---------------------------------------------------------------------------

/// An article retrieved for a query, with its body already length-capped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Title the article was fetched under.
    pub title: String,
    /// Plain-text body, possibly truncated with a marker appended.
    pub body: String,
    /// Canonical article URL.
    pub url: String,
    /// Lead-section summary, at most 500 characters.
    pub summary: String,
}

/// A citation shown alongside the answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
    pub summary: String,
}

impl From<&Document> for Source {
    fn from(doc: &Document) -> Self {
        Self {
            title: doc.title.clone(),
            url: doc.url.clone(),
            summary: doc.summary.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// ResearchState
// ---------------------------------------------------------------------------

/// The record threaded through the pipeline stages.
///
/// One instance per research request; never shared between requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchState {
    pub query: String,
    /// Candidate article titles, in provider order.
    #[serde(default)]
    pub search_results: Vec<String>,
    /// Successfully fetched articles, in encounter order.
    #[serde(default)]
    pub documents: Vec<Document>,
    /// Final answer, or a readable error sentence.
    #[serde(default)]
    pub answer: String,
    /// One citation per document, same order.
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResearchState {
    /// Fresh state for `query` with every other field empty.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Build the citation list from the current documents.
    pub fn sources_from_documents(&self) -> Vec<Source> {
        self.documents.iter().map(Source::from).collect()
    }

    /// Whether the query is empty or whitespace-only.
    pub fn has_blank_query(&self) -> bool {
        self.query.trim().is_empty()
    }
}
