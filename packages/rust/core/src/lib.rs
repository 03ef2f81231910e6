//! Research pipeline and domain logic for WikiResearch.
//!
//! A query flows through three [`Stage`]s sharing one
//! [`ResearchState`](wikiresearch_shared::ResearchState): search for candidate
//! titles, fetch and cap their content, then synthesize a cited answer.
//! [`ResearchPipeline`] drives them; [`ResearchHistory`] and [`report`] serve
//! the front ends.

pub mod fetch;
pub mod history;
pub mod pipeline;
pub mod report;
pub mod search;
pub mod stage;
pub mod synthesis;

#[cfg(test)]
mod test_support;

pub use fetch::{FetchOutcome, FetchStage};
pub use history::{DEFAULT_HISTORY_CAPACITY, HistoryEntry, ResearchHistory};
pub use pipeline::{ProgressReporter, ResearchPipeline, SilentProgress};
pub use search::SearchStage;
pub use stage::Stage;
pub use synthesis::{SynthesisOptions, SynthesisStage};
