//! Shared types, error model, provider contracts, and configuration for
//! WikiResearch.
//!
//! This crate is the foundation depended on by all other WikiResearch crates.
//! It provides:
//! - [`WikiResearchError`] and [`ProviderError`], the error model
//! - Domain types ([`ResearchState`], [`Document`], [`Source`], [`ResearchId`])
//! - Provider traits ([`SearchProvider`], [`FetchProvider`], [`GenerationProvider`])
//! - Configuration ([`AppConfig`], [`ResearchSettings`], config loading)

pub mod config;
pub mod error;
pub mod provider;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, LlmConfig, MAX_CONTENT_LENGTH_RANGE, MAX_SEARCH_RESULTS_RANGE, ResearchSettings,
    WikipediaConfig, config_dir, config_file_path, init_config, load_config, load_config_from,
    validate_api_key,
};
pub use error::{ProviderError, ProviderResult, Result, WikiResearchError};
pub use provider::{Article, FetchProvider, GenerationProvider, GenerationRequest, SearchProvider};
pub use types::{Document, ResearchId, ResearchState, Source};
