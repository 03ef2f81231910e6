//! Error types for WikiResearch.
//!
//! Library crates use [`WikiResearchError`] and [`ProviderError`] via `thiserror`.
//! App crates (cli/tui) wrap these with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Faults reported by the external search, fetch, and generation providers.
///
/// The disambiguation and not-found variants are distinguishable so the
/// pipeline stages can recover from them instead of giving up.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The title matches several topics; `options` lists the alternatives.
    #[error("\"{title}\" may refer to: {}", options.join(", "))]
    Disambiguation { title: String, options: Vec<String> },

    /// No page exists for the requested title.
    #[error("page \"{0}\" does not match any pages")]
    PageNotFound(String),

    /// Transport-level failure (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The provider answered but the response was unusable.
    #[error("provider API error: {0}")]
    Api(String),

    /// Text-generation request failed.
    #[error("generation error: {0}")]
    Generation(String),

    /// The provider is missing required configuration (e.g. an API key).
    #[error("not configured: {0}")]
    NotConfigured(String),
}

/// Convenience alias for provider calls.
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Top-level error type for all WikiResearch operations.
#[derive(Debug, thiserror::Error)]
pub enum WikiResearchError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Network/HTTP error outside a provider call (e.g. client construction).
    #[error("network error: {0}")]
    Network(String),

    /// A provider fault that escaped stage-level handling.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Input or settings validation error.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// JSON/TOML (de)serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, WikiResearchError>;

impl WikiResearchError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = WikiResearchError::config("missing API key");
        assert_eq!(err.to_string(), "config error: missing API key");

        let err = WikiResearchError::validation("max_search_results must be between 1 and 5");
        assert!(err.to_string().contains("between 1 and 5"));
    }

    #[test]
    fn disambiguation_lists_options() {
        let err = ProviderError::Disambiguation {
            title: "Mercury".into(),
            options: vec!["Mercury (planet)".into(), "Mercury (element)".into()],
        };
        assert_eq!(
            err.to_string(),
            "\"Mercury\" may refer to: Mercury (planet), Mercury (element)"
        );
    }

    #[test]
    fn provider_error_is_transparent() {
        let err: WikiResearchError = ProviderError::Generation("HTTP 429".into()).into();
        assert_eq!(err.to_string(), "generation error: HTTP 429");
    }
}
