//! Application configuration for WikiResearch.
//!
//! User config lives at `~/.wikiresearch/wikiresearch.toml`.
//! CLI flags override environment variables, which override config file
//! values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, WikiResearchError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "wikiresearch.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".wikiresearch";

/// Allowed range for the number of articles searched per query.
pub const MAX_SEARCH_RESULTS_RANGE: std::ops::RangeInclusive<usize> = 1..=5;

/// Allowed range for the per-article content cap, in characters.
pub const MAX_CONTENT_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 1000..=5000;

// ---------------------------------------------------------------------------
// Config structs (matching wikiresearch.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Pipeline knobs.
    #[serde(default)]
    pub research: ResearchSettings,

    /// Wikipedia API client settings.
    #[serde(default)]
    pub wikipedia: WikipediaConfig,

    /// Text-generation provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

/// `[research]` section: the options the pipeline itself recognizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchSettings {
    /// Maximum number of candidate articles per query.
    #[serde(default = "default_max_search_results")]
    pub max_search_results: usize,

    /// Maximum characters kept from each article body.
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,

    /// Wikipedia language edition (e.g. "en", "de").
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for ResearchSettings {
    fn default() -> Self {
        Self {
            max_search_results: default_max_search_results(),
            max_content_length: default_max_content_length(),
            language: default_language(),
        }
    }
}

impl ResearchSettings {
    /// Reject values outside the ranges the front ends expose.
    pub fn validate(&self) -> Result<()> {
        if !MAX_SEARCH_RESULTS_RANGE.contains(&self.max_search_results) {
            return Err(WikiResearchError::validation(format!(
                "max_search_results must be between {} and {}, got {}",
                MAX_SEARCH_RESULTS_RANGE.start(),
                MAX_SEARCH_RESULTS_RANGE.end(),
                self.max_search_results
            )));
        }
        if !MAX_CONTENT_LENGTH_RANGE.contains(&self.max_content_length) {
            return Err(WikiResearchError::validation(format!(
                "max_content_length must be between {} and {}, got {}",
                MAX_CONTENT_LENGTH_RANGE.start(),
                MAX_CONTENT_LENGTH_RANGE.end(),
                self.max_content_length
            )));
        }
        if self.language.trim().is_empty() {
            return Err(WikiResearchError::validation("language must not be empty"));
        }
        Ok(())
    }
}

fn default_max_search_results() -> usize {
    3
}
fn default_max_content_length() -> usize {
    3000
}
fn default_language() -> String {
    "en".into()
}

/// `[wikipedia]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WikipediaConfig {
    /// Override for the MediaWiki API endpoint. When unset, the endpoint is
    /// derived from the research language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// HTTP timeout in seconds.
    #[serde(default = "default_wikipedia_timeout")]
    pub timeout_secs: u64,

    /// User-Agent sent with every request (Wikimedia requires one).
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for WikipediaConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout_secs: default_wikipedia_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_wikipedia_timeout() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("WikiResearch/", env!("CARGO_PKG_VERSION")).into()
}

/// `[llm]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`).
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model ID.
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    /// HTTP timeout in seconds.
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_secs: default_llm_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.3
}
fn default_max_output_tokens() -> u32 {
    1000
}
fn default_llm_timeout() -> u64 {
    60
}

// ---------------------------------------------------------------------------
// Environment overrides
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Apply `WIKIPEDIA_LANGUAGE`, `MAX_SEARCH_RESULTS` and
    /// `MAX_CONTENT_LENGTH` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in
    /// production, a map in tests).
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(lang) = lookup("WIKIPEDIA_LANGUAGE").filter(|v| !v.trim().is_empty()) {
            self.research.language = lang.trim().to_string();
        }
        if let Some(raw) = lookup("MAX_SEARCH_RESULTS") {
            self.research.max_search_results = parse_env_usize("MAX_SEARCH_RESULTS", &raw)?;
        }
        if let Some(raw) = lookup("MAX_CONTENT_LENGTH") {
            self.research.max_content_length = parse_env_usize("MAX_CONTENT_LENGTH", &raw)?;
        }
        Ok(())
    }
}

fn parse_env_usize(key: &str, raw: &str) -> Result<usize> {
    raw.trim().parse().map_err(|_| {
        WikiResearchError::config(format!("{key} must be a positive integer, got '{raw}'"))
    })
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.wikiresearch/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| WikiResearchError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.wikiresearch/wikiresearch.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| WikiResearchError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        WikiResearchError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| WikiResearchError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content = toml::to_string_pretty(&config)
        .map_err(|e| WikiResearchError::Serialization(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| WikiResearchError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Check that the LLM API key env var is set and non-empty.
pub fn validate_api_key(config: &AppConfig) -> Result<()> {
    let var_name = &config.llm.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Ok(()),
        _ => Err(WikiResearchError::config(format!(
            "API key not found. Set the {var_name} environment variable.\n\
             You can get an API key from https://platform.openai.com/api-keys"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize default config");
        assert!(toml_str.contains("max_search_results = 3"));
        assert!(toml_str.contains("OPENAI_API_KEY"));
        assert!(!toml_str.contains("api_url"));
    }

    #[test]
    fn config_roundtrip() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");
        let parsed: AppConfig = toml::from_str(&toml_str).expect("deserialize");
        assert_eq!(parsed.research, ResearchSettings::default());
        assert_eq!(parsed.llm.model, "gpt-3.5-turbo");
        assert_eq!(parsed.llm.max_output_tokens, 1000);
    }

    #[test]
    fn partial_config_fills_defaults() {
        let toml_str = r#"
[research]
language = "de"

[wikipedia]
api_url = "http://localhost:8080/w/api.php"
"#;
        let config: AppConfig = toml::from_str(toml_str).expect("parse");
        assert_eq!(config.research.language, "de");
        assert_eq!(config.research.max_search_results, 3);
        assert_eq!(config.research.max_content_length, 3000);
        assert_eq!(
            config.wikipedia.api_url.as_deref(),
            Some("http://localhost:8080/w/api.php")
        );
        assert_eq!(config.wikipedia.timeout_secs, 30);
    }

    #[test]
    fn env_overrides_apply() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("WIKIPEDIA_LANGUAGE", "fr"),
            ("MAX_SEARCH_RESULTS", "5"),
            ("MAX_CONTENT_LENGTH", " 4000 "),
        ]);
        let mut config = AppConfig::default();
        config
            .apply_overrides_from(|k| env.get(k).map(|v| v.to_string()))
            .expect("overrides");
        assert_eq!(config.research.language, "fr");
        assert_eq!(config.research.max_search_results, 5);
        assert_eq!(config.research.max_content_length, 4000);
    }

    #[test]
    fn env_override_rejects_garbage() {
        let mut config = AppConfig::default();
        let err = config
            .apply_overrides_from(|k| (k == "MAX_SEARCH_RESULTS").then(|| "three".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("MAX_SEARCH_RESULTS"));
    }

    #[test]
    fn settings_validation_ranges() {
        assert!(ResearchSettings::default().validate().is_ok());

        let too_many = ResearchSettings {
            max_search_results: 6,
            ..Default::default()
        };
        assert!(too_many.validate().is_err());

        let too_short = ResearchSettings {
            max_content_length: 999,
            ..Default::default()
        };
        assert!(too_short.validate().is_err());

        let edges = ResearchSettings {
            max_search_results: 1,
            max_content_length: 5000,
            language: "en".into(),
        };
        assert!(edges.validate().is_ok());

        let blank_lang = ResearchSettings {
            language: "  ".into(),
            ..Default::default()
        };
        assert!(blank_lang.validate().is_err());
    }

    #[test]
    fn api_key_validation() {
        let mut config = AppConfig::default();
        // Use a unique env var name to avoid interfering with other tests
        config.llm.api_key_env = "WR_TEST_NONEXISTENT_KEY_12345".into();
        let result = validate_api_key(&config);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("API key not found"));
    }
}
