//! Runtime configuration loaded from an optional YAML file.
//!
//! Every section has defaults, so an empty file (or no file at all) yields a
//! working configuration. Command-line flags override values from the file.
//!
//! ```yaml
//! preferences: ["AI", "Climate Change"]
//! feeds: ["https://www.moneycontrol.com/rss/technology.xml"]
//! concurrency: 4
//! fetch:
//!   timeout_secs: 100
//! extraction:
//!   content_selectors: ["div.article_content", "div.text"]
//! llm:
//!   model: llama-3.3-70b-versatile
//! summary:
//!   max_words: 200
//! ```

use crate::error::ConfigError;
use crate::extract::DEFAULT_CONTENT_SELECTORS;
use crate::models::CatalogEntry;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, instrument};

/// Browser-like User-Agent sent with article requests.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DigestConfig {
    /// Keywords matched against catalog titles.
    pub preferences: Vec<String>,
    /// Static catalog of articles to choose from.
    pub catalog: Vec<CatalogEntry>,
    /// RSS or Atom feeds whose items are appended to the catalog.
    pub feeds: Vec<String>,
    /// Number of articles processed at the same time.
    pub concurrency: usize,
    pub fetch: FetchConfig,
    pub extraction: ExtractionConfig,
    pub llm: LlmConfig,
    pub summary: SummaryConfig,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            preferences: vec![
                "AI".to_string(),
                "Climate Change".to_string(),
                "Stock Market".to_string(),
            ],
            catalog: vec![CatalogEntry {
                title: " Sharechat swaps cash burn for sustainable growth, eyeing IPO in 2 yrs: CEO Ankush Sachdeva".to_string(),
                url: "https://www.moneycontrol.com/technology/sharechat-swaps-cash-burn-for-sustainable-growth-eyeing-ipo-in-2-yrs-ceo-ankush-sachdeva-article-13010134.html".to_string(),
            }],
            feeds: Vec::new(),
            concurrency: 4,
            fetch: FetchConfig::default(),
            extraction: ExtractionConfig::default(),
            llm: LlmConfig::default(),
            summary: SummaryConfig::default(),
        }
    }
}

impl DigestConfig {
    /// Read and validate a YAML configuration file.
    #[instrument(level = "info")]
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config: DigestConfig =
            serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
                path: path.to_string(),
                source,
            })?;
        config.validate()?;
        info!(path, "Loaded configuration");
        Ok(config)
    }

    /// Load `path` if given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&str>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::Invalid("concurrency must be at least 1".into()));
        }
        if self.extraction.content_selectors.is_empty() {
            return Err(ConfigError::NoSelectors);
        }
        if self.summary.chunk_size == 0 {
            return Err(ConfigError::Invalid("summary.chunk_size must be at least 1".into()));
        }
        if self.summary.chunk_overlap >= self.summary.chunk_size {
            return Err(ConfigError::Invalid(format!(
                "summary.chunk_overlap ({}) must be smaller than summary.chunk_size ({})",
                self.summary.chunk_overlap, self.summary.chunk_size
            )));
        }
        if self.summary.max_input_chars < self.summary.chunk_size {
            return Err(ConfigError::Invalid(
                "summary.max_input_chars must be at least summary.chunk_size".into(),
            ));
        }
        Ok(())
    }
}

/// HTTP settings for article and feed requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Upper bound for a single request, in seconds.
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 100,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

/// Content selectors in priority order.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub content_selectors: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            content_selectors: DEFAULT_CONTENT_SELECTORS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Connection settings for the OpenAI-compatible chat completions backend.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    /// Bearer token. Usually supplied through `GROQ_API_KEY` instead.
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after the first failed attempt.
    pub max_retries: usize,
    /// First backoff delay in milliseconds; doubles on each retry.
    pub base_delay_ms: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.7,
            max_tokens: 500,
            timeout_secs: 60,
            max_retries: 3,
            base_delay_ms: 1000,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("base_delay_ms", &self.base_delay_ms)
            .finish()
    }
}

/// Prompt and chunking settings for summaries.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SummaryConfig {
    /// Word limit stated in the prompt.
    pub max_words: usize,
    /// Chunk size in characters.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
    /// Largest text sent in one prompt before switching to map-reduce.
    pub max_input_chars: usize,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            max_words: 200,
            chunk_size: 300,
            chunk_overlap: 20,
            max_input_chars: 24_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = DigestConfig::default();
        config.validate().unwrap();
        assert_eq!(config.preferences, vec!["AI", "Climate Change", "Stock Market"]);
        assert_eq!(config.fetch.timeout_secs, 100);
        assert_eq!(config.extraction.content_selectors[0], "div.content_wrapper");
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.summary.chunk_size, 300);
        assert_eq!(config.summary.chunk_overlap, 20);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
preferences: ["sharechat"]
llm:
  model: llama-3.1-8b-instant
extraction:
  content_selectors: ["div.story", "main"]
"#;
        let config: DigestConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.preferences, vec!["sharechat"]);
        assert_eq!(config.llm.model, "llama-3.1-8b-instant");
        assert_eq!(config.llm.api_base, "https://api.groq.com/openai/v1");
        assert_eq!(config.extraction.content_selectors, vec!["div.story", "main"]);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.catalog.len(), 1);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "catalog:\n  - title: Rust 2024 released\n    url: https://example.com/rust\nconcurrency: 2"
        )
        .unwrap();

        let config = DigestConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.concurrency, 2);
        assert_eq!(config.catalog[0].title, "Rust 2024 released");
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let config: DigestConfig =
            serde_yaml::from_str(include_str!("../config.example.yaml")).unwrap();
        config.validate().unwrap();
        let defaults = DigestConfig::default();
        assert_eq!(config.preferences, defaults.preferences);
        assert_eq!(config.extraction.content_selectors, defaults.extraction.content_selectors);
        assert_eq!(config.feeds.len(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DigestConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "concurrency: [not, a, number]").unwrap();
        let err = DigestConfig::load(file.path().to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_validate_rejects_overlap_not_below_chunk_size() {
        let mut config = DigestConfig::default();
        config.summary.chunk_overlap = 300;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_zero_concurrency() {
        let mut config = DigestConfig::default();
        config.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = LlmConfig {
            api_key: Some("gsk_secret".to_string()),
            ..LlmConfig::default()
        };
        let printed = format!("{config:?}");
        assert!(!printed.contains("gsk_secret"));
        assert!(printed.contains("<redacted>"));
    }
}
