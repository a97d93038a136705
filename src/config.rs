//! Configuration loading and management.
//!
//! Loads settings from `research.toml` with environment variable overrides for
//! credentials. Every section is optional; a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const CONFIG_FILE: &str = "research.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Summarization service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Summarize endpoint URL
    pub endpoint: String,
    /// Summarization model name
    pub model: String,
    /// Target summary length ("short", "medium", "long")
    pub length: String,
    /// Output format ("paragraph" or "bullets")
    pub format: String,
    pub extractiveness: String,
    pub temperature: f32,
    /// Upper bound on characters per chunk sent to the service
    pub max_chunk_len: usize,
    /// Maximum number of re-summarization passes over combined chunk summaries
    pub max_depth: usize,
    pub retry: RetryPolicy,
}

/// Per-chunk retry behaviour for the summarization call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Attempts per chunk, including the first
    pub attempts: u32,
    /// First rate-limit wait; doubled on every further attempt
    pub backoff_base_ms: u64,
    /// Fixed wait after a timed out request
    pub timeout_delay_ms: u64,
    /// Timeout applied to each individual request
    pub request_timeout_ms: u64,
}

/// Keyword search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    /// Default number of results to process
    pub num_results: usize,
}

/// Page fetching settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub timeout_ms: u64,
    pub attempts: u32,
    pub retry_delay_ms: u64,
    /// Extracted text is cut to this many characters
    pub max_chars: usize,
}

/// Research run settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pause between sources to stay polite with the summarization service
    pub pace_ms: u64,
}

/// API keys configuration (loaded from environment)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub cohere_key: Option<String>,
    #[serde(default)]
    pub google_key: Option<String>,
    #[serde(default)]
    pub google_cse_id: Option<String>,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from the default location (research.toml in cwd or home)
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::load_from(&path)?,
            None => Config::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Load configuration from a specific path, without environment overrides
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Override API keys from environment variables
    pub fn apply_env(&mut self) {
        if let Some(key) = non_empty_env("COHERE_API_KEY") {
            self.api.cohere_key = Some(key);
        }
        if let Some(key) = non_empty_env("GOOGLE_API_KEY") {
            self.api.google_key = Some(key);
        }
        if let Some(id) = non_empty_env("GOOGLE_CSE_ID") {
            self.api.google_cse_id = Some(id);
        }
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Option<PathBuf> {
        let local_config = PathBuf::from(CONFIG_FILE);
        if local_config.exists() {
            return Some(local_config);
        }

        let home_config = dirs::home_dir()?
            .join(".config")
            .join("research")
            .join(CONFIG_FILE);
        home_config.exists().then_some(home_config)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl RetryPolicy {
    /// Wait before retrying the given zero-based attempt after a 429
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u64.saturating_pow(attempt);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    pub fn timeout_delay(&self) -> Duration {
        Duration::from_millis(self.timeout_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.cohere.ai/v1/summarize".to_string(),
            model: "summarize-xlarge".to_string(),
            length: "medium".to_string(),
            format: "paragraph".to_string(),
            extractiveness: "auto".to_string(),
            temperature: 0.3,
            max_chunk_len: crate::chunker::DEFAULT_MAX_LEN,
            max_depth: 2,
            retry: RetryPolicy::default(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff_base_ms: 1_000,
            timeout_delay_ms: 3_000,
            request_timeout_ms: 30_000,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://www.googleapis.com/customsearch/v1".to_string(),
            num_results: 5,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            attempts: 3,
            retry_delay_ms: 2_000,
            max_chars: 4_000,
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { pace_ms: 2_000 }
    }
}
