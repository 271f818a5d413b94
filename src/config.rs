//! Configuration loading and management for serpsum.
//!
//! Loads settings from `serpsum.toml` with environment variable overrides for
//! sensitive data. The resulting [`Config`] is immutable and passed by
//! reference into the pipeline; the core never reads ambient state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::scraper::QuoraMode;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("result_count must be between 1 and 5, got {0}")]
    InvalidResultCount(u8),
}

/// Search-engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Restrict results to one site (`site:` operator). `None` means a plain
    /// web search.
    #[serde(default)]
    pub custom_domain: Option<String>,
    /// How many SERP URLs to process per query (1..=5).
    #[serde(default = "default_result_count")]
    pub result_count: u8,
    /// Target country code, e.g. "US".
    #[serde(default = "default_country")]
    pub country: String,
    /// Target language code, e.g. "en".
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_result_count() -> u8 {
    3
}

fn default_country() -> String {
    "US".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            custom_domain: None,
            result_count: default_result_count(),
            country: default_country(),
            language: default_language(),
        }
    }
}

/// Pipeline behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Summarisation backend name, e.g. "T5-base".
    pub model: String,
    /// Drop low-readability sentences before summarising.
    #[serde(default = "default_true")]
    pub filter_sentences: bool,
    /// Content-trimming rule for Q&A pages.
    #[serde(default)]
    pub quora_mode: QuoraMode,
    #[serde(default = "default_min_summary_length")]
    pub min_summary_length: usize,
    #[serde(default = "default_max_summary_length")]
    pub max_summary_length: usize,
}

fn default_true() -> bool {
    true
}

fn default_min_summary_length() -> usize {
    64
}

fn default_max_summary_length() -> usize {
    512
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            model: "T5-base".to_string(),
            filter_sentences: true,
            quora_mode: QuoraMode::default(),
            min_summary_length: default_min_summary_length(),
            max_summary_length: default_max_summary_length(),
        }
    }
}

/// Throttling of outbound search requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThrottleConfig {
    /// Checkpoint and pause before every Nth search request.
    #[serde(default = "default_checkpoint_every")]
    pub checkpoint_every: usize,
    /// Seconds to pause at each checkpoint.
    #[serde(default = "default_pause_secs")]
    pub pause_secs: u64,
}

fn default_checkpoint_every() -> usize {
    10
}

fn default_pause_secs() -> u64 {
    10
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            checkpoint_every: default_checkpoint_every(),
            pause_secs: default_pause_secs(),
        }
    }
}

/// Project output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("./data"),
        }
    }
}

/// Email notification settings. Both the password and the destination must
/// be present for a mail to be sent; leaving either out opts out.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmailConfig {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub sender: Option<String>,
    #[serde(default)]
    pub smtp_server: Option<String>,
    /// Loaded from `SERPSUM_SMTP_PASSWORD`, never from the file.
    #[serde(skip)]
    pub smtp_password: Option<String>,
}

/// API tokens (loaded from environment).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    #[serde(default)]
    pub hf_token: Option<String>,
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default)]
    pub throttle: ThrottleConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Load configuration from the default location (serpsum.toml in cwd or home)
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::find_config_file()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&content)?;

        // Override secrets from environment variables
        if let Ok(pwd) = std::env::var("SERPSUM_SMTP_PASSWORD") {
            config.email.smtp_password = Some(pwd);
        }
        if let Ok(token) = std::env::var("HF_API_TOKEN") {
            config.api.hf_token = Some(token);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check constraints that the type system cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=5).contains(&self.search.result_count) {
            return Err(ConfigError::InvalidResultCount(self.search.result_count));
        }
        Ok(())
    }

    /// Find the config file in standard locations
    fn find_config_file() -> Result<PathBuf, ConfigError> {
        // Check current directory first
        let local_config = PathBuf::from("serpsum.toml");
        if local_config.exists() {
            return Ok(local_config);
        }

        // Check home directory
        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config").join("serpsum").join("serpsum.toml");
            if home_config.exists() {
                return Ok(home_config);
            }
        }

        // Default to local path (will error on read)
        Ok(local_config)
    }
}
