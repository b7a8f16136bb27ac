//! Application configuration, loaded from TOML.
//!
//! Every section and field has a default, so an empty file (or no file at
//! all) is a valid configuration. The API key is never stored in code: it
//! comes from the file or from the `COINGECKO_API_KEY` environment variable.

use crate::aggregate::IndicatorConfig;
use crate::analysis::{DEFAULT_FORECAST_DAYS, DEFAULT_TREND_WINDOW};
use crate::data::coingecko::DEFAULT_BASE_URL;
use crate::data::request_cache::DEFAULT_CACHE_CAPACITY;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const API_KEY_ENV: &str = "COINGECKO_API_KEY";
pub const MAX_RETRIES: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Minimum spacing between requests.
    pub rate_limit_ms: u64,
    pub cache_capacity: usize,
    pub max_retries: u32,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            rate_limit_ms: 6_000,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_retries: 3,
            timeout_secs: 30,
        }
    }
}

impl ApiConfig {
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub trend_window: usize,
    pub forecast_days: usize,
    pub forecast_lookback: usize,
    pub indicators: IndicatorConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            trend_window: DEFAULT_TREND_WINDOW,
            forecast_days: DEFAULT_FORECAST_DAYS,
            forecast_lookback: 30,
            indicators: IndicatorConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub analysis: AnalysisConfig,
}

impl AppConfig {
    /// Load from a TOML file, then fill a missing API key from the environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str::<Self>(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config.with_api_key_from(|name| std::env::var(name).ok()))
    }

    /// Defaults plus the environment API key.
    pub fn from_env() -> Self {
        Self::default().with_api_key_from(|name| std::env::var(name).ok())
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config = toml::from_str::<Self>(content).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Keep a configured key; otherwise take `COINGECKO_API_KEY` from `lookup`.
    /// Blank keys count as absent.
    pub fn with_api_key_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let configured = self.api.api_key.take().filter(|k| !k.trim().is_empty());
        self.api.api_key =
            configured.or_else(|| lookup(API_KEY_ENV).filter(|k| !k.trim().is_empty()));
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api.base_url is empty".into()));
        }
        if self.api.max_retries > MAX_RETRIES {
            return Err(ConfigError::Invalid(format!(
                "api.max_retries must be <= {MAX_RETRIES}"
            )));
        }
        if self.analysis.trend_window == 0 {
            return Err(ConfigError::Invalid("analysis.trend_window must be > 0".into()));
        }
        if self.analysis.forecast_days == 0 {
            return Err(ConfigError::Invalid("analysis.forecast_days must be > 0".into()));
        }
        if self.analysis.forecast_lookback < 2 {
            return Err(ConfigError::Invalid(
                "analysis.forecast_lookback must be >= 2".into(),
            ));
        }
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// BLAKE3 hex digest of the canonical JSON form, API key excluded.
    ///
    /// Two configs that produce the same analysis share a fingerprint.
    pub fn fingerprint(&self) -> String {
        let mut redacted = self.clone();
        redacted.api.api_key = None;
        // plain structs and maps of strings always serialize
        let json = serde_json::to_vec(&redacted).unwrap_or_default();
        blake3::hash(&json).to_hex().to_string()
    }
}
