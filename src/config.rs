//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SerpAPI key
    #[serde(default)]
    pub api_key: Option<String>,

    /// Override for the SerpAPI base URL
    #[serde(default)]
    pub serp_base_url: Option<String>,

    /// Override for the exchange-rate API base URL
    #[serde(default)]
    pub fx_base_url: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Currency prices are requested and compared in
    #[serde(default = "default_source_currency")]
    pub source_currency: String,

    /// Currency prices are converted into
    #[serde(default = "default_target_currency")]
    pub target_currency: String,

    /// Rate used when the live lookup fails
    #[serde(default = "default_fallback_rate")]
    pub fallback_rate: f64,

    /// Number of adults per room
    #[serde(default = "default_adults")]
    pub adults: u32,

    /// Country hint (`gl`)
    #[serde(default = "default_country")]
    pub country: String,

    /// Language hint (`hl`)
    #[serde(default = "default_language")]
    pub language: String,

    /// Timeout for each hotel search, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout for the exchange-rate lookup, in seconds
    #[serde(default = "default_fx_timeout_secs")]
    pub fx_timeout_secs: u64,

    /// How long a fetched rate stays valid, in seconds
    #[serde(default = "default_rate_ttl_secs")]
    pub rate_ttl_secs: u64,

    /// Maximum number of cached currency pairs
    #[serde(default = "default_rate_cache_capacity")]
    pub rate_cache_capacity: usize,

    /// Maximum searches in flight
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Base delay before each search in milliseconds
    #[serde(default)]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default)]
    pub delay_jitter_ms: u64,

    /// Maximum hotels per comparison
    #[serde(default = "default_max_hotels")]
    pub max_hotels: usize,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_source_currency() -> String {
    "TRY".to_string()
}

fn default_target_currency() -> String {
    "USD".to_string()
}

fn default_fallback_rate() -> f64 {
    0.029
}

fn default_adults() -> u32 {
    2
}

fn default_country() -> String {
    "tr".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_fx_timeout_secs() -> u64 {
    10
}

fn default_rate_ttl_secs() -> u64 {
    3600
}

fn default_rate_cache_capacity() -> usize {
    16
}

fn default_concurrency() -> usize {
    4
}

fn default_max_hotels() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            serp_base_url: None,
            fx_base_url: None,
            proxy: None,
            source_currency: default_source_currency(),
            target_currency: default_target_currency(),
            fallback_rate: default_fallback_rate(),
            adults: default_adults(),
            country: default_country(),
            language: default_language(),
            request_timeout_secs: default_request_timeout_secs(),
            fx_timeout_secs: default_fx_timeout_secs(),
            rate_ttl_secs: default_rate_ttl_secs(),
            rate_cache_capacity: default_rate_cache_capacity(),
            concurrency: default_concurrency(),
            delay_ms: 0,
            delay_jitter_ms: 0,
            max_hotels: default_max_hotels(),
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("hotel-compare").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = std::env::var("SERPAPI_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key.trim().to_string());
            }
        }

        if let Ok(proxy) = std::env::var("HOTEL_COMPARE_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(concurrency) = std::env::var("HOTEL_COMPARE_CONCURRENCY") {
            if let Ok(c) = concurrency.parse() {
                self.concurrency = c;
            }
        }

        if let Ok(delay) = std::env::var("HOTEL_COMPARE_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        self
    }

    /// Rejects settings the comparison cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !(self.fallback_rate.is_finite() && self.fallback_rate > 0.0) {
            anyhow::bail!("fallback_rate must be a positive number, got {}", self.fallback_rate);
        }
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        if self.request_timeout_secs == 0 || self.fx_timeout_secs == 0 {
            anyhow::bail!("timeouts must be at least 1 second");
        }
        if self.source_currency.trim().is_empty() || self.target_currency.trim().is_empty() {
            anyhow::bail!("source_currency and target_currency must be set");
        }
        Ok(())
    }

    /// Returns the API key or an error explaining how to set it.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .context("SERPAPI_KEY is not set. Export it or add api_key to config.toml")
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
