//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file).

use std::env;
use std::time::Duration;

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub discord: DiscordConfig,
    pub worker: WorkerConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
    /// Emit logs as JSON regardless of environment
    #[serde(default)]
    pub log_json: bool,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Remote API connection settings
#[derive(Clone, Deserialize)]
pub struct DiscordConfig {
    /// Credential sent verbatim in the `Authorization` header
    pub token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl DiscordConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Keep the credential out of logs
impl std::fmt::Debug for DiscordConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscordConfig")
            .field("token", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Reaction worker tuning
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerConfig {
    /// Pause between history page fetches
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
    /// Added on top of every server-specified retry delay
    #[serde(default = "default_retry_margin_ms")]
    pub retry_margin_ms: u64,
    /// Used when a 429 carries no parseable retry delay
    #[serde(default = "default_retry_after_ms")]
    pub default_retry_after_ms: u64,
    /// Give up on an operation after waiting this long on 429s (unset = never)
    #[serde(default)]
    pub max_throttle_wait_secs: Option<u64>,
    /// Upper bound for the reactions-per-second a run may request
    #[serde(default = "default_max_rate")]
    pub max_rate: u32,
    /// Capacity of a run's event channel
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl WorkerConfig {
    #[must_use]
    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    #[must_use]
    pub fn retry_margin(&self) -> Duration {
        Duration::from_millis(self.retry_margin_ms)
    }

    #[must_use]
    pub fn default_retry_after(&self) -> Duration {
        Duration::from_millis(self.default_retry_after_ms)
    }

    #[must_use]
    pub fn max_throttle_wait(&self) -> Option<Duration> {
        self.max_throttle_wait_secs.map(Duration::from_secs)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            page_delay_ms: default_page_delay_ms(),
            retry_margin_ms: default_retry_margin_ms(),
            default_retry_after_ms: default_retry_after_ms(),
            max_throttle_wait_secs: None,
            max_rate: default_max_rate(),
            event_buffer: default_event_buffer(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "emotify".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_api_base() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_user_agent() -> String {
    format!("emotify/{}", env!("CARGO_PKG_VERSION"))
}

fn default_page_delay_ms() -> u64 {
    200
}

fn default_retry_margin_ms() -> u64 {
    100
}

fn default_retry_after_ms() -> u64 {
    1000
}

fn default_max_rate() -> u32 {
    20
}

fn default_event_buffer() -> usize {
    256
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if `DISCORD_TOKEN` is missing or a value does not parse
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let parsed = |key: &'static str| -> Result<Option<u64>, ConfigError> {
            lookup(key)
                .map(|s| {
                    s.trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidValue(key, s))
                })
                .transpose()
        };

        let token = lookup("DISCORD_TOKEN")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::MissingVar("DISCORD_TOKEN"))?;

        let max_rate = match lookup("MAX_RATE") {
            Some(s) => match s.trim().parse::<u32>() {
                Ok(v) if v > 0 => v,
                _ => return Err(ConfigError::InvalidValue("MAX_RATE", s)),
            },
            None => default_max_rate(),
        };

        let event_buffer = match lookup("EVENT_BUFFER") {
            Some(s) => match s.trim().parse::<usize>() {
                Ok(v) if v > 0 => v,
                _ => return Err(ConfigError::InvalidValue("EVENT_BUFFER", s)),
            },
            None => default_event_buffer(),
        };

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
                log_json: lookup("LOG_JSON")
                    .is_some_and(|s| matches!(s.trim(), "1" | "true" | "TRUE" | "yes")),
            },
            discord: DiscordConfig {
                token,
                api_base: lookup("DISCORD_API_BASE")
                    .map(|s| s.trim().trim_end_matches('/').to_string())
                    .unwrap_or_else(default_api_base),
                timeout_secs: parsed("HTTP_TIMEOUT_SECS")?.unwrap_or_else(default_timeout_secs),
                user_agent: lookup("USER_AGENT").unwrap_or_else(default_user_agent),
            },
            worker: WorkerConfig {
                page_delay_ms: parsed("PAGE_DELAY_MS")?.unwrap_or_else(default_page_delay_ms),
                retry_margin_ms: parsed("RETRY_MARGIN_MS")?
                    .unwrap_or_else(default_retry_margin_ms),
                default_retry_after_ms: parsed("DEFAULT_RETRY_AFTER_MS")?
                    .unwrap_or_else(default_retry_after_ms),
                max_throttle_wait_secs: parsed("MAX_THROTTLE_WAIT_SECS")?,
                max_rate,
                event_buffer,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
