use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;
use crate::governor::RateLimits;
use crate::llm::google::{models, GEMINI_API_BASE};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

// Keeps the API key out of logs
impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"***")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    pub max_requests_per_minute: usize,
    pub max_requests_per_day: usize,
    pub min_spacing_ms: u64,
    /// Upper bound on how long a request waits for the governor
    pub permission_timeout_secs: u64,
}

impl RateLimitConfig {
    pub fn limits(&self) -> RateLimits {
        RateLimits {
            per_minute: self.max_requests_per_minute,
            per_day: self.max_requests_per_day,
            min_spacing: Duration::from_millis(self.min_spacing_ms),
        }
    }

    pub fn permission_timeout(&self) -> Duration {
        Duration::from_secs(self.permission_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub directory: String,
    pub file_prefix: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .context(
                "Gemini API key is not configured. Set GEMINI_API_KEY in the environment or .env file",
            )?;

        let defaults = RateLimits::default();
        let rate_limit = RateLimitConfig {
            max_requests_per_minute: parse(
                "GEMINI_MAX_REQUESTS_PER_MINUTE",
                var("GEMINI_MAX_REQUESTS_PER_MINUTE", &defaults.per_minute.to_string()),
            )?,
            max_requests_per_day: parse(
                "GEMINI_MAX_REQUESTS_PER_DAY",
                var("GEMINI_MAX_REQUESTS_PER_DAY", &defaults.per_day.to_string()),
            )?,
            min_spacing_ms: parse(
                "GEMINI_MIN_SPACING_MS",
                var("GEMINI_MIN_SPACING_MS", &defaults.min_spacing.as_millis().to_string()),
            )?,
            permission_timeout_secs: parse(
                "GEMINI_PERMISSION_TIMEOUT_SECS",
                var("GEMINI_PERMISSION_TIMEOUT_SECS", "90"),
            )?,
        };

        if rate_limit.max_requests_per_minute == 0 || rate_limit.max_requests_per_day == 0 {
            bail!("GEMINI_MAX_REQUESTS_PER_MINUTE and GEMINI_MAX_REQUESTS_PER_DAY must be greater than zero");
        }

        Ok(Self {
            server: ServerConfig {
                port: parse("PORT", var("PORT", "3000"))?,
                host: var("HOST", "0.0.0.0"),
                cors_allowed_origins: var(
                    "ALLOWED_ORIGINS",
                    "http://localhost:3000,http://localhost:5173",
                )
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            },
            gemini: GeminiConfig {
                api_key,
                model: var("GEMINI_MODEL", models::DEFAULT),
                base_url: var("GEMINI_BASE_URL", GEMINI_API_BASE),
                request_timeout_secs: parse(
                    "GEMINI_REQUEST_TIMEOUT_SECS",
                    var("GEMINI_REQUEST_TIMEOUT_SECS", "30"),
                )?,
            },
            rate_limit,
            logging: LoggingConfig {
                directory: var("LOG_DIR", "logs"),
                file_prefix: var("LOG_FILE_PREFIX", "skillsync"),
            },
        })
    }
}

fn parse<T>(key: &str, value: String) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("{} has an invalid value: {:?}", key, value))
}
