//! API configuration.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;
use ytt_models::DEFAULT_PREFERRED_LANGUAGES;

/// Default number of admitted requests per window.
pub const DEFAULT_RATE_LIMIT_REQUESTS: u32 = 30;

/// Default window length in seconds.
pub const DEFAULT_RATE_LIMIT_WINDOW_SECONDS: u64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidInteger { name: &'static str, value: String },
}

/// Sliding-window limiter settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Requests admitted per client inside one window
    pub max_requests: u32,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: DEFAULT_RATE_LIMIT_REQUESTS,
            window: Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECONDS),
        }
    }
}

impl RateLimitConfig {
    /// Parse raw values. Absent values take their default.
    pub fn parse(requests: Option<&str>, window_seconds: Option<&str>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let max_requests = match requests {
            Some(raw) => parse_positive::<u32>("RATE_LIMIT_REQUESTS", raw)?,
            None => defaults.max_requests,
        };
        let window = match window_seconds {
            Some(raw) => Duration::from_secs(parse_positive::<u64>("RATE_LIMIT_WINDOW_SECONDS", raw)?),
            None => defaults.window,
        };

        Ok(Self { max_requests, window })
    }

    /// Read from the environment. Invalid values are logged and BOTH settings
    /// fall back to their defaults; startup never fails here.
    pub fn from_env() -> Self {
        let requests = std::env::var("RATE_LIMIT_REQUESTS").ok();
        let window = std::env::var("RATE_LIMIT_WINDOW_SECONDS").ok();

        match Self::parse(requests.as_deref(), window.as_deref()) {
            Ok(config) => config,
            Err(e) => {
                let fallback = Self::default();
                warn!(
                    error = %e,
                    max_requests = fallback.max_requests,
                    window_secs = fallback.window.as_secs(),
                    "Invalid rate limit configuration, using defaults"
                );
                fallback
            }
        }
    }
}

fn parse_positive<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::InvalidInteger {
            name,
            value: raw.to_string(),
        }),
    }
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Max request body size
    pub max_body_size: usize,
    /// Environment (development/production)
    pub environment: String,
    /// Directory served under /static
    pub static_dir: String,
    /// Limiter settings for /get_transcript
    pub rate_limit: RateLimitConfig,
    /// How often idle clients are evicted from the limiter (None disables)
    pub rate_limit_sweep_interval: Option<Duration>,
    /// Transcript language preference, most preferred first
    pub preferred_languages: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            max_body_size: 64 * 1024,
            environment: "development".to_string(),
            static_dir: "static".to_string(),
            rate_limit: RateLimitConfig::default(),
            rate_limit_sweep_interval: Some(Duration::from_secs(300)),
            preferred_languages: default_preferred_languages(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64 * 1024),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()),
            rate_limit: RateLimitConfig::from_env(),
            rate_limit_sweep_interval: parse_sweep_interval(
                std::env::var("RATE_LIMIT_SWEEP_INTERVAL_SECONDS").ok().as_deref(),
            ),
            preferred_languages: parse_languages(std::env::var("PREFERRED_LANGUAGES").ok().as_deref()),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

fn default_preferred_languages() -> Vec<String> {
    DEFAULT_PREFERRED_LANGUAGES.iter().map(|s| s.to_string()).collect()
}

fn parse_languages(raw: Option<&str>) -> Vec<String> {
    let languages: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if languages.is_empty() {
        default_preferred_languages()
    } else {
        languages
    }
}

/// `0` disables the sweeper; anything unparseable keeps the default.
fn parse_sweep_interval(raw: Option<&str>) -> Option<Duration> {
    match raw.and_then(|s| s.trim().parse::<u64>().ok()) {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => Some(Duration::from_secs(300)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_defaults() {
        let config = RateLimitConfig::parse(None, None).unwrap();
        assert_eq!(config.max_requests, 30);
        assert_eq!(config.window, Duration::from_secs(3600));
    }

    #[test]
    fn test_rate_limit_overrides() {
        let config = RateLimitConfig::parse(Some("5"), Some(" 60 ")).unwrap();
        assert_eq!(config.max_requests, 5);
        assert_eq!(config.window, Duration::from_secs(60));
    }

    #[test]
    fn test_rate_limit_rejects_invalid_values() {
        for (requests, window) in [
            (Some("abc"), None),
            (None, Some("1h")),
            (Some("-1"), None),
            (Some("0"), Some("60")),
            (Some("10"), Some("0")),
            (Some("2.5"), None),
        ] {
            assert!(
                RateLimitConfig::parse(requests, window).is_err(),
                "requests={requests:?} window={window:?}"
            );
        }
    }

    #[test]
    fn test_rate_limit_error_names_variable() {
        let err = RateLimitConfig::parse(None, Some("soon")).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidInteger {
                name: "RATE_LIMIT_WINDOW_SECONDS",
                value: "soon".to_string()
            }
        );
    }

    #[test]
    fn test_parse_languages() {
        assert_eq!(parse_languages(None), vec!["es", "en"]);
        assert_eq!(parse_languages(Some(" , ")), vec!["es", "en"]);
        assert_eq!(parse_languages(Some("pt, es ,en")), vec!["pt", "es", "en"]);
    }

    #[test]
    fn test_parse_sweep_interval() {
        assert_eq!(parse_sweep_interval(Some("0")), None);
        assert_eq!(parse_sweep_interval(Some("30")), Some(Duration::from_secs(30)));
        assert_eq!(parse_sweep_interval(Some("x")), Some(Duration::from_secs(300)));
        assert_eq!(parse_sweep_interval(None), Some(Duration::from_secs(300)));
    }
}
