use std::time::Duration;

use thiserror::Error;

/// Default web origin of the supported platform.
pub const DEFAULT_BASE_URL: &str = "https://www.youtube.com";

/// User agent string used for API requests.
///
/// This is a realistic browser user agent so that requests to the internal
/// API are indistinguishable from normal browser traffic.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Extractor configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Web origin the extractor talks to, without a trailing slash.
    pub base_url: String,
    /// User agent presented on every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ExtractorConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// # Errors
    ///
    /// Returns an error if an environment variable is set but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            base_url: env_or_default("COMMENTS_BASE_URL", DEFAULT_BASE_URL),
            user_agent: env_or_default("COMMENTS_USER_AGENT", DEFAULT_USER_AGENT),
            request_timeout: Duration::from_secs(parse_env_u64(
                "COMMENTS_REQUEST_TIMEOUT_SECS",
                30,
            )?),
        };
        config.validate()?;
        Ok(config)
    }

    /// Configuration pointed at a different web origin, typically a local
    /// mock server in tests.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            ..Self::default()
        }
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.base_url.starts_with("http") {
            return Err(ConfigError::InvalidValue {
                name: "COMMENTS_BASE_URL".to_string(),
                message: format!("must be an http(s) origin, got '{}'", self.base_url),
            });
        }
        if self.base_url.ends_with('/') {
            return Err(ConfigError::InvalidValue {
                name: "COMMENTS_BASE_URL".to_string(),
                message: "must not end with a slash".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "COMMENTS_REQUEST_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_defaults_validate() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_with_base_url_strips_trailing_slash() {
        let config = ExtractorConfig::with_base_url("http://127.0.0.1:9000/");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_base_url() {
        let config = ExtractorConfig {
            base_url: "ftp://example.com".to_string(),
            ..ExtractorConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env_overrides() {
        std::env::set_var("COMMENTS_BASE_URL", "http://localhost:1234");
        std::env::set_var("COMMENTS_REQUEST_TIMEOUT_SECS", "5");
        let config = ExtractorConfig::from_env().unwrap();
        assert_eq!(config.base_url, "http://localhost:1234");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        std::env::remove_var("COMMENTS_BASE_URL");
        std::env::remove_var("COMMENTS_REQUEST_TIMEOUT_SECS");
    }

    #[test]
    #[serial]
    fn test_from_env_rejects_bad_timeout() {
        std::env::set_var("COMMENTS_REQUEST_TIMEOUT_SECS", "not-a-number");
        assert!(ExtractorConfig::from_env().is_err());
        std::env::remove_var("COMMENTS_REQUEST_TIMEOUT_SECS");
    }
}
