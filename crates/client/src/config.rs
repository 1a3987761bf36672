use std::time::Duration;

/// Default backend base URL for local development.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be a valid {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} environment variable is required")]
    Missing(&'static str),
}

/// Backend client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without trailing slash, e.g. `http://localhost:8000`.
    pub api_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                 |
    /// |------------------------|-------------------------|
    /// | `CROWDSOURCE_API_URL`  | `http://localhost:8000` |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = std::env::var("CROWDSOURCE_API_URL")
            .unwrap_or_else(|_| DEFAULT_API_URL.into())
            .trim_end_matches('/')
            .to_string();

        let request_timeout_secs = parse_var(
            "REQUEST_TIMEOUT_SECS",
            "u64",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            api_url,
            request_timeout_secs,
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Parse an optional environment variable, falling back to `default` when unset.
pub fn parse_var<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// Parse an environment variable that must be set.
pub fn required_var<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
) -> Result<T, ConfigError> {
    parse_optional_var(name, expected)?.ok_or(ConfigError::Missing(name))
}

/// Parse an optional environment variable that has no default.
pub fn parse_optional_var<T: std::str::FromStr>(
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value,
            }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:8000");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn parse_var_uses_default_when_unset() {
        let value: u64 = parse_var("CROWDSOURCE_TEST_UNSET_VAR", "u64", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn parse_optional_var_is_none_when_unset() {
        let value: Option<f64> =
            parse_optional_var("CROWDSOURCE_TEST_UNSET_OPTIONAL", "number").unwrap();
        assert_eq!(value, None);
    }

    #[test]
    fn required_var_reports_missing() {
        let err = required_var::<i64>("CROWDSOURCE_TEST_UNSET_REQUIRED", "integer").unwrap_err();
        assert!(matches!(err, ConfigError::Missing("CROWDSOURCE_TEST_UNSET_REQUIRED")));
        assert_eq!(
            err.to_string(),
            "CROWDSOURCE_TEST_UNSET_REQUIRED environment variable is required"
        );
    }

    #[test]
    fn invalid_message_names_variable() {
        let err = ConfigError::Invalid {
            name: "REQUEST_TIMEOUT_SECS",
            expected: "u64",
            value: "soon".into(),
        };
        assert_eq!(
            err.to_string(),
            "REQUEST_TIMEOUT_SECS must be a valid u64, got 'soon'"
        );
    }
}
