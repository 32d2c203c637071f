use std::time::Duration;

use serde::Deserialize;

use crate::BackoffPolicy;

/// Connection and retry settings for [`HttpClient`](crate::HttpClient).
///
/// Deserializes from the same shape services keep in their JSON config files:
///
/// ```json
/// { "Host": "http://users:8080", "TimeoutMs": 5000, "Retries": 2,
///   "RetryWaitMs": 100, "RetryMaxWaitMs": 1000 }
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ClientConfig {
    /// Base URL of the target service, e.g. `http://users:8080`.
    pub host: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Number of retries after the initial attempt.
    pub retries: usize,
    /// Linear backoff step in milliseconds.
    pub retry_wait_ms: u64,
    /// Upper bound for a single backoff sleep in milliseconds.
    pub retry_max_wait_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            timeout_ms: 10_000,
            retries: 0,
            retry_wait_ms: 250,
            retry_max_wait_ms: 2_000,
        }
    }
}

/// Configuration loading or validation failure.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing {0} environment variable")]
    Missing(String),
    #[error("{name} is set but empty")]
    Empty { name: String },
    #[error("{name} must be a non-negative integer, got '{value}'")]
    InvalidNumber { name: String, value: String },
    #[error("host must not be empty")]
    EmptyHost,
    #[error("retry max wait ({max_ms} ms) is lower than retry wait ({base_ms} ms)")]
    WaitBounds { base_ms: u64, max_ms: u64 },
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    /// Sets the backoff step and its cap.
    pub fn with_retry_wait_ms(mut self, retry_wait_ms: u64, retry_max_wait_ms: u64) -> Self {
        self.retry_wait_ms = retry_wait_ms;
        self.retry_max_wait_ms = retry_max_wait_ms;
        self
    }

    /// Reads the config from `{prefix}_HOST`, `{prefix}_TIMEOUT_MS`,
    /// `{prefix}_RETRIES`, `{prefix}_RETRY_WAIT_MS` and `{prefix}_RETRY_MAX_WAIT_MS`.
    ///
    /// Only the host is required; numeric values fall back to [`ClientConfig::default`].
    /// The result is validated before it is returned.
    ///
    /// ```no_run
    /// use hz_http_client::ClientConfig;
    ///
    /// let config = ClientConfig::from_env("USER_SERVICE").expect("missing USER_SERVICE_HOST");
    /// ```
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host_var = format!("{prefix}_HOST");
        let host = std::env::var(&host_var).map_err(|_| ConfigError::Missing(host_var.clone()))?;
        if host.trim().is_empty() {
            return Err(ConfigError::Empty { name: host_var });
        }

        let config = Self {
            host: host.trim().to_owned(),
            timeout_ms: env_number(&format!("{prefix}_TIMEOUT_MS"), defaults.timeout_ms)?,
            retries: env_number(&format!("{prefix}_RETRIES"), defaults.retries)?,
            retry_wait_ms: env_number(&format!("{prefix}_RETRY_WAIT_MS"), defaults.retry_wait_ms)?,
            retry_max_wait_ms: env_number(
                &format!("{prefix}_RETRY_MAX_WAIT_MS"),
                defaults.retry_max_wait_ms,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that the host is set and `retry_max_wait_ms >= retry_wait_ms`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.retry_max_wait_ms < self.retry_wait_ms {
            return Err(ConfigError::WaitBounds {
                base_ms: self.retry_wait_ms,
                max_ms: self.retry_max_wait_ms,
            });
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy::from_millis(self.retry_wait_ms, self.retry_max_wait_ms)
    }
}

fn env_number<T: std::str::FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) if value.trim().is_empty() => Ok(default),
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber {
                name: name.to_owned(),
                value,
            }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{ClientConfig, ConfigError};

    #[test]
    fn deserializes_service_config_shape() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"Host":"http://users:8080","TimeoutMs":5000,"Retries":2,"RetryWaitMs":100,"RetryMaxWaitMs":300}"#,
        )
        .expect("config must decode");

        assert_eq!(
            config,
            ClientConfig::new("http://users:8080")
                .with_timeout_ms(5_000)
                .with_retries(2)
                .with_retry_wait_ms(100, 300)
        );
        assert_eq!(config.timeout(), Duration::from_millis(5_000));
        assert_eq!(config.backoff().wait(2), Duration::from_millis(200));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"Host":"http://users"}"#).expect("config must decode");
        assert_eq!(config.timeout_ms, ClientConfig::default().timeout_ms);
        assert_eq!(config.retries, 0);
    }

    #[test]
    fn validate_rejects_inverted_wait_bounds() {
        let config = ClientConfig::new("http://users").with_retry_wait_ms(500, 100);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WaitBounds {
                base_ms: 500,
                max_ms: 100
            })
        ));
    }

    #[test]
    fn validate_rejects_empty_host() {
        assert!(matches!(
            ClientConfig::default().validate(),
            Err(ConfigError::EmptyHost)
        ));
        assert!(ClientConfig::new("http://users").validate().is_ok());
    }

    #[test]
    fn from_env_reads_prefixed_variables() {
        std::env::set_var("HZ_CFG_TEST_A_HOST", " http://orders:9000 ");
        std::env::set_var("HZ_CFG_TEST_A_RETRIES", "3");
        std::env::set_var("HZ_CFG_TEST_A_RETRY_WAIT_MS", "50");
        std::env::set_var("HZ_CFG_TEST_A_RETRY_MAX_WAIT_MS", "150");

        let config = ClientConfig::from_env("HZ_CFG_TEST_A").expect("config must load");
        assert_eq!(config.host, "http://orders:9000");
        assert_eq!(config.retries, 3);
        assert_eq!(config.retry_wait_ms, 50);
        assert_eq!(config.retry_max_wait_ms, 150);
        assert_eq!(config.timeout_ms, ClientConfig::default().timeout_ms);
    }

    #[test]
    fn from_env_reports_missing_host_and_bad_numbers() {
        assert!(matches!(
            ClientConfig::from_env("HZ_CFG_TEST_UNSET"),
            Err(ConfigError::Missing(name)) if name == "HZ_CFG_TEST_UNSET_HOST"
        ));

        std::env::set_var("HZ_CFG_TEST_B_HOST", "http://orders");
        std::env::set_var("HZ_CFG_TEST_B_TIMEOUT_MS", "soon");
        assert!(matches!(
            ClientConfig::from_env("HZ_CFG_TEST_B"),
            Err(ConfigError::InvalidNumber { name, .. }) if name == "HZ_CFG_TEST_B_TIMEOUT_MS"
        ));
    }
}
