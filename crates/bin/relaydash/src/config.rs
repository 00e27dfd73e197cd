//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `relaydash.toml` in the working directory unless another path is
//! given. Every field has a sensible default so the file is optional.
//! Environment variables take precedence over file values.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Default config file name.
pub const DEFAULT_PATH: &str = "relaydash.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Relay API settings.
    pub api: ApiConfig,
    /// Refresh settings.
    pub poll: PollConfig,
    /// Where the login and rotation token are kept.
    pub session: SessionConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// Relay API configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL every relay path is resolved against.
    pub base: String,
    /// Request timeout in seconds; `0` disables it.
    pub timeout_secs: u64,
}

/// Polling configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Seconds between two refreshes.
    pub interval_secs: u64,
}

/// Session file configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub file: PathBuf,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("RELAYDASH_API_BASE") {
            self.api.base = val;
        }
        if let Some(secs) = var("RELAYDASH_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.api.timeout_secs = secs;
        }
        if let Some(secs) = var("RELAYDASH_POLL_SECS").and_then(|v| v.parse().ok()) {
            self.poll.interval_secs = secs;
        }
        if let Some(val) = var("RELAYDASH_SESSION_FILE") {
            self.session.file = PathBuf::from(val);
        }
        if let Some(val) = var("RELAYDASH_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base.trim().is_empty() {
            return Err(ConfigError::Validation("api base must not be empty".to_string()));
        }
        if self.poll.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Request timeout, `None` when disabled.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        (self.api.timeout_secs > 0).then(|| Duration::from_secs(self.api.timeout_secs))
    }

    #[must_use]
    pub fn poll_period(&self) -> Duration {
        Duration::from_secs(self.poll.interval_secs)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base: "http://127.0.0.1:8080".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self { interval_secs: 3 }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: PathBuf::from(".relaydash/session.toml"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "relaydash=info,relaydash_app=info,relaydash_adapter_http_reqwest=warn"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.api.base, "http://127.0.0.1:8080");
        assert_eq!(config.poll_period(), Duration::from_secs(3));
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.session.file, PathBuf::from(".relaydash/session.toml"));
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.poll.interval_secs, 3);
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [api]
            base = 'https://relay.example.com/'
            timeout_secs = 0

            [poll]
            interval_secs = 5

            [session]
            file = '/tmp/rd.toml'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.api.base, "https://relay.example.com/");
        assert_eq!(config.timeout(), None);
        assert_eq!(config.poll_period(), Duration::from_secs(5));
        assert_eq!(config.session.file, PathBuf::from("/tmp/rd.toml"));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file(Path::new("nonexistent.toml")).unwrap();
        assert_eq!(config.poll.interval_secs, 3);
    }

    #[test]
    fn should_read_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("relaydash.toml");
        std::fs::write(&path, "[poll]\ninterval_secs = 7\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.poll.interval_secs, 7);
        assert_eq!(config.api.base, "http://127.0.0.1:8080");
    }

    #[test]
    fn should_apply_env_overrides() {
        let mut config = Config::default();
        config.apply_overrides(vars(&[
            ("RELAYDASH_API_BASE", "http://10.0.0.9:9000"),
            ("RELAYDASH_POLL_SECS", "10"),
            ("RELAYDASH_TIMEOUT_SECS", "2"),
            ("RELAYDASH_SESSION_FILE", "s.toml"),
            ("RELAYDASH_LOG", "warn"),
        ]));
        assert_eq!(config.api.base, "http://10.0.0.9:9000");
        assert_eq!(config.poll.interval_secs, 10);
        assert_eq!(config.timeout(), Some(Duration::from_secs(2)));
        assert_eq!(config.session.file, PathBuf::from("s.toml"));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_prefer_rust_log_over_relaydash_log() {
        let mut config = Config::default();
        config.apply_overrides(vars(&[("RELAYDASH_LOG", "warn"), ("RUST_LOG", "trace")]));
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_ignore_unparseable_numbers() {
        let mut config = Config::default();
        config.apply_overrides(vars(&[("RELAYDASH_POLL_SECS", "soon")]));
        assert_eq!(config.poll.interval_secs, 3);
    }

    #[test]
    fn should_reject_zero_poll_interval() {
        let mut config = Config::default();
        config.poll.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_empty_api_base() {
        let mut config = Config::default();
        config.api.base = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
