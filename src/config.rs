//! Client configuration.

use std::path::Path;
use std::time::Duration;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::game::PollPolicy;
use crate::transport::Endpoints;

/// Environment variable overriding the server host.
pub const HOST_ENV: &str = "STRICTLY_XO_HOST";

/// Server the browser client shipped with.
pub const DEFAULT_HOST: &str = "xo.t.javascript.ninja";

/// Settings for one client instance.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Game server host, optionally with port.
    host: String,

    /// Use `https`/`wss` instead of `http`/`ws`.
    tls: bool,

    /// Per-request timeout in seconds. Also bounds the long-poll.
    request_timeout_secs: Option<u64>,

    /// Pause before re-polling after a 5xx, in milliseconds.
    poll_retry_delay_ms: u64,

    /// Cap on long-poll attempts; unset means unbounded.
    poll_max_attempts: Option<u32>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            tls: false,
            request_timeout_secs: None,
            poll_retry_delay_ms: 0,
            poll_max_attempts: None,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from a TOML file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        if config.host.trim().is_empty() {
            return Err(ConfigError::new("Config host must not be empty".to_string()));
        }

        info!(host = %config.host, "Config loaded successfully");
        Ok(config)
    }

    /// Loads `path` if given and present, otherwise starts from defaults.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) if path.exists() => Self::from_file(path),
            Some(path) => {
                info!(
                    "Config file not found at {}, using defaults",
                    path.display()
                );
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    /// Applies `STRICTLY_XO_HOST` from the environment.
    #[instrument(skip(self))]
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(HOST_ENV) {
            Ok(host) if !host.trim().is_empty() => {
                debug!(host = %host, "Host overridden from environment");
                self.with_host(host)
            }
            _ => self,
        }
    }

    /// Replaces the host.
    pub fn with_host(self, host: String) -> Self {
        Self { host, ..self }
    }

    /// Enables `https`/`wss`.
    pub fn with_tls(self, tls: bool) -> Self {
        Self { tls, ..self }
    }

    /// URL builder for the configured host.
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(self.host.clone(), self.tls)
    }

    /// Request timeout, if any.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Long-poll retry behaviour.
    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::new(
            Duration::from_millis(self.poll_retry_delay_ms),
            self.poll_max_attempts,
        )
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}
