//! Gateway configuration.
//!
//! Loading flow: compiled defaults, then an optional JSON config file,
//! then `INSIGHT_*` environment overrides (highest priority). Invalid env
//! values are ignored rather than fatal.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Configuration for the notification gateway.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
    /// Per-session outbound queue depth; a session that falls this many
    /// frames behind is treated as broken.
    pub channel_capacity: usize,
    /// Interval between server-initiated Ping frames, in seconds.
    pub heartbeat_interval_secs: u64,
    /// Disconnect a client silent for this long, in seconds.
    pub heartbeat_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
            channel_capacity: 256,
            heartbeat_interval_secs: 30,
            heartbeat_timeout_secs: 90,
        }
    }
}

/// Config file could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Filesystem error reading the config file.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file exists but is not valid config JSON.
    #[error("invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ServerConfig {
    /// Load configuration from an optional JSON file plus env overrides.
    ///
    /// A missing file yields defaults; a malformed file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                debug!(?path, "loading gateway config from file");
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content)?
            }
            Some(path) => {
                debug!(?path, "config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `INSIGHT_*` environment overrides in place.
    pub fn apply_env_overrides(&mut self) {
        if let Some(v) = read_env_string("INSIGHT_HOST") {
            self.host = v;
        }
        if let Some(v) = read_env_parsed::<u16>("INSIGHT_PORT") {
            self.port = v;
        }
        if let Some(v) = read_env_parsed::<usize>("INSIGHT_CHANNEL_CAPACITY") {
            if v > 0 {
                self.channel_capacity = v;
            }
        }
        if let Some(v) = read_env_parsed::<u64>("INSIGHT_HEARTBEAT_INTERVAL_SECS") {
            if v > 0 {
                self.heartbeat_interval_secs = v;
            }
        }
        if let Some(v) = read_env_parsed::<u64>("INSIGHT_HEARTBEAT_TIMEOUT_SECS") {
            if v > 0 {
                self.heartbeat_timeout_secs = v;
            }
        }
    }
}

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}
