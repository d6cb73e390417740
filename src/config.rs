//! Server configuration
//!
//! Built-in defaults, optionally overridden by a JSON file named in
//! `CHATIK_CONFIG`, then by `CHATIK_ADDR`, then by the bind address given
//! on the command line.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::AppError;
use crate::history::DEFAULT_HISTORY_CAPACITY;

/// Env var naming an optional JSON config file
pub const CONFIG_PATH_ENV: &str = "CHATIK_CONFIG";
/// Env var overriding the bind address
pub const ADDR_ENV: &str = "CHATIK_ADDR";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the TCP listener binds to
    pub bind_addr: String,
    /// Request path accepted for WebSocket upgrades
    pub ws_path: String,
    /// Number of chat lines replayed to new joiners
    pub history_capacity: usize,
    /// Upper bound on a single send, in milliseconds
    pub send_timeout_ms: u64,
    /// Frames buffered per connection before sends start waiting
    pub outbound_buffer: usize,
    /// Seconds between keepalive pings
    pub ping_interval_secs: u64,
    /// Mint a session cookie for clients that arrive without one
    pub issue_sessions: bool,
    /// `tracing` filter used when `RUST_LOG` is not set
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            ws_path: "/ws".to_string(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            send_timeout_ms: 5_000,
            outbound_buffer: 128,
            ping_interval_secs: 60,
            issue_sessions: true,
            log_filter: "chatik=info".to_string(),
        }
    }
}

impl Config {
    /// Load the config from the environment
    ///
    /// `addr_arg` is the optional bind address from the command line and
    /// wins over everything else.
    pub fn load(addr_arg: Option<String>) -> Result<Self, AppError> {
        let mut config = match env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };

        if let Ok(addr) = env::var(ADDR_ENV) {
            config.bind_addr = addr;
        }
        if let Some(addr) = addr_arg {
            config.bind_addr = addr;
        }

        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file; missing fields keep their defaults
    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    pub fn from_json(json: &str) -> Result<Self, AppError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the server cannot run with
    pub fn validate(&self) -> Result<(), AppError> {
        if self.history_capacity == 0 {
            return Err(AppError::Config("history_capacity must be positive".into()));
        }
        if self.outbound_buffer == 0 {
            return Err(AppError::Config("outbound_buffer must be positive".into()));
        }
        if self.ping_interval_secs == 0 {
            return Err(AppError::Config("ping_interval_secs must be positive".into()));
        }
        if !self.ws_path.starts_with('/') {
            return Err(AppError::Config(format!(
                "ws_path must start with '/': {}",
                self.ws_path
            )));
        }
        Ok(())
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }
}
