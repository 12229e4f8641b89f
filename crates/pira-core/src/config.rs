//! Connection configuration.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Default serial device path.
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";
/// Baud rate the analyzer ships with.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;
/// Read timeout; also the quiet period that ends a basic-data stream.
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 500;

/// Serial link settings for one analyzer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Serial device path.
    pub port: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// Read timeout in milliseconds.
    pub read_timeout_ms: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl ConnectionConfig {
    pub fn new(port: &str) -> Self {
        Self {
            port: port.to_string(),
            ..Default::default()
        }
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ConnectionConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
