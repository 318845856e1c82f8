//! Host settings, loaded from a TOML file and overridden by CLI flags.
//!
//! ```toml
//! [serial]
//! port = "/dev/ttyACM0"
//! baud = 115200
//!
//! [session]
//! tick_ms = 10
//! output = "fine_tuning_dataset.csv"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use digit_telemetry::protocol::DEFAULT_BAUD;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub serial: SerialConfig,
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// No sensible default; must come from the file or `--port`
    pub port: Option<String>,
    pub baud: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: DEFAULT_BAUD,
        }
    }
}

impl SerialConfig {
    pub fn require_port(&self) -> Result<&str> {
        self.port
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| anyhow!("no serial port configured; pass --port or set [serial] port"))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Poll interval of the control loop
    pub tick_ms: u64,
    /// Dataset file for `collect`
    pub output: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            tick_ms: 10,
            output: PathBuf::from("fine_tuning_dataset.csv"),
        }
    }
}

impl HostConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&contents).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}
