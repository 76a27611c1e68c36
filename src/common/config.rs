//! Configuration file handling

use serde::Deserialize;
use std::path::PathBuf;

use super::paths::config_path;
use super::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Runner settings
    #[serde(default)]
    pub runner: RunnerConfig,

    /// pytest passthrough settings
    #[serde(default)]
    pub pytest: PytestConfig,
}

/// Runner settings
#[derive(Debug, Deserialize)]
pub struct RunnerConfig {
    /// Test framework to drive ("pytest" or "unittest")
    #[serde(default = "default_framework")]
    pub framework: String,

    /// Python interpreter override; searched on PATH when unset
    #[serde(default)]
    pub python: Option<PathBuf>,

    /// Poll cadence for draining runner output, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            framework: default_framework(),
            python: None,
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_framework() -> String {
    "pytest".to_string()
}
fn default_poll_interval() -> u64 {
    100
}

/// Settings forwarded to the pytest invocation
#[derive(Debug, Deserialize, Default)]
pub struct PytestConfig {
    /// Live logging level (--log-cli-level)
    #[serde(default)]
    pub log_cli_level: Option<String>,

    /// JUnit-style report path (--junit-xml)
    #[serde(default)]
    pub junit_xml: Option<PathBuf>,
}

impl Config {
    /// Load configuration from the default config file
    ///
    /// Returns default configuration if file doesn't exist
    pub fn load() -> Result<Self> {
        if let Some(path) = config_path() {
            if path.exists() {
                let content = std::fs::read_to_string(&path)?;
                return toml::from_str(&content)
                    .map_err(|e| super::Error::ConfigParse(e.to_string()));
            }
        }
        Ok(Self::default())
    }
}
