//! Application configuration management.
//!
//! This module handles loading the application configuration: where the
//! OAuth files live, where attendance files go, and how often to poll.
//!
//! Configuration is stored at `~/.config/meetroll/config.json`. Values can
//! be overridden by `MEETROLL_*` environment variables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::api::DEFAULT_API_BASE_URL;

/// Application name used for config directory paths
const APP_NAME: &str = "meetroll";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Scope that lets the app create spaces and read their conferences
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/meetings.space.created";

/// Thirty minutes between attendance checks
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30 * 60;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub token_file: PathBuf,
    pub client_secrets_file: PathBuf,
    pub output_dir: PathBuf,
    pub poll_interval_secs: u64,
    /// Stop after this many polls; run until interrupted when unset
    pub max_cycles: Option<u32>,
    pub scopes: Vec<String>,
    pub api_base_url: String,
    pub allow_interactive_auth: bool,
    /// Also write logs to a daily-rotated file in this directory
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token_file: PathBuf::from("token.json"),
            client_secrets_file: PathBuf::from("credentials.json"),
            output_dir: PathBuf::from("attendance"),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_cycles: None,
            scopes: vec![DEFAULT_SCOPE.to_string()],
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            allow_interactive_auth: true,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults if absent
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        if config.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs in {} must be at least 1", path.display());
        }
        Ok(config)
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Apply `MEETROLL_*` overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a key lookup (the environment, in practice)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("MEETROLL_TOKEN_FILE") {
            self.token_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("MEETROLL_SECRETS_FILE") {
            self.client_secrets_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("MEETROLL_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("MEETROLL_POLL_INTERVAL_SECS") {
            match v.parse::<u64>() {
                Ok(secs) if secs > 0 => self.poll_interval_secs = secs,
                _ => warn!(value = %v, "Ignoring invalid MEETROLL_POLL_INTERVAL_SECS"),
            }
        }
        if let Some(v) = lookup("MEETROLL_API_BASE_URL") {
            self.api_base_url = v;
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
