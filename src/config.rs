//! # Configuration Module
//!
//! Server settings loaded from an optional YAML file and then overridden from
//! the environment.
//!
//! ```yaml
//! addr: "0.0.0.0:8080"
//! stack_size: "0x8000"
//! static_dir: ./public
//! template_dir: ./templates
//! auth_token: "Bearer secret"
//! log:
//!   log_level: debug
//!   format: pretty
//! ```
//!
//! ## Environment Variables
//!
//! - `TRIECHAIN_ADDR` - listen address
//! - `TRIECHAIN_STACK_SIZE` - coroutine stack size in bytes, decimal (`16384`)
//!   or hexadecimal (`0x4000`)
//! - `TRIECHAIN_LOG_*` - see [`crate::logging`]

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::logging::LogConfig;
use crate::middleware::CorsConfig;

pub const DEFAULT_ADDR: &str = "127.0.0.1:9999";
pub const DEFAULT_STACK_SIZE: usize = 0x4000;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
    /// Stack size for coroutines in bytes (default: 16 KB / 0x4000)
    #[serde(deserialize_with = "deserialize_stack_size")]
    pub stack_size: usize,
    pub static_dir: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,
    /// Token required on `/admin` routes of the demo app
    pub auth_token: Option<String>,
    pub cors: Option<CorsConfig>,
    pub log: LogConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            stack_size: DEFAULT_STACK_SIZE,
            static_dir: None,
            template_dir: None,
            auth_token: None,
            cors: None,
            log: LogConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read `path` (if given) and apply environment overrides.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid configuration YAML.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// # Errors
    ///
    /// Fails when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// # Errors
    ///
    /// Fails when `raw` is not valid configuration YAML.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).context("Failed to parse YAML configuration")
    }

    /// Override fields from `lookup`, keyed by `TRIECHAIN_*` variable names.
    ///
    /// Unparseable stack sizes are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(addr) = lookup("TRIECHAIN_ADDR") {
            self.addr = addr;
        }
        if let Some(size) = lookup("TRIECHAIN_STACK_SIZE").and_then(|v| parse_stack_size(&v)) {
            self.stack_size = size;
        }
        self.log.apply_overrides(lookup);
    }

    /// Configure the `may` runtime from these settings.
    pub fn apply_runtime(&self) {
        may::config().set_stack_size(self.stack_size);
        info!(stack_size = self.stack_size, "Coroutine runtime configured");
    }
}

/// Parse a size in decimal or `0x`-prefixed hexadecimal.
pub fn parse_stack_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}

fn deserialize_stack_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(usize),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => parse_stack_size(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid stack size: {s}"))),
    }
}
