//! Structured logging setup
//!
//! Installs a `tracing-subscriber` registry with an `EnvFilter` and a JSON or
//! pretty formatter. Settings come from [`LogConfig`], which can be read from
//! the environment or from the `log:` section of the server configuration.
//!
//! | Variable                      | Default | Meaning                                  |
//! |-------------------------------|---------|------------------------------------------|
//! | `TRIECHAIN_LOG_LEVEL`         | `info`  | trace/debug/info/warn/error              |
//! | `TRIECHAIN_LOG_FORMAT`        | `json`  | json/pretty                              |
//! | `TRIECHAIN_LOG_ASYNC`         | `true`  | buffer output through a writer thread    |
//! | `TRIECHAIN_LOG_TARGET_FILTER` | unset   | extra comma-separated filter directives  |
//!
//! `RUST_LOG`, when set, replaces the level-derived filter.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Log format: JSON for production, pretty-print for development
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "pretty" => LogFormat::Pretty,
            _ => LogFormat::Json,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// trace/debug/info/warn/error
    pub log_level: String,
    pub format: LogFormat,
    /// Write through a `tracing-appender` worker thread
    pub async_logging: bool,
    /// Extra filter directives, comma-separated
    pub target_filter: Option<String>,
    /// Include file:line location
    pub include_location: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::default_prod()
    }
}

impl LogConfig {
    /// Parse configuration from environment variables with defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_overrides(|key| env::var(key).ok());
        config
    }

    /// Override fields from `lookup`, keyed by `TRIECHAIN_LOG_*` variable names.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(level) = lookup("TRIECHAIN_LOG_LEVEL") {
            self.log_level = level;
        }
        if let Some(format) = lookup("TRIECHAIN_LOG_FORMAT") {
            self.format = LogFormat::parse(&format);
        }
        if let Some(flag) = lookup("TRIECHAIN_LOG_ASYNC").and_then(|s| s.parse().ok()) {
            self.async_logging = flag;
        }
        if let Some(filter) = lookup("TRIECHAIN_LOG_TARGET_FILTER") {
            self.target_filter = Some(filter);
        }
    }

    /// Verbose, human-readable settings for local runs and tests
    pub fn default_dev() -> Self {
        Self {
            log_level: "debug".to_string(),
            format: LogFormat::Pretty,
            async_logging: false,
            target_filter: None,
            include_location: true,
        }
    }

    pub fn default_prod() -> Self {
        Self {
            log_level: "info".to_string(),
            format: LogFormat::Json,
            async_logging: true,
            target_filter: None,
            include_location: false,
        }
    }

    fn level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let mut env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level().as_str()));

        // Client disconnects are reported by the HTTP server at info level.
        env_filter = env_filter.add_directive(
            "may_minihttp=warn"
                .parse::<Directive>()
                .context("invalid built-in filter directive")?,
        );

        if let Some(target_filter) = &self.target_filter {
            for filter in target_filter.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                let directive = filter
                    .parse::<Directive>()
                    .with_context(|| format!("invalid log filter directive: {filter}"))?;
                env_filter = env_filter.add_directive(directive);
            }
        }
        Ok(env_filter)
    }
}

/// Install the global subscriber described by `config`.
///
/// With async logging the returned guard flushes buffered lines when dropped;
/// keep it alive for the lifetime of the process.
///
/// # Errors
///
/// Fails on an invalid filter directive or if a global subscriber is already
/// installed.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let registry = tracing_subscriber::registry().with(config.env_filter()?);

    let (writer, guard) = if config.async_logging {
        let (non_blocking, guard) = tracing_appender::non_blocking(std::io::stdout());
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(non_blocking), Some(guard))
    } else {
        (tracing_subscriber::fmt::writer::BoxMakeWriter::new(std::io::stdout), None)
    };

    let fmt_layer = match config.format {
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_thread_ids(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(writer)
            .boxed(),
    };

    registry
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")?;
    Ok(guard)
}
