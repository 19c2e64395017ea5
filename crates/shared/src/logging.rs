//! Logging infrastructure for the anime catalog.
//!
//! This module provides structured logging with optional daily-rotated files,
//! contextual fields, and module-specific log levels.

use crate::config::LoggingConfig;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::Level;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Log directory path
    pub log_dir: String,
    /// Component name (used for log file naming)
    pub component: String,
    /// Default log level
    pub default_level: Level,
    /// Enable console output
    pub console: bool,
    /// Enable file output
    pub file: bool,
    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: "data/logs".to_string(),
            component: "anime-catalog".to_string(),
            default_level: Level::INFO,
            console: true,
            file: false,
            json_format: false,
        }
    }
}

impl LogConfig {
    /// Build a logging configuration from the `[logging]` config section
    pub fn from_settings(settings: &LoggingConfig, log_dir: &Path, component: &str) -> Self {
        Self {
            log_dir: log_dir.to_string_lossy().to_string(),
            component: component.to_string(),
            default_level: parse_level(&settings.default_level),
            console: settings.console,
            file: settings.file,
            json_format: settings.json_format,
        }
    }
}

/// Parse a level name, falling back to INFO for anything unrecognised
pub fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}

/// Filter directives used when `RUST_LOG` is unset, one per target
fn default_directives(config: &LogConfig) -> String {
    let level = config.default_level;
    let mut targets = vec![config.component.replace('-', "_")];
    for crate_name in ["shared", "anime_catalog"] {
        if !targets.iter().any(|t| t == crate_name) {
            targets.push(crate_name.to_string());
        }
    }

    let mut directives: Vec<String> = targets
        .iter()
        .map(|target| format!("{}={}", target, level))
        .collect();
    directives.extend(["hyper=warn", "reqwest=warn", "h2=warn"].map(String::from));
    directives.join(",")
}

/// Initialize logging with the given configuration
///
/// Sets up tracing with:
/// - Optional daily file rotation
/// - Structured logging with contextual fields
/// - Module-specific log levels
/// - Optional JSON formatting
pub fn init(config: LogConfig) -> Result<()> {
    let log_dir = Path::new(&config.log_dir);
    if config.file {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", config.log_dir))?;
    }

    // Build environment filter
    // Default to configured level, but allow override via RUST_LOG
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(&config)));

    let mut layers = Vec::new();

    // Console layer (human-readable)
    if config.console {
        let console_layer = fmt::layer()
            .with_target(true)
            .with_level(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_span_events(FmtSpan::NONE)
            .with_writer(std::io::stderr)
            .boxed();
        layers.push(console_layer);
    }

    // File layer with rotation
    if config.file {
        let file_appender = tracing_appender::rolling::daily(log_dir, &config.component);

        let file_layer = if config.json_format {
            // JSON format for structured logs
            fmt::layer()
                .json()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_current_span(true)
                .with_span_list(false)
                .with_writer(file_appender)
                .boxed()
        } else {
            // Human-readable format
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_span_events(FmtSpan::CLOSE)
                .with_writer(file_appender)
                .boxed()
        };

        layers.push(file_layer);
    }

    // Initialize the subscriber
    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::info!(
        component = %config.component,
        log_dir = %config.log_dir,
        "Logging initialized"
    );

    Ok(())
}

/// Initialize logging with default configuration
pub fn init_default() -> Result<()> {
    init(LogConfig::default())
}
