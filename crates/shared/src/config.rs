//! Configuration management for the anime catalog.
//!
//! This module handles loading and parsing configuration from TOML files,
//! with sensible defaults for all settings.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory settings
    pub data: DataConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// Jikan API settings
    pub jikan: JikanConfig,

    /// Scroll-derived UI flag thresholds
    #[serde(default)]
    pub scroll: ScrollConfig,
}

/// Data directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Root data directory path
    pub root_dir: String,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log directory path (relative to data directory or absolute)
    pub log_dir: String,

    /// Default log level (trace, debug, info, warn, error)
    pub default_level: String,

    /// Enable console output
    pub console: bool,

    /// Enable file output
    pub file: bool,

    /// Enable JSON formatting for file logs
    pub json_format: bool,
}

/// Jikan API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JikanConfig {
    /// Jikan API base URL
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// User agent sent with every request
    pub user_agent: String,

    /// Page size for list requests
    pub page_limit: u32,

    /// Maximum retries for rate-limited detail requests
    pub max_retries: u32,

    /// Retry delay in milliseconds, multiplied by the attempt number
    pub retry_delay_ms: u64,
}

/// Scroll threshold configuration (pixels)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Offset past which the scroll-to-top button is shown
    pub scroll_top_threshold: f64,

    /// Offset past which the floating search bar is shown
    pub search_bar_threshold: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            scroll_top_threshold: 500.0,
            search_bar_threshold: 100.0,
        }
    }
}

impl Default for JikanConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.jikan.moe/v4".to_string(),
            timeout_seconds: 30,
            user_agent: concat!("anime-catalog/", env!("CARGO_PKG_VERSION")).to_string(),
            page_limit: 24,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data: DataConfig {
                root_dir: "data".to_string(),
            },
            logging: LoggingConfig {
                log_dir: "logs".to_string(),
                default_level: "info".to_string(),
                console: true,
                file: false,
                json_format: false,
            },
            jikan: JikanConfig::default(),
            scroll: ScrollConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns the default configuration.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::info!(
            path = %path.display(),
            "Configuration saved successfully"
        );

        Ok(())
    }

    /// Get the path for the data directory
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data.root_dir)
    }

    /// Get the absolute path for the log directory
    pub fn log_dir(&self) -> PathBuf {
        let log_path = Path::new(&self.logging.log_dir);
        if log_path.is_absolute() {
            log_path.to_path_buf()
        } else {
            self.data_dir().join(log_path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.data.root_dir, "data");
        assert_eq!(config.jikan.base_url, "https://api.jikan.moe/v4");
        assert_eq!(config.jikan.page_limit, 24);
        assert_eq!(config.jikan.max_retries, 3);
        assert_eq!(config.jikan.retry_delay_ms, 1000);
        assert_eq!(config.scroll.scroll_top_threshold, 500.0);
        assert_eq!(config.scroll.search_bar_threshold, 100.0);
    }

    #[test]
    fn test_save_and_load_config() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut original_config = Config::default();
        original_config.jikan.retry_delay_ms = 250;
        original_config.save(&config_path)?;

        assert!(config_path.exists());

        let loaded_config = Config::from_file(&config_path)?;
        assert_eq!(loaded_config.data.root_dir, original_config.data.root_dir);
        assert_eq!(loaded_config.jikan.base_url, original_config.jikan.base_url);
        assert_eq!(loaded_config.jikan.retry_delay_ms, 250);

        Ok(())
    }

    #[test]
    fn test_missing_scroll_section_uses_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");

        let mut content = toml::to_string_pretty(&Config::default())?;
        let scroll_at = content.find("[scroll]").expect("scroll section");
        content.truncate(scroll_at);
        std::fs::write(&config_path, content)?;

        let loaded = Config::from_file(&config_path)?;
        assert_eq!(loaded.scroll.scroll_top_threshold, 500.0);

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        // Should return default config without error
        assert_eq!(config.data.root_dir, "data");
    }

    #[test]
    fn test_invalid_config_is_an_error() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "this is = = not toml")?;

        assert!(Config::from_file(&config_path).is_err());

        Ok(())
    }

    #[test]
    fn test_path_resolution() {
        let config = Config::default();

        let log_dir = config.log_dir();
        assert!(log_dir.ends_with("data/logs"));
    }
}
