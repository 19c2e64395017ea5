//! Shared library for the anime catalog workspace.
//!
//! This crate provides common functionality used across binary crates:
//! - Configuration management
//! - Logging infrastructure

pub mod config;
pub mod logging;

// Re-export commonly used types
pub use config::{Config, JikanConfig, ScrollConfig};
pub use logging::LogConfig;
