//! Configuration management for the parlor-queue engine
//!
//! This module handles configuration loading from environment variables and TOML
//! files, validation, and default values.

pub mod app;
pub mod engine;

// Re-export commonly used types
pub use app::{validate_config, AppConfig, ServiceSettings};
pub use engine::EngineConfig;
