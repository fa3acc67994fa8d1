//! Host application configuration
//!
//! This module defines the configuration a host process loads before building an
//! engine: service settings plus the engine tunables, from environment variables
//! or a TOML file.

use crate::config::engine::EngineConfig;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service: ServiceSettings,
    pub engine: EngineConfig,
}

/// Service-level settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Service name for logging and metrics
    pub name: String,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: "parlor-queue".to_string(),
            log_level: "info".to_string(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow!("Invalid {} value: {}", name, value))
}

impl AppConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        // Service settings
        if let Ok(name) = env::var("SERVICE_NAME") {
            config.service.name = name;
        }
        if let Ok(log_level) = env::var("LOG_LEVEL") {
            config.service.log_level = log_level;
        }

        // Engine settings
        if let Ok(value) = env::var("MAX_CATEGORY") {
            config.engine.max_category = parse_var("MAX_CATEGORY", &value)?;
        }
        if let Ok(value) = env::var("MAX_GROUP_SIZE") {
            config.engine.max_group_size = parse_var("MAX_GROUP_SIZE", &value)?;
        }
        if let Ok(value) = env::var("MIN_GROUP_SIZE") {
            config.engine.min_group_size = parse_var("MIN_GROUP_SIZE", &value)?;
        }
        if let Ok(value) = env::var("WIDEN_INTERVAL_SECONDS") {
            config.engine.widen_interval_seconds = parse_var("WIDEN_INTERVAL_SECONDS", &value)?;
        }
        if let Ok(value) = env::var("JOIN_TIME_PER_SLOT_SECONDS") {
            config.engine.join_time_per_slot_seconds =
                parse_var("JOIN_TIME_PER_SLOT_SECONDS", &value)?;
        }
        if let Ok(value) = env::var("NETWORK_LATENCY_SECONDS") {
            config.engine.network_latency_seconds = parse_var("NETWORK_LATENCY_SECONDS", &value)?;
        }

        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file; missing fields take their defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Get the widening interval as Duration
    pub fn widen_interval(&self) -> Duration {
        self.engine.widen_interval()
    }
}

/// Validate configuration values
pub fn validate_config(config: &AppConfig) -> Result<()> {
    match config.service.log_level.to_lowercase().as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => {}
        _ => return Err(anyhow!("Invalid log level: {}", config.service.log_level)),
    }

    if config.service.name.is_empty() {
        return Err(anyhow!("Service name cannot be empty"));
    }

    config.engine.validate()
}
