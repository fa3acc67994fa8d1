//! Matchmaking engine configuration

use crate::error::{MatchmakingError, Result};
use crate::types::{Category, GroupSize};
use crate::utils::is_power_of_two;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the matchmaking engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Highest valid category; categories are `1..=max_category`
    pub max_category: Category,
    /// Highest valid group size, must be a power of two
    pub max_group_size: GroupSize,
    /// Widening never halves a group size at or below this value
    pub min_group_size: GroupSize,
    /// Seconds a participant waits before its group size is halved
    pub widen_interval_seconds: u64,
    /// Estimated seconds for one more participant to fill an open slot
    pub join_time_per_slot_seconds: u64,
    /// Fixed latency added to every wait estimate
    pub network_latency_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_category: 1,
            max_group_size: 32,
            min_group_size: 2,
            widen_interval_seconds: 5,
            join_time_per_slot_seconds: 1,
            network_latency_seconds: 2,
        }
    }
}

impl EngineConfig {
    /// Convenience constructor for the two bounds hosts usually care about
    pub fn with_bounds(max_category: Category, max_group_size: GroupSize) -> Self {
        Self {
            max_category,
            max_group_size,
            ..Default::default()
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.max_category == 0 {
            return Err(MatchmakingError::ConfigurationError {
                message: "max_category must be greater than 0".to_string(),
            }
            .into());
        }

        if !is_power_of_two(self.max_group_size) {
            return Err(MatchmakingError::ConfigurationError {
                message: format!(
                    "max_group_size must be a power of two, got {}",
                    self.max_group_size
                ),
            }
            .into());
        }

        if !is_power_of_two(self.min_group_size) {
            return Err(MatchmakingError::ConfigurationError {
                message: format!(
                    "min_group_size must be a power of two, got {}",
                    self.min_group_size
                ),
            }
            .into());
        }

        if self.min_group_size > self.max_group_size {
            return Err(MatchmakingError::ConfigurationError {
                message: "min_group_size must not exceed max_group_size".to_string(),
            }
            .into());
        }

        Ok(())
    }

    /// Get the widening interval as Duration
    pub fn widen_interval(&self) -> Duration {
        Duration::from_secs(self.widen_interval_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_config_default() {
        let config = EngineConfig::default();
        assert_eq!(config.max_category, 1);
        assert_eq!(config.max_group_size, 32);
        assert_eq!(config.min_group_size, 2);
        assert_eq!(config.widen_interval(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_engine_config_validation() {
        let mut config = EngineConfig::default();

        config.max_category = 0;
        assert!(config.validate().is_err());

        config = EngineConfig::default();
        config.max_group_size = 24;
        assert!(config.validate().is_err());

        config = EngineConfig::default();
        config.min_group_size = 3;
        assert!(config.validate().is_err());

        config = EngineConfig::with_bounds(4, 4);
        config.min_group_size = 8;
        assert!(config.validate().is_err());

        config = EngineConfig::with_bounds(4, 1);
        config.min_group_size = 1;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_engine_config_partial_toml() {
        let config: EngineConfig = toml::from_str("max_category = 3\nwiden_interval_seconds = 10")
            .expect("partial config should deserialize");
        assert_eq!(config.max_category, 3);
        assert_eq!(config.widen_interval_seconds, 10);
        assert_eq!(config.max_group_size, 32);
    }
}
