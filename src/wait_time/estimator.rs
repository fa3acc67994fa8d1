//! Admission-time wait estimates
//!
//! The estimate walks the group sizes a participant would pass through while
//! widening and picks the cheapest step: open slots still to fill plus the time
//! spent widening to reach that size.

use crate::config::EngineConfig;
use crate::types::{BucketKey, GroupSize, Preference};
use crate::utils::widening_chain;
use tracing::debug;

/// Read-only view of how full each bucket is
pub trait BucketOccupancy {
    fn occupancy(&self, key: BucketKey) -> usize;
}

/// Trait for estimating how long a new participant will wait
pub trait WaitTimeEstimator {
    /// Estimated wait in whole seconds for a participant about to be admitted
    fn estimate_wait(
        &self,
        preference: &Preference,
        occupancy: &dyn BucketOccupancy,
        widen_interval_seconds: u64,
    ) -> u64;
}

/// Estimator over the widening chain of the requested group size
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideningChainEstimator {
    pub join_time_per_slot_seconds: u64,
    pub network_latency_seconds: u64,
    pub min_group_size: GroupSize,
}

impl WideningChainEstimator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            join_time_per_slot_seconds: config.join_time_per_slot_seconds,
            network_latency_seconds: config.network_latency_seconds,
            min_group_size: config.min_group_size,
        }
    }
}

impl Default for WideningChainEstimator {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl WaitTimeEstimator for WideningChainEstimator {
    fn estimate_wait(
        &self,
        preference: &Preference,
        occupancy: &dyn BucketOccupancy,
        widen_interval_seconds: u64,
    ) -> u64 {
        let best = widening_chain(preference.group_size, self.min_group_size)
            .enumerate()
            .map(|(step, group_size)| {
                let filled = occupancy.occupancy(BucketKey::new(preference.category, group_size));
                let open_slots = (group_size as u64).saturating_sub(filled as u64);
                open_slots
                    .saturating_mul(self.join_time_per_slot_seconds)
                    .saturating_add((step as u64).saturating_mul(widen_interval_seconds))
            })
            .min()
            .unwrap_or(0);

        let estimate = best.saturating_add(self.network_latency_seconds);
        debug!(
            "Estimated wait for category {} size {}: {}s",
            preference.category, preference.group_size, estimate
        );
        estimate
    }
}
