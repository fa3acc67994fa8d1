//! Observed wait-time statistics
//!
//! Every time a group forms, each member's time in queue is recorded against the
//! bucket that matched it. Hosts can compare these against admission estimates.

use crate::types::BucketKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Statistics for one bucket key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitTimeStats {
    /// Number of samples collected
    pub sample_count: u64,
    /// Sum of all wait times (for calculating mean)
    pub sum_seconds: f64,
    /// Sum of squared wait times (for calculating variance)
    pub sum_squared_seconds: f64,
    /// Minimum wait time observed
    pub min_seconds: f64,
    /// Maximum wait time observed
    pub max_seconds: f64,
    /// Time of the most recent sample
    pub last_updated: DateTime<Utc>,
}

impl WaitTimeStats {
    /// Create new empty statistics
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            sample_count: 0,
            sum_seconds: 0.0,
            sum_squared_seconds: 0.0,
            min_seconds: f64::INFINITY,
            max_seconds: 0.0,
            last_updated: now,
        }
    }

    /// Add a new wait time sample
    pub fn add_sample(&mut self, wait_time: Duration, now: DateTime<Utc>) {
        let seconds = wait_time.as_secs_f64();

        self.sample_count += 1;
        self.sum_seconds += seconds;
        self.sum_squared_seconds += seconds * seconds;
        self.min_seconds = self.min_seconds.min(seconds);
        self.max_seconds = self.max_seconds.max(seconds);
        self.last_updated = now;
    }

    pub fn mean(&self) -> Duration {
        if self.sample_count == 0 {
            return Duration::from_secs(0);
        }

        Duration::from_secs_f64(self.sum_seconds / self.sample_count as f64)
    }

    /// Population standard deviation
    pub fn standard_deviation(&self) -> Duration {
        if self.sample_count <= 1 {
            return Duration::from_secs(0);
        }

        let mean_seconds = self.sum_seconds / self.sample_count as f64;
        let variance =
            (self.sum_squared_seconds / self.sample_count as f64) - (mean_seconds * mean_seconds);

        Duration::from_secs_f64(variance.max(0.0).sqrt())
    }

    /// 95% confidence interval for the mean (normal approximation)
    pub fn confidence_interval_95(&self) -> (Duration, Duration) {
        let mean = self.mean();
        if self.sample_count < 2 {
            return (mean, mean);
        }

        let std_error = self.standard_deviation().as_secs_f64() / (self.sample_count as f64).sqrt();
        let margin_of_error = 1.96 * std_error;

        let lower = Duration::from_secs_f64((mean.as_secs_f64() - margin_of_error).max(0.0));
        let upper = Duration::from_secs_f64(mean.as_secs_f64() + margin_of_error);

        (lower, upper)
    }

    pub fn min(&self) -> Duration {
        if self.min_seconds == f64::INFINITY {
            Duration::from_secs(0)
        } else {
            Duration::from_secs_f64(self.min_seconds)
        }
    }

    pub fn max(&self) -> Duration {
        Duration::from_secs_f64(self.max_seconds)
    }

    pub fn has_sufficient_samples(&self, min_samples: u64) -> bool {
        self.sample_count >= min_samples
    }

    /// Age of the statistics since the last sample
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        Duration::from_secs(crate::utils::elapsed_seconds(self.last_updated, now))
    }
}

/// Per-bucket wait statistics, bounded in the number of keys tracked
#[derive(Debug, Clone)]
pub struct WaitTimeStatistics {
    stats: HashMap<BucketKey, WaitTimeStats>,
    max_entries: usize,
}

impl WaitTimeStatistics {
    pub fn new(max_entries: usize) -> Self {
        Self {
            stats: HashMap::new(),
            max_entries,
        }
    }

    /// Record a wait time sample for a bucket
    pub fn record(&mut self, key: BucketKey, wait_time: Duration, now: DateTime<Utc>) {
        self.stats
            .entry(key)
            .or_insert_with(|| WaitTimeStats::new(now))
            .add_sample(wait_time, now);

        self.evict_if_needed();
    }

    pub fn get(&self, key: &BucketKey) -> Option<&WaitTimeStats> {
        self.stats.get(key)
    }

    pub fn all(&self) -> &HashMap<BucketKey, WaitTimeStats> {
        &self.stats
    }

    pub fn clear(&mut self) {
        self.stats.clear();
    }

    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Drop the least recently updated keys beyond `max_entries`
    fn evict_if_needed(&mut self) {
        if self.stats.len() <= self.max_entries {
            return;
        }

        let mut entries: Vec<_> = self
            .stats
            .iter()
            .map(|(key, stats)| (*key, stats.last_updated))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)));

        let to_remove = self.stats.len() - self.max_entries;
        for (key, _) in entries.into_iter().take(to_remove) {
            self.stats.remove(&key);
        }
    }
}

impl Default for WaitTimeStatistics {
    fn default() -> Self {
        Self::new(1000)
    }
}
