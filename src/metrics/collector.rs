//! Metrics collection using Prometheus
//!
//! This module records engine activity as Prometheus metrics on a registry owned
//! by the collector. Hosts expose the registry however they like.

use crate::error::ErrorKind;
use crate::queue::engine::EngineStats;
use crate::types::GroupSize;
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

/// Main metrics collector for the matchmaking engine
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Admission and removal metrics
    queue_metrics: QueueMetrics,

    /// Group formation metrics
    match_metrics: MatchMetrics,
}

/// Admission, removal and widening metrics
#[derive(Clone)]
pub struct QueueMetrics {
    /// Admission attempts by result (accepted or error code name)
    pub admissions_total: IntCounterVec,

    /// Participants removed explicitly
    pub removals_total: IntCounter,

    /// Widening steps applied
    pub widenings_total: IntCounter,

    /// Participants currently waiting
    pub participants_waiting: IntGauge,

    /// Wait estimates returned at admission
    pub estimated_wait_seconds: Histogram,
}

/// Group formation metrics
#[derive(Clone)]
pub struct MatchMetrics {
    /// Groups formed by group size
    pub groups_formed_total: IntCounterVec,

    /// Participants matched into groups
    pub participants_matched_total: IntCounter,

    /// Time matched participants spent waiting
    pub match_wait_seconds: Histogram,
}

fn wait_buckets() -> Vec<f64> {
    vec![1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0, 300.0, 600.0]
}

impl QueueMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let admissions_total = IntCounterVec::new(
            Opts::new(
                "parlor_queue_admissions_total",
                "Admission attempts by result",
            ),
            &["result"],
        )?;
        let removals_total = IntCounter::new(
            "parlor_queue_removals_total",
            "Participants removed before being matched",
        )?;
        let widenings_total = IntCounter::new(
            "parlor_queue_widenings_total",
            "Group size widening steps applied",
        )?;
        let participants_waiting = IntGauge::new(
            "parlor_queue_participants_waiting",
            "Participants currently waiting",
        )?;
        let estimated_wait_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "parlor_queue_estimated_wait_seconds",
                "Wait estimates returned at admission",
            )
            .buckets(wait_buckets()),
        )?;

        registry.register(Box::new(admissions_total.clone()))?;
        registry.register(Box::new(removals_total.clone()))?;
        registry.register(Box::new(widenings_total.clone()))?;
        registry.register(Box::new(participants_waiting.clone()))?;
        registry.register(Box::new(estimated_wait_seconds.clone()))?;

        Ok(Self {
            admissions_total,
            removals_total,
            widenings_total,
            participants_waiting,
            estimated_wait_seconds,
        })
    }
}

impl MatchMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let groups_formed_total = IntCounterVec::new(
            Opts::new("parlor_queue_groups_formed_total", "Groups formed by size"),
            &["group_size"],
        )?;
        let participants_matched_total = IntCounter::new(
            "parlor_queue_participants_matched_total",
            "Participants matched into groups",
        )?;
        let match_wait_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "parlor_queue_match_wait_seconds",
                "Time matched participants spent waiting",
            )
            .buckets(wait_buckets()),
        )?;

        registry.register(Box::new(groups_formed_total.clone()))?;
        registry.register(Box::new(participants_matched_total.clone()))?;
        registry.register(Box::new(match_wait_seconds.clone()))?;

        Ok(Self {
            groups_formed_total,
            participants_matched_total,
            match_wait_seconds,
        })
    }
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        Self::with_registry(Arc::new(Registry::new()))
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let queue_metrics = QueueMetrics::new(&registry)?;
        let match_metrics = MatchMetrics::new(&registry)?;

        Ok(Self {
            registry,
            queue_metrics,
            match_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn queue(&self) -> &QueueMetrics {
        &self.queue_metrics
    }

    pub fn matches(&self) -> &MatchMetrics {
        &self.match_metrics
    }

    /// Record a successful admission and its wait estimate
    pub fn record_admission(&self, estimated_wait_seconds: u64) {
        self.queue_metrics
            .admissions_total
            .with_label_values(&["accepted"])
            .inc();
        self.queue_metrics.participants_waiting.inc();
        self.queue_metrics
            .estimated_wait_seconds
            .observe(estimated_wait_seconds as f64);
    }

    /// Record a rejected admission
    pub fn record_rejection(&self, kind: ErrorKind) {
        self.queue_metrics
            .admissions_total
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    pub fn record_removal(&self) {
        self.queue_metrics.removals_total.inc();
        self.queue_metrics.participants_waiting.dec();
    }

    pub fn record_widening(&self) {
        self.queue_metrics.widenings_total.inc();
    }

    /// Record a formed group and the wait of each member
    pub fn record_group_formed(&self, group_size: GroupSize, member_waits: &[Duration]) {
        let size_label = group_size.to_string();
        self.match_metrics
            .groups_formed_total
            .with_label_values(&[size_label.as_str()])
            .inc();
        self.match_metrics
            .participants_matched_total
            .inc_by(member_waits.len() as u64);
        self.queue_metrics
            .participants_waiting
            .sub(member_waits.len() as i64);

        for wait in member_waits {
            self.match_metrics
                .match_wait_seconds
                .observe(wait.as_secs_f64());
        }
    }

    /// Overwrite the waiting gauge from engine stats
    pub fn update_from_engine_stats(&self, stats: &EngineStats) {
        self.queue_metrics
            .participants_waiting
            .set(stats.participants_waiting as i64);
    }

    /// Render every registered metric in the Prometheus text format
    pub fn encode_text(&self) -> Result<String> {
        let metric_families = self.registry.gather();
        TextEncoder::new()
            .encode_to_string(&metric_families)
            .map_err(|e| anyhow::anyhow!("Failed to encode metrics: {}", e))
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new().expect("Failed to create default metrics collector")
    }
}
