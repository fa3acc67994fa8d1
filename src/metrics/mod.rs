//! Metrics for the parlor-queue engine
//!
//! Prometheus counters, gauges and histograms describing admissions, widening and
//! group formation.

pub mod collector;

pub use collector::{MatchMetrics, MetricsCollector, QueueMetrics};
