//! Wait time estimation and observed wait statistics
//!
//! This module estimates how long a participant will wait at admission time and
//! tracks how long matched participants actually waited.

pub mod estimator;
pub mod statistics;

// Re-export commonly used types
pub use estimator::{BucketOccupancy, WaitTimeEstimator, WideningChainEstimator};
pub use statistics::{WaitTimeStatistics, WaitTimeStats};
