//! Parlor Queue - bucketed matchmaking queue engine
//!
//! This crate groups waiting participants into fixed-size parties that share a
//! category and sit close together in rating. Participants who wait too long have
//! their group size halved, joining looser buckets while keeping their place in
//! the stricter ones. The engine owns no sockets or timers: hosts admit and remove
//! participants and call `tick` on their own cadence.

pub mod clock;
pub mod config;
pub mod error;
pub mod metrics;
pub mod queue;
pub mod types;
pub mod utils;
pub mod wait_time;

// Re-export commonly used types and traits
pub use error::{AdmissionError, ErrorKind, MatchmakingError, Result};
pub use types::*;

// Re-export key components
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use queue::{MatchHandler, MatchmakingEngine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
