//! Matchmaking queue for the parlor-queue engine
//!
//! This module holds participant records, the rating-ordered bucket index, the
//! match notification seam and the engine that ties them together.

pub mod bucket;
pub mod engine;
pub mod handler;
pub mod record;

// Re-export commonly used types
pub use bucket::{BucketEntry, BucketIndex};
pub use engine::{EngineStats, MatchmakingEngine};
pub use handler::{MatchHandler, NoopHandler};
pub use record::ParticipantRecord;
