//! Common types used throughout the matchmaking queue

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Skill score used only for ordering inside a bucket
pub type Rating = i32;

/// Discrete grouping preference, such as a map or game mode
pub type Category = u32;

/// Number of participants required to form a group
pub type GroupSize = u32;

/// A participant's matching preference at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Preference {
    pub rating: Rating,
    pub category: Category,
    pub group_size: GroupSize,
}

impl Preference {
    pub fn new(rating: Rating, category: Category, group_size: GroupSize) -> Self {
        Self {
            rating,
            category,
            group_size,
        }
    }

    /// Key of the bucket this preference currently maps to
    pub fn bucket_key(&self) -> BucketKey {
        BucketKey::new(self.category, self.group_size)
    }
}

/// Identifies one bucket: all waiting participants sharing a category and group size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BucketKey {
    pub category: Category,
    pub group_size: GroupSize,
}

impl BucketKey {
    pub fn new(category: Category, group_size: GroupSize) -> Self {
        Self {
            category,
            group_size,
        }
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.category, self.group_size)
    }
}

/// A group formed by the evaluator, as seen by hosts that want more than the callback
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchedGroup<Id> {
    pub category: Category,
    pub group_size: GroupSize,
    /// Member ids in ascending rating order
    pub ids: Vec<Id>,
    pub formed_at: DateTime<Utc>,
}
