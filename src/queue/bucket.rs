//! Bucket index and pending-evaluation set
//!
//! Each bucket holds the ids of participants sharing one `(category, group_size)`
//! pair, sorted ascending by rating. Buckets store ids rather than references; the
//! engine resolves ids through its record table.

use crate::types::{BucketKey, Rating};
use crate::wait_time::estimator::BucketOccupancy;
use std::collections::{BTreeSet, HashMap};

/// One bucket slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketEntry<Id> {
    pub id: Id,
    pub rating: Rating,
}

/// All buckets plus the set of keys touched since the last evaluation pass
#[derive(Debug, Clone)]
pub struct BucketIndex<Id> {
    buckets: HashMap<BucketKey, Vec<BucketEntry<Id>>>,
    pending: BTreeSet<BucketKey>,
}

impl<Id> Default for BucketIndex<Id> {
    fn default() -> Self {
        Self {
            buckets: HashMap::new(),
            pending: BTreeSet::new(),
        }
    }
}

impl<Id: PartialEq + Clone> BucketIndex<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping ascending rating order and mark the bucket pending
    ///
    /// Entries with an equal rating stay ahead of the new one. Returns the
    /// position the entry landed at.
    pub fn insert(&mut self, key: BucketKey, id: Id, rating: Rating) -> usize {
        let bucket = self.buckets.entry(key).or_default();
        let position = bucket.partition_point(|entry| entry.rating <= rating);
        bucket.insert(position, BucketEntry { id, rating });
        self.pending.insert(key);
        position
    }

    /// Remove `id` from one bucket; empty buckets are dropped
    ///
    /// Returns false if the bucket did not hold the id.
    pub fn remove(&mut self, key: BucketKey, id: &Id) -> bool {
        let Some(bucket) = self.buckets.get_mut(&key) else {
            return false;
        };

        let Some(position) = bucket.iter().position(|entry| entry.id == *id) else {
            return false;
        };

        bucket.remove(position);
        if bucket.is_empty() {
            self.buckets.remove(&key);
        }
        true
    }

    pub fn len(&self, key: BucketKey) -> usize {
        self.buckets.get(&key).map_or(0, Vec::len)
    }

    pub fn contains(&self, key: BucketKey, id: &Id) -> bool {
        self.buckets
            .get(&key)
            .is_some_and(|bucket| bucket.iter().any(|entry| entry.id == *id))
    }

    /// Ids in a bucket, lowest rating first
    pub fn ids(&self, key: BucketKey) -> Vec<Id> {
        self.buckets
            .get(&key)
            .map(|bucket| bucket.iter().map(|entry| entry.id.clone()).collect())
            .unwrap_or_default()
    }

    /// The lowest-rated `count` ids, if the bucket holds at least that many
    pub fn front(&self, key: BucketKey, count: usize) -> Option<Vec<Id>> {
        let bucket = self.buckets.get(&key)?;
        if count == 0 || bucket.len() < count {
            return None;
        }
        Some(bucket[..count].iter().map(|entry| entry.id.clone()).collect())
    }

    pub fn entries(&self, key: BucketKey) -> &[BucketEntry<Id>] {
        self.buckets.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keys of all non-empty buckets
    pub fn keys(&self) -> impl Iterator<Item = BucketKey> + '_ {
        self.buckets.keys().copied()
    }

    pub fn pending_keys(&self) -> Vec<BucketKey> {
        self.pending.iter().copied().collect()
    }

    /// Drain the pending set in ascending key order
    pub fn take_pending(&mut self) -> BTreeSet<BucketKey> {
        std::mem::take(&mut self.pending)
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

impl<Id> BucketOccupancy for BucketIndex<Id> {
    fn occupancy(&self, key: BucketKey) -> usize {
        self.buckets.get(&key).map_or(0, Vec::len)
    }
}
