//! Participant records held by the engine

use crate::types::{BucketKey, GroupSize, Preference};
use chrono::{DateTime, Utc};

/// One waiting participant
///
/// `memberships` lists every bucket that currently holds this participant, in the
/// order they were joined. Widening appends; nothing but removal shrinks it.
#[derive(Debug, Clone)]
pub struct ParticipantRecord<Id> {
    id: Id,
    current: Preference,
    original: Preference,
    admitted_at: DateTime<Utc>,
    last_update: DateTime<Utc>,
    /// Admission sequence number, used to keep widening order stable
    sequence: u64,
    memberships: Vec<BucketKey>,
}

impl<Id> ParticipantRecord<Id> {
    pub fn new(id: Id, preference: Preference, now: DateTime<Utc>, sequence: u64) -> Self {
        Self {
            id,
            current: preference,
            original: preference,
            admitted_at: now,
            last_update: now,
            sequence,
            memberships: Vec::new(),
        }
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn current_preference(&self) -> &Preference {
        &self.current
    }

    pub fn original_preference(&self) -> &Preference {
        &self.original
    }

    pub fn admitted_at(&self) -> DateTime<Utc> {
        self.admitted_at
    }

    pub fn last_update(&self) -> DateTime<Utc> {
        self.last_update
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn memberships(&self) -> &[BucketKey] {
        &self.memberships
    }

    /// Record that the participant now also sits in `key`
    pub fn add_membership(&mut self, key: BucketKey) {
        self.memberships.push(key);
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_update = now;
    }

    /// Whether the record has waited long enough and can still shrink its group size
    pub fn is_widenable(
        &self,
        now: DateTime<Utc>,
        widen_interval_seconds: u64,
        min_group_size: GroupSize,
    ) -> bool {
        crate::utils::elapsed_seconds(self.last_update, now) > widen_interval_seconds
            && self.current.group_size > min_group_size
    }

    /// Halve the current group size and return the bucket it now maps to
    pub fn widen(&mut self) -> BucketKey {
        self.current.group_size = (self.current.group_size / 2).max(1);
        self.current.bucket_key()
    }
}
