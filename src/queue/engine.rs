//! Matchmaking engine
//!
//! This module provides the engine that owns every participant record and bucket.
//! Admission inserts a participant into one bucket; each `tick` widens participants
//! that waited past the interval and then evaluates every bucket touched since the
//! previous tick, forming groups from the lowest-rated entries first.
//!
//! The engine is single-threaded and never blocks. Hosts call `tick` on their own
//! cadence and serialize all calls.

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::{AdmissionError, MatchmakingError, Result};
use crate::metrics::MetricsCollector;
use crate::queue::bucket::BucketIndex;
use crate::queue::handler::MatchHandler;
use crate::queue::record::ParticipantRecord;
use crate::types::{BucketKey, Preference};
use crate::utils::is_power_of_two;
use crate::wait_time::estimator::{WaitTimeEstimator, WideningChainEstimator};
use crate::wait_time::statistics::WaitTimeStatistics;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Running counters for engine activity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Total participants admitted
    pub participants_admitted: u64,
    /// Total admissions rejected
    pub admissions_rejected: u64,
    /// Total participants removed before matching
    pub participants_removed: u64,
    /// Total widening steps applied
    pub widenings: u64,
    /// Total groups formed
    pub groups_formed: u64,
    /// Total participants matched into groups
    pub participants_matched: u64,
    /// Current number of participants waiting
    pub participants_waiting: usize,
}

/// The matchmaking engine
pub struct MatchmakingEngine<Id> {
    config: EngineConfig,
    records: HashMap<Id, ParticipantRecord<Id>>,
    buckets: BucketIndex<Id>,
    handler: Box<dyn MatchHandler<Id>>,
    clock: Arc<dyn Clock>,
    estimator: Box<dyn WaitTimeEstimator>,
    metrics: Arc<MetricsCollector>,
    stats: EngineStats,
    wait_statistics: WaitTimeStatistics,
    next_sequence: u64,
}

/// Log and abort on a broken record/bucket invariant
fn consistency_violation(message: String) -> ! {
    error!("Internal consistency violation: {}", message);
    panic!("internal consistency violation: {}", message);
}

impl<Id> MatchmakingEngine<Id>
where
    Id: Eq + Hash + Clone + Debug + 'static,
{
    /// Create an engine on wall-clock time
    pub fn new(config: EngineConfig, handler: impl MatchHandler<Id> + 'static) -> Result<Self> {
        Self::with_clock(config, handler, Arc::new(SystemClock))
    }

    /// Create an engine with an injected clock
    pub fn with_clock(
        config: EngineConfig,
        handler: impl MatchHandler<Id> + 'static,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let estimator = Box::new(WideningChainEstimator::new(&config));
        let metrics = Arc::new(MetricsCollector::new()?);
        Self::with_components(config, handler, clock, estimator, metrics)
    }

    /// Create an engine with every collaborator supplied by the host
    pub fn with_components(
        config: EngineConfig,
        handler: impl MatchHandler<Id> + 'static,
        clock: Arc<dyn Clock>,
        estimator: Box<dyn WaitTimeEstimator>,
        metrics: Arc<MetricsCollector>,
    ) -> Result<Self> {
        config.validate()?;

        info!(
            "Matchmaking engine configured - categories: 1..={}, group sizes: 1..={}, widen interval: {}s",
            config.max_category, config.max_group_size, config.widen_interval_seconds
        );

        Ok(Self {
            config,
            records: HashMap::new(),
            buckets: BucketIndex::new(),
            handler: Box::new(handler),
            clock,
            estimator,
            metrics,
            stats: EngineStats::default(),
            wait_statistics: WaitTimeStatistics::default(),
            next_sequence: 0,
        })
    }

    /// Queue a participant and return the estimated wait in seconds
    pub fn admit(
        &mut self,
        id: Id,
        preference: Preference,
    ) -> std::result::Result<u64, AdmissionError> {
        if let Err(rejection) = self.validate_admission(&id, &preference) {
            warn!(
                "Rejected admission of {:?} (code {}): {}",
                id,
                rejection.code(),
                rejection
            );
            self.stats.admissions_rejected += 1;
            self.metrics.record_rejection(rejection.kind());
            return Err(rejection);
        }

        // Estimate before the new participant is visible in any bucket
        let estimate = self.estimator.estimate_wait(
            &preference,
            &self.buckets,
            self.config.widen_interval_seconds,
        );

        let now = self.clock.now();
        let key = preference.bucket_key();
        let mut record = ParticipantRecord::new(id.clone(), preference, now, self.next_sequence);
        self.next_sequence += 1;

        let position = self.buckets.insert(key, id.clone(), preference.rating);
        record.add_membership(key);
        self.records.insert(id.clone(), record);

        self.stats.participants_admitted += 1;
        self.stats.participants_waiting = self.records.len();
        self.metrics.record_admission(estimate);

        debug!(
            "Admitted {:?} - rating: {}, bucket: {}, position: {}, estimated wait: {}s",
            id, preference.rating, key, position, estimate
        );

        Ok(estimate)
    }

    fn validate_admission(
        &self,
        id: &Id,
        preference: &Preference,
    ) -> std::result::Result<(), AdmissionError> {
        if self.records.contains_key(id) {
            return Err(AdmissionError::DuplicateParticipant);
        }

        if preference.category < 1 || preference.category > self.config.max_category {
            return Err(AdmissionError::InvalidCategory {
                category: preference.category,
                max: self.config.max_category,
            });
        }

        if !is_power_of_two(preference.group_size)
            || preference.group_size > self.config.max_group_size
        {
            return Err(AdmissionError::InvalidGroupSize {
                group_size: preference.group_size,
                max: self.config.max_group_size,
            });
        }

        Ok(())
    }

    /// Withdraw a waiting participant from every bucket it occupies
    ///
    /// Returns false if the id is not queued.
    pub fn remove(&mut self, id: &Id) -> bool {
        let Some(record) = self.records.remove(id) else {
            debug!("Remove requested for unknown participant {:?}", id);
            return false;
        };

        self.detach(&record);

        self.stats.participants_removed += 1;
        self.stats.participants_waiting = self.records.len();
        self.metrics.record_removal();

        debug!(
            "Removed {:?} from {} bucket(s)",
            id,
            record.memberships().len()
        );
        true
    }

    /// Erase a record's id from each bucket it belongs to
    fn detach(&mut self, record: &ParticipantRecord<Id>) {
        for key in record.memberships() {
            if !self.buckets.remove(*key, record.id()) {
                consistency_violation(format!(
                    "participant {:?} lists bucket {} but the bucket does not hold it",
                    record.id(),
                    key
                ));
            }
        }
    }

    /// Run one widening pass followed by one evaluation pass
    ///
    /// Matches are reported to the handler before this returns.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.widen_waiting(now);
        self.evaluate_pending(now);
    }

    /// Halve the group size of every participant that waited past the interval
    fn widen_waiting(&mut self, now: DateTime<Utc>) {
        let interval = self.config.widen_interval_seconds;
        let floor = self.config.min_group_size;

        let mut due: Vec<(u64, Id)> = self
            .records
            .values()
            .filter(|record| record.is_widenable(now, interval, floor))
            .map(|record| (record.sequence(), record.id().clone()))
            .collect();
        due.sort_unstable_by_key(|(sequence, _)| *sequence);

        for (_, id) in due {
            let Some(record) = self.records.get_mut(&id) else {
                continue;
            };

            let from = record.current_preference().group_size;
            let key = record.widen();
            record.add_membership(key);
            record.touch(now);
            let rating = record.current_preference().rating;

            self.buckets.insert(key, id.clone(), rating);
            self.stats.widenings += 1;
            self.metrics.record_widening();

            debug!(
                "Widened {:?} from size {} to {} (bucket {})",
                id, from, key.group_size, key
            );
        }
    }

    /// Evaluate each bucket touched since the last pass, exactly once
    fn evaluate_pending(&mut self, now: DateTime<Utc>) {
        for key in self.buckets.take_pending() {
            self.evaluate(key, now);
        }
    }

    /// Form groups from the front of a bucket until it runs short
    fn evaluate(&mut self, key: BucketKey, now: DateTime<Utc>) {
        let group_size = key.group_size as usize;
        debug!(
            "Evaluating bucket {} - waiting: {}, needed: {}",
            key,
            self.buckets.len(key),
            group_size
        );

        while let Some(ids) = self.buckets.front(key, group_size) {
            let mut waits = Vec::with_capacity(ids.len());

            for id in &ids {
                let Some(record) = self.records.remove(id) else {
                    consistency_violation(format!(
                        "bucket {} holds {:?} but no record exists",
                        key, id
                    ));
                };
                self.detach(&record);

                let wait = (now - record.admitted_at())
                    .to_std()
                    .unwrap_or(Duration::ZERO);
                self.wait_statistics.record(key, wait, now);
                waits.push(wait);
            }

            self.stats.groups_formed += 1;
            self.stats.participants_matched += ids.len() as u64;
            self.stats.participants_waiting = self.records.len();
            self.metrics.record_group_formed(key.group_size, &waits);

            info!(
                "Group formed in bucket {} - category: {}, members: {}, total matched: {}",
                key,
                key.category,
                ids.len(),
                self.stats.participants_matched
            );

            self.handler.on_match(key.category, ids);
        }
    }

    /// Change how long participants wait before widening
    pub fn set_widen_interval(&mut self, seconds: u64) {
        info!(
            "Widen interval changed from {}s to {}s",
            self.config.widen_interval_seconds, seconds
        );
        self.config.widen_interval_seconds = seconds;
    }

    pub fn widen_interval(&self) -> u64 {
        self.config.widen_interval_seconds
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.records.contains_key(id)
    }

    /// Number of participants waiting
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Current preference of a waiting participant, after any widening
    pub fn preference(&self, id: &Id) -> Option<Preference> {
        self.records
            .get(id)
            .map(|record| *record.current_preference())
    }

    /// Preference a waiting participant was admitted with
    pub fn original_preference(&self, id: &Id) -> Option<Preference> {
        self.records
            .get(id)
            .map(|record| *record.original_preference())
    }

    /// Buckets a waiting participant occupies, in the order it joined them
    pub fn memberships(&self, id: &Id) -> Option<Vec<BucketKey>> {
        self.records
            .get(id)
            .map(|record| record.memberships().to_vec())
    }

    /// Ids waiting in a bucket, lowest rating first
    pub fn bucket_ids(&self, key: BucketKey) -> Vec<Id> {
        self.buckets.ids(key)
    }

    pub fn bucket_len(&self, key: BucketKey) -> usize {
        self.buckets.len(key)
    }

    /// Buckets awaiting evaluation on the next tick
    pub fn pending_keys(&self) -> Vec<BucketKey> {
        self.buckets.pending_keys()
    }

    pub fn stats(&self) -> EngineStats {
        self.stats.clone()
    }

    pub fn wait_statistics(&self) -> &WaitTimeStatistics {
        &self.wait_statistics
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }

    /// Verify that records and buckets agree with each other
    pub fn check_integrity(&self) -> Result<()> {
        let violation = |message: String| -> anyhow::Error {
            MatchmakingError::InternalError { message }.into()
        };

        let mut total_memberships = 0;
        for (id, record) in &self.records {
            let mut seen = HashSet::new();
            for key in record.memberships() {
                if !seen.insert(*key) {
                    return Err(violation(format!(
                        "participant {:?} lists bucket {} twice",
                        id, key
                    )));
                }
                if !self.buckets.contains(*key, id) {
                    return Err(violation(format!(
                        "participant {:?} lists bucket {} but is not in it",
                        id, key
                    )));
                }
            }
            total_memberships += record.memberships().len();
        }

        let mut total_entries = 0;
        for key in self.buckets.keys() {
            let entries = self.buckets.entries(key);
            for entry in entries {
                let Some(record) = self.records.get(&entry.id) else {
                    return Err(violation(format!(
                        "bucket {} holds {:?} with no record",
                        key, entry.id
                    )));
                };
                if !record.memberships().contains(&key) {
                    return Err(violation(format!(
                        "bucket {} holds {:?} but the record does not list it",
                        key, entry.id
                    )));
                }
            }
            if entries.windows(2).any(|pair| pair[0].rating > pair[1].rating) {
                return Err(violation(format!("bucket {} is not sorted by rating", key)));
            }
            total_entries += entries.len();
        }

        if total_entries != total_memberships {
            return Err(violation(format!(
                "{} bucket entries but {} recorded memberships",
                total_entries, total_memberships
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{ManualClock, MockClock};
    use crate::error::ErrorKind;
    use crate::types::Category;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Matches = Rc<RefCell<Vec<(Category, Vec<String>)>>>;

    fn create_test_engine(config: EngineConfig) -> (MatchmakingEngine<String>, ManualClock, Matches) {
        let clock = ManualClock::starting_now();
        let matches: Matches = Rc::new(RefCell::new(Vec::new()));
        let sink = matches.clone();
        let engine = MatchmakingEngine::with_clock(
            config,
            move |category: Category, ids: Vec<String>| sink.borrow_mut().push((category, ids)),
            Arc::new(clock.clone()),
        )
        .unwrap();
        (engine, clock, matches)
    }

    fn pref(rating: i32, group_size: u32) -> Preference {
        Preference::new(rating, 1, group_size)
    }

    #[test]
    fn test_admit_and_duplicate() {
        let (mut engine, _clock, _matches) = create_test_engine(EngineConfig::default());

        assert!(engine.admit("p1".to_string(), pref(1500, 4)).is_ok());
        let err = engine.admit("p1".to_string(), pref(1600, 8)).unwrap_err();
        assert_eq!(err, AdmissionError::DuplicateParticipant);
        assert_eq!(err.kind(), ErrorKind::DuplicateParticipant);

        assert_eq!(engine.len(), 1);
        assert_eq!(engine.preference(&"p1".to_string()), Some(pref(1500, 4)));
        assert_eq!(engine.stats().admissions_rejected, 1);
    }

    #[test]
    fn test_admit_validation() {
        let (mut engine, _clock, _matches) =
            create_test_engine(EngineConfig::with_bounds(2, 16));

        let err = engine
            .admit("a".to_string(), Preference::new(1500, 0, 2))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCategory);

        let err = engine
            .admit("a".to_string(), Preference::new(1500, 3, 2))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidCategory);

        for group_size in [0, 3, 12, 32] {
            let err = engine
                .admit("a".to_string(), Preference::new(1500, 2, group_size))
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidGroupSize, "size {}", group_size);
        }

        assert!(engine.admit("a".to_string(), Preference::new(1500, 2, 16)).is_ok());
        assert!(engine.admit("b".to_string(), Preference::new(1500, 1, 1)).is_ok());
        assert_eq!(engine.len(), 2);
    }

    #[test]
    fn test_duplicate_checked_before_validation() {
        let (mut engine, _clock, _matches) = create_test_engine(EngineConfig::default());
        engine.admit("p1".to_string(), pref(1500, 4)).unwrap();

        let err = engine
            .admit("p1".to_string(), Preference::new(1500, 99, 3))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DuplicateParticipant);
    }

    #[test]
    fn test_admit_returns_estimate_before_insertion() {
        let (mut engine, _clock, _matches) = create_test_engine(EngineConfig::default());

        // Empty bucket of size 2: two open slots plus two seconds latency
        assert_eq!(engine.admit("a".to_string(), pref(1500, 2)).unwrap(), 4);
        // One already waiting: one open slot
        assert_eq!(engine.admit("b".to_string(), pref(1500, 2)).unwrap(), 3);
    }

    #[test]
    fn test_pair_matches_on_tick() {
        let (mut engine, _clock, matches) = create_test_engine(EngineConfig::default());

        engine.admit("high".to_string(), pref(1800, 2)).unwrap();
        engine.admit("low".to_string(), pref(1200, 2)).unwrap();
        assert!(matches.borrow().is_empty());

        engine.tick();

        assert_eq!(
            *matches.borrow(),
            vec![(1, vec!["low".to_string(), "high".to_string()])]
        );
        assert!(engine.is_empty());
        assert_eq!(engine.bucket_len(BucketKey::new(1, 2)), 0);

        let stats = engine.stats();
        assert_eq!(stats.groups_formed, 1);
        assert_eq!(stats.participants_matched, 2);
        assert_eq!(stats.participants_waiting, 0);
    }

    #[test]
    fn test_bucket_yields_multiple_groups() {
        let (mut engine, _clock, matches) = create_test_engine(EngineConfig::default());

        for (i, rating) in [1500, 1100, 1900, 1300, 1700].iter().enumerate() {
            engine.admit(format!("p{}", i), pref(*rating, 2)).unwrap();
        }
        engine.tick();

        let matches = matches.borrow();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].1, vec!["p1".to_string(), "p3".to_string()]);
        assert_eq!(matches[1].1, vec!["p0".to_string(), "p4".to_string()]);
        assert_eq!(engine.bucket_ids(BucketKey::new(1, 2)), vec!["p2".to_string()]);
    }

    #[test]
    fn test_size_one_matches_alone() {
        let (mut engine, _clock, matches) = create_test_engine(EngineConfig::default());
        engine.admit("solo".to_string(), pref(1500, 1)).unwrap();
        engine.tick();
        assert_eq!(*matches.borrow(), vec![(1, vec!["solo".to_string()])]);
    }

    #[test]
    fn test_remove() {
        let (mut engine, _clock, _matches) = create_test_engine(EngineConfig::default());
        let id = "p1".to_string();

        assert!(!engine.remove(&id));
        engine.admit(id.clone(), pref(1500, 4)).unwrap();
        assert!(engine.remove(&id));
        assert!(!engine.contains(&id));
        assert_eq!(engine.bucket_len(BucketKey::new(1, 4)), 0);
        assert!(!engine.remove(&id));
        assert_eq!(engine.stats().participants_removed, 1);

        assert!(engine.admit(id, pref(1500, 4)).is_ok());
        engine.check_integrity().unwrap();
    }

    #[test]
    fn test_widening_adds_memberships() {
        let (mut engine, clock, matches) = create_test_engine(EngineConfig::default());
        let id = "waiter".to_string();
        engine.admit(id.clone(), pref(1500, 8)).unwrap();

        // Not strictly past the interval yet
        clock.advance_secs(5);
        engine.tick();
        assert_eq!(engine.memberships(&id).unwrap(), vec![BucketKey::new(1, 8)]);

        clock.advance_secs(1);
        engine.tick();
        assert_eq!(
            engine.memberships(&id).unwrap(),
            vec![BucketKey::new(1, 8), BucketKey::new(1, 4)]
        );
        assert_eq!(engine.preference(&id).unwrap().group_size, 4);
        assert_eq!(engine.original_preference(&id).unwrap().group_size, 8);

        clock.advance_secs(6);
        engine.tick();
        assert_eq!(engine.preference(&id).unwrap().group_size, 2);

        // Minimum reached
        clock.advance_secs(60);
        engine.tick();
        assert_eq!(engine.memberships(&id).unwrap().len(), 3);
        assert_eq!(engine.stats().widenings, 2);
        assert!(matches.borrow().is_empty());
        engine.check_integrity().unwrap();
    }

    #[test]
    fn test_widened_participant_matched_everywhere_removed() {
        let (mut engine, clock, matches) = create_test_engine(EngineConfig::default());
        engine.admit("early".to_string(), pref(1500, 4)).unwrap();
        engine.tick();

        clock.advance_secs(6);
        engine.tick();
        assert_eq!(engine.bucket_len(BucketKey::new(1, 4)), 1);
        assert_eq!(engine.bucket_len(BucketKey::new(1, 2)), 1);

        engine.admit("late".to_string(), pref(1400, 2)).unwrap();
        engine.tick();

        assert_eq!(
            *matches.borrow(),
            vec![(1, vec!["late".to_string(), "early".to_string()])]
        );
        assert_eq!(engine.bucket_len(BucketKey::new(1, 4)), 0);
        engine.check_integrity().unwrap();
    }

    #[test]
    fn test_set_widen_interval() {
        let (mut engine, clock, _matches) = create_test_engine(EngineConfig::default());
        engine.set_widen_interval(30);
        assert_eq!(engine.widen_interval(), 30);

        engine.admit("p".to_string(), pref(1500, 8)).unwrap();
        clock.advance_secs(10);
        engine.tick();
        assert_eq!(engine.preference(&"p".to_string()).unwrap().group_size, 8);

        clock.advance_secs(21);
        engine.tick();
        assert_eq!(engine.preference(&"p".to_string()).unwrap().group_size, 4);
    }

    #[test]
    fn test_pending_keys_cleared_after_tick() {
        let (mut engine, _clock, _matches) = create_test_engine(EngineConfig::default());
        engine.admit("a".to_string(), pref(1500, 4)).unwrap();
        engine.admit("b".to_string(), pref(1500, 8)).unwrap();
        assert_eq!(
            engine.pending_keys(),
            vec![BucketKey::new(1, 4), BucketKey::new(1, 8)]
        );

        engine.tick();
        assert!(engine.pending_keys().is_empty());
    }

    #[test]
    fn test_removal_does_not_mark_pending() {
        let (mut engine, _clock, _matches) = create_test_engine(EngineConfig::default());
        engine.admit("a".to_string(), pref(1500, 4)).unwrap();
        engine.tick();
        engine.remove(&"a".to_string());
        assert!(engine.pending_keys().is_empty());
    }

    #[test]
    fn test_wait_statistics_recorded_on_match() {
        let (mut engine, clock, _matches) = create_test_engine(EngineConfig::default());
        engine.admit("a".to_string(), pref(1500, 2)).unwrap();
        clock.advance_secs(4);
        engine.admit("b".to_string(), pref(1500, 2)).unwrap();
        engine.tick();

        let stats = engine
            .wait_statistics()
            .get(&BucketKey::new(1, 2))
            .unwrap();
        assert_eq!(stats.sample_count, 2);
        assert_eq!(stats.max(), Duration::from_secs(4));
        assert_eq!(stats.min(), Duration::from_secs(0));
    }

    #[test]
    fn test_metrics_follow_engine_activity() {
        let (mut engine, _clock, _matches) = create_test_engine(EngineConfig::default());
        engine.admit("a".to_string(), pref(1500, 2)).unwrap();
        engine.admit("b".to_string(), pref(1500, 2)).unwrap();
        let _ = engine.admit("b".to_string(), pref(1500, 2));
        engine.tick();

        let metrics = engine.metrics();
        assert_eq!(
            metrics
                .queue()
                .admissions_total
                .with_label_values(&["accepted"])
                .get(),
            2
        );
        assert_eq!(metrics.matches().participants_matched_total.get(), 2);
        assert_eq!(metrics.queue().participants_waiting.get(), 0);
    }

    #[test]
    fn test_frozen_mock_clock_never_widens() {
        let start = crate::utils::current_timestamp();
        let mut clock = MockClock::new();
        clock.expect_now().return_const(start);

        let mut engine = MatchmakingEngine::with_clock(
            EngineConfig::default(),
            crate::queue::handler::NoopHandler,
            Arc::new(clock),
        )
        .unwrap();

        engine.admit(7u64, pref(1500, 16)).unwrap();
        for _ in 0..10 {
            engine.tick();
        }
        assert_eq!(engine.memberships(&7).unwrap(), vec![BucketKey::new(1, 16)]);
        assert_eq!(engine.stats().widenings, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EngineConfig {
            max_group_size: 6,
            ..Default::default()
        };
        let result = MatchmakingEngine::<String>::new(config, crate::queue::handler::NoopHandler);
        assert!(result.is_err());
    }

    #[test]
    fn test_check_integrity_detects_corruption() {
        let (mut engine, _clock, _matches) = create_test_engine(EngineConfig::default());
        engine.admit("a".to_string(), pref(1500, 4)).unwrap();
        engine.check_integrity().unwrap();

        engine.buckets.insert(BucketKey::new(1, 2), "a".to_string(), 1500);
        assert!(engine.check_integrity().is_err());
    }
}
