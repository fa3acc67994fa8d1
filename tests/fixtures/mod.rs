//! Test fixtures for integration testing

#![allow(dead_code)]

use parlor_queue::clock::ManualClock;
use parlor_queue::config::EngineConfig;
use parlor_queue::queue::{MatchHandler, MatchmakingEngine};
use parlor_queue::types::{Category, Preference, Rating};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Match handler that captures every formed group for inspection
///
/// Clones share the same capture buffer, so a test keeps one clone while the
/// engine owns the other.
#[derive(Debug, Clone, Default)]
pub struct RecordingHandler {
    groups: Rc<RefCell<Vec<(Category, Vec<String>)>>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// All groups captured so far, in formation order
    pub fn groups(&self) -> Vec<(Category, Vec<String>)> {
        self.groups.borrow().clone()
    }

    pub fn group_count(&self) -> usize {
        self.groups.borrow().len()
    }

    /// Every id reported in any group, in order
    pub fn matched_ids(&self) -> Vec<String> {
        self.groups
            .borrow()
            .iter()
            .flat_map(|(_, ids)| ids.iter().cloned())
            .collect()
    }
}

impl MatchHandler<String> for RecordingHandler {
    fn on_match(&mut self, category: Category, ids: Vec<String>) {
        self.groups.borrow_mut().push((category, ids));
    }
}

/// Engine wired to a manual clock and a recording handler
pub struct TestSystem {
    pub engine: MatchmakingEngine<String>,
    pub clock: ManualClock,
    pub handler: RecordingHandler,
    /// Ratings of everyone ever admitted, for ordering checks
    pub ratings: HashMap<String, Rating>,
}

impl TestSystem {
    pub fn new(config: EngineConfig) -> Self {
        let clock = ManualClock::starting_now();
        let handler = RecordingHandler::new();
        let engine = MatchmakingEngine::with_clock(config, handler.clone(), Arc::new(clock.clone()))
            .expect("test engine config should be valid");

        Self {
            engine,
            clock,
            handler,
            ratings: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(EngineConfig::default())
    }

    /// Admit a participant and remember its rating
    pub fn admit(&mut self, id: &str, rating: Rating, category: Category, group_size: u32) -> u64 {
        let estimate = self
            .engine
            .admit(id.to_string(), Preference::new(rating, category, group_size))
            .unwrap_or_else(|e| panic!("admission of {} failed: {}", id, e));
        self.ratings.insert(id.to_string(), rating);
        estimate
    }

    /// Advance time and run one tick
    pub fn advance_and_tick(&mut self, seconds: i64) {
        self.clock.advance_secs(seconds);
        self.engine.tick();
    }

    /// Assert every formed group is sorted by ascending rating
    pub fn assert_groups_rating_ordered(&self) {
        for (_, ids) in self.handler.groups() {
            let ratings: Vec<Rating> = ids.iter().map(|id| self.ratings[id]).collect();
            assert!(
                ratings.windows(2).all(|pair| pair[0] <= pair[1]),
                "group {:?} not ordered by rating: {:?}",
                ids,
                ratings
            );
        }
    }
}
