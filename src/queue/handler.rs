//! Match notification
//!
//! The engine reports each formed group to a single registered handler, invoked
//! synchronously from `tick`. Handlers must not call back into the engine.

use crate::types::Category;

/// Receives every group the engine forms
pub trait MatchHandler<Id> {
    /// `ids` are ordered by ascending rating and have exactly the bucket's group size
    fn on_match(&mut self, category: Category, ids: Vec<Id>);
}

impl<Id, F> MatchHandler<Id> for F
where
    F: FnMut(Category, Vec<Id>),
{
    fn on_match(&mut self, category: Category, ids: Vec<Id>) {
        self(category, ids)
    }
}

/// Handler that drops every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl<Id> MatchHandler<Id> for NoopHandler {
    fn on_match(&mut self, _category: Category, _ids: Vec<Id>) {}
}
