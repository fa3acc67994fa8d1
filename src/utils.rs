//! Utility functions for the matchmaking queue

use crate::types::GroupSize;
use chrono::{DateTime, Utc};

/// Get the current UTC timestamp
pub fn current_timestamp() -> DateTime<Utc> {
    Utc::now()
}

/// Whole seconds elapsed between two timestamps, never negative
pub fn elapsed_seconds(since: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    now.signed_duration_since(since).num_seconds().max(0) as u64
}

/// Check that a group size is a non-zero power of two
pub fn is_power_of_two(value: u32) -> bool {
    value != 0 && value & (value - 1) == 0
}

/// Group sizes a participant passes through while widening, starting at `start`
///
/// Each step halves the size; the chain stops once the size is at or below `floor`.
/// The starting size is always yielded, even if it is already below `floor`.
pub fn widening_chain(start: GroupSize, floor: GroupSize) -> impl Iterator<Item = GroupSize> {
    std::iter::successors(Some(start), move |&size| {
        if size > floor && size > 1 {
            Some(size / 2)
        } else {
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_is_power_of_two() {
        for value in [1, 2, 4, 8, 16, 32, 1024] {
            assert!(is_power_of_two(value), "{} should be a power of two", value);
        }
        for value in [0, 3, 5, 6, 12, 33] {
            assert!(!is_power_of_two(value), "{} is not a power of two", value);
        }
    }

    #[test]
    fn test_widening_chain() {
        assert_eq!(widening_chain(32, 2).collect::<Vec<_>>(), vec![32, 16, 8, 4, 2]);
        assert_eq!(widening_chain(4, 2).collect::<Vec<_>>(), vec![4, 2]);
        assert_eq!(widening_chain(2, 2).collect::<Vec<_>>(), vec![2]);
        assert_eq!(widening_chain(1, 2).collect::<Vec<_>>(), vec![1]);
        assert_eq!(widening_chain(8, 1).collect::<Vec<_>>(), vec![8, 4, 2, 1]);
    }

    #[test]
    fn test_elapsed_seconds() {
        let start = current_timestamp();
        assert_eq!(elapsed_seconds(start, start + Duration::milliseconds(5999)), 5);
        assert_eq!(elapsed_seconds(start, start + Duration::seconds(6)), 6);
        assert_eq!(elapsed_seconds(start + Duration::seconds(3), start), 0);
    }
}
