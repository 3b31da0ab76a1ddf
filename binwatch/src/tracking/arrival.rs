//! De-duplication of region fires across polls.

/// Turns per-poll fire results into distinct bin arrivals.
///
/// A region that keeps firing on consecutive polls (a hand lingering over
/// the bin, a lid swinging) is one arrival. A poll where nothing fires ends
/// the arrival, so the same bin can receive the next item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinArrivalTracker {
    last: Option<usize>,
}

impl BinArrivalTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record this poll's fired region. Returns `true` if it is a new arrival.
    pub fn observe(&mut self, fired: Option<usize>) -> bool {
        let is_new = fired.is_some() && fired != self.last;
        self.last = fired;
        is_new
    }

    /// Forget the previous poll.
    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<usize> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_reference_sequence() {
        let mut tracker = BinArrivalTracker::new();
        let observed: Vec<bool> = [Some(1), Some(1), Some(1), Some(2), Some(2), None, Some(2)]
            .into_iter()
            .map(|fired| tracker.observe(fired))
            .collect();

        assert_eq!(observed, vec![true, false, false, true, false, false, true]);
    }

    #[test]
    fn test_reset_allows_same_region_again() {
        let mut tracker = BinArrivalTracker::new();
        assert!(tracker.observe(Some(0)));
        assert!(!tracker.observe(Some(0)));

        tracker.reset();
        assert_eq!(tracker.last(), None);
        assert!(tracker.observe(Some(0)));
    }

    #[test]
    fn test_none_is_never_an_arrival() {
        let mut tracker = BinArrivalTracker::new();
        assert!(!tracker.observe(None));
        assert!(!tracker.observe(None));
    }

    proptest! {
        #[test]
        fn prop_arrivals_match_run_starts(seq in prop::collection::vec(prop::option::of(0usize..4), 0..64)) {
            let mut tracker = BinArrivalTracker::new();
            let mut previous = None;
            for fired in seq {
                let expected = fired.is_some() && fired != previous;
                prop_assert_eq!(tracker.observe(fired), expected);
                previous = fired;
            }
        }
    }
}
