//! The sequence of encoder qualities the convergence loop tries.
//!
//! The schedule is geometric and monotonically non-increasing, so the loop
//! can never oscillate. It is bounded by the attempt budget and also ends
//! early once the quality floor is reached, since repeating an identical
//! encode cannot change the result.

/// Multiplier applied to the quality after each unsatisfied attempt.
pub const QUALITY_STEP: f64 = 0.8;

/// Lowest quality the schedule steps down to on its own.
pub const MIN_QUALITY: f64 = 0.05;

/// Bounded iterator over decreasing quality factors.
#[derive(Debug, Clone)]
pub struct QualitySchedule {
    next: f64,
    remaining: u32,
}

impl QualitySchedule {
    /// A schedule starting at `initial` with at most `attempts` entries.
    pub fn new(initial: f64, attempts: u32) -> Self {
        Self {
            next: initial,
            remaining: attempts,
        }
    }
}

impl Iterator for QualitySchedule {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let current = self.next;
        let following = (current * QUALITY_STEP).max(MIN_QUALITY.min(current));
        if following >= current {
            self.remaining = 0;
        }
        self.next = following;
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let upper = self.remaining as usize;
        (upper.min(1), Some(upper))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: Quality never increases along the schedule.
        #[test]
        fn prop_schedule_monotonic(initial in 0.0f64..=1.0, attempts in 0u32..=50) {
            let qualities: Vec<f64> = QualitySchedule::new(initial, attempts).collect();
            for pair in qualities.windows(2) {
                prop_assert!(pair[1] < pair[0]);
            }
        }

        /// Property: The schedule never exceeds its budget.
        #[test]
        fn prop_schedule_bounded(initial in 0.0f64..=1.0, attempts in 0u32..=50) {
            prop_assert!(QualitySchedule::new(initial, attempts).count() <= attempts as usize);
        }

        /// Property: A non-empty budget always yields the initial quality first.
        #[test]
        fn prop_schedule_starts_at_initial(initial in 0.0f64..=1.0, attempts in 1u32..=50) {
            prop_assert_eq!(QualitySchedule::new(initial, attempts).next(), Some(initial));
        }
    }
}
