use serde::{Deserialize, Serialize};

use super::{CounterDelta, TransitionError};

/// Represents the cached aggregate counters stored on a votable.
///
/// These are derived from the votes table and only ever change through
/// [`VotableCounters::apply`], which keeps `score == ups - downs`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VotableCounters {
    pub ups: i64,
    pub downs: i64,
    pub score: i64,
}

impl VotableCounters {
    /// Builds counters from up and down totals, deriving the score.
    pub fn from_totals(ups: i64, downs: i64) -> Self {
        Self { ups, downs, score: ups - downs }
    }

    /// Checks the invariants every stored votable must satisfy.
    pub fn validate(&self) -> Result<(), TransitionError> {
        if self.ups < 0 || self.downs < 0 {
            return Err(TransitionError::NegativeCounter { ups: self.ups, downs: self.downs });
        }
        if self.score != self.ups - self.downs {
            return Err(TransitionError::InconsistentScore {
                ups: self.ups,
                downs: self.downs,
                score: self.score,
            });
        }
        Ok(())
    }

    /// Computes the counters that result from applying `delta`.
    ///
    /// Fails when the current counters are already inconsistent or when the
    /// result would drive a total below zero.
    pub fn apply(&self, delta: CounterDelta) -> Result<Self, TransitionError> {
        self.validate()?;

        let ups = self.ups.checked_add(delta.ups).ok_or(TransitionError::CounterOverflow)?;
        let downs = self.downs.checked_add(delta.downs).ok_or(TransitionError::CounterOverflow)?;
        let score = self.score.checked_add(delta.score).ok_or(TransitionError::CounterOverflow)?;

        let next = Self { ups, downs, score };
        next.validate()?;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_keeps_score_consistent() {
        let counters = VotableCounters::from_totals(3, 1);
        let next = counters.apply(CounterDelta { ups: -1, downs: 1, score: -2 }).unwrap();
        assert_eq!(next, VotableCounters { ups: 2, downs: 2, score: 0 });
    }

    #[test]
    fn test_apply_refuses_negative_totals() {
        let counters = VotableCounters::default();
        let result = counters.apply(CounterDelta { ups: -1, downs: 0, score: -1 });
        assert_eq!(result, Err(TransitionError::NegativeCounter { ups: -1, downs: 0 }));
    }

    #[test]
    fn test_apply_refuses_already_inconsistent_counters() {
        let counters = VotableCounters { ups: 2, downs: 0, score: 5 };
        let result = counters.apply(CounterDelta { ups: 1, downs: 0, score: 1 });
        assert!(matches!(result, Err(TransitionError::InconsistentScore { .. })));
    }
}
