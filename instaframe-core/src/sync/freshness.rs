//! Freshness record
//!
//! The display's memory of the newest artifact it has consumed, as remote
//! modification time in seconds since the epoch. The record starts at a
//! sentinel of zero so the first remote artifact is always accepted, and it
//! never moves backwards.

/// Sentinel for "nothing consumed yet"
pub const SENTINEL: f64 = 0.0;

/// Decision for one remote probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Verdict {
    /// Mailbox slot is empty
    NoArtifact,
    /// Remote artifact is at least as new as the record; consume it
    Fresh(f64),
    /// Remote artifact is older than the record; leave it alone
    Stale {
        /// Remote modification time
        remote: f64,
        /// Current record
        record: f64,
    },
}

/// Last consumed remote timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FreshnessRecord {
    last_consumed: f64,
}

impl Default for FreshnessRecord {
    fn default() -> Self {
        Self::new()
    }
}

impl FreshnessRecord {
    /// Create a record at the sentinel
    pub const fn new() -> Self {
        Self {
            last_consumed: SENTINEL,
        }
    }

    /// Restore a persisted record
    ///
    /// Non-finite or negative values fall back to the sentinel.
    pub fn from_timestamp(timestamp: f64) -> Self {
        if timestamp.is_finite() && timestamp >= SENTINEL {
            Self {
                last_consumed: timestamp,
            }
        } else {
            Self::new()
        }
    }

    /// Get the last consumed timestamp
    pub fn last_consumed(&self) -> f64 {
        self.last_consumed
    }

    /// Check if a remote artifact should be consumed
    pub fn accepts(&self, remote: f64) -> bool {
        remote >= self.last_consumed
    }

    /// Classify the result of a remote probe
    pub fn judge(&self, remote: Option<f64>) -> Verdict {
        match remote {
            None => Verdict::NoArtifact,
            Some(remote) if self.accepts(remote) => Verdict::Fresh(remote),
            Some(remote) => Verdict::Stale {
                remote,
                record: self.last_consumed,
            },
        }
    }

    /// Record a consumed artifact
    ///
    /// Returns true if the record moved. Older timestamps are ignored.
    pub fn advance(&mut self, consumed: f64) -> bool {
        if consumed > self.last_consumed {
            self.last_consumed = consumed;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sentinel_accepts_first_artifact() {
        let record = FreshnessRecord::new();
        assert_eq!(record.last_consumed(), 0.0);
        assert_eq!(record.judge(Some(1.0)), Verdict::Fresh(1.0));
    }

    #[test]
    fn test_equal_timestamp_is_fresh() {
        let record = FreshnessRecord::from_timestamp(100.0);
        assert_eq!(record.judge(Some(100.0)), Verdict::Fresh(100.0));
    }

    #[test]
    fn test_older_is_stale() {
        let record = FreshnessRecord::from_timestamp(100.0);
        assert_eq!(
            record.judge(Some(50.0)),
            Verdict::Stale {
                remote: 50.0,
                record: 100.0
            }
        );
    }

    #[test]
    fn test_empty_slot() {
        let record = FreshnessRecord::from_timestamp(100.0);
        assert_eq!(record.judge(None), Verdict::NoArtifact);
    }

    #[test]
    fn test_advance_never_regresses() {
        let mut record = FreshnessRecord::new();
        assert!(record.advance(100.0));
        assert!(!record.advance(50.0));
        assert_eq!(record.last_consumed(), 100.0);
    }

    #[test]
    fn test_invalid_persisted_value_resets() {
        assert_eq!(FreshnessRecord::from_timestamp(f64::NAN), FreshnessRecord::new());
        assert_eq!(FreshnessRecord::from_timestamp(-3.0), FreshnessRecord::new());
    }

    proptest! {
        #[test]
        fn prop_consumed_sequence_is_monotonic(
            start in 0.0f64..1e9,
            remotes in prop::collection::vec(0.0f64..2e9, 1..64),
        ) {
            let mut record = FreshnessRecord::from_timestamp(start);
            let mut consumed = Vec::new();

            for remote in remotes {
                let before = record.last_consumed();
                match record.judge(Some(remote)) {
                    Verdict::Fresh(ts) => {
                        prop_assert!(ts >= before);
                        consumed.push(ts);
                        record.advance(ts);
                    }
                    Verdict::Stale { remote, record: r } => {
                        prop_assert!(remote < r);
                    }
                    Verdict::NoArtifact => unreachable!(),
                }
                prop_assert!(record.last_consumed() >= before);
            }

            prop_assert!(consumed.windows(2).all(|w| w[0] <= w[1]));
        }
    }
}
