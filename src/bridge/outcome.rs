//! Per-iteration outcomes and running totals.

use crate::types::ScanRecord;
use chrono::{DateTime, Utc};
use std::fmt;

/// Why an iteration did not produce a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The serial device was unavailable or the read failed.
    DeviceFault,
    /// The frame could not be decoded or had too few tokens.
    MalformedFrame,
    /// The table rejected the row on an integrity constraint.
    Conflict,
    /// The database refused the insert for some other reason.
    Rejected,
    /// Every insert attempt hit a transient database fault.
    RetriesExhausted,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DeviceFault => write!(f, "device fault"),
            Self::MalformedFrame => write!(f, "malformed frame"),
            Self::Conflict => write!(f, "conflict"),
            Self::Rejected => write!(f, "rejected"),
            Self::RetriesExhausted => write!(f, "retries exhausted"),
        }
    }
}

/// Result of a single bridge iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// A frame was parsed and its row committed.
    Inserted(ScanRecord),
    /// The read timed out with no complete frame.
    Idle,
    /// The iteration ended without a row.
    Skipped(SkipReason),
}

impl StepOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Running totals for a bridge session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BridgeStats {
    pub iterations: u64,
    /// Lines read from the device, including undecodable or overlong ones.
    pub frames: u64,
    pub inserted: u64,
    pub idle: u64,
    pub device_faults: u64,
    pub malformed: u64,
    pub conflicts: u64,
    pub rejected: u64,
    pub retries_exhausted: u64,
    pub last_insert_at: Option<DateTime<Utc>>,
}

impl BridgeStats {
    /// Fold one outcome into the totals.
    pub fn record(&mut self, outcome: &StepOutcome) {
        self.iterations += 1;
        match outcome {
            StepOutcome::Inserted(record) => {
                self.inserted += 1;
                self.last_insert_at = Some(record.received_at);
            }
            StepOutcome::Idle => self.idle += 1,
            StepOutcome::Skipped(reason) => match reason {
                SkipReason::DeviceFault => self.device_faults += 1,
                SkipReason::MalformedFrame => self.malformed += 1,
                SkipReason::Conflict => self.conflicts += 1,
                SkipReason::Rejected => self.rejected += 1,
                SkipReason::RetriesExhausted => self.retries_exhausted += 1,
            },
        }
    }

    /// Get a short summary of the session.
    pub fn summary(&self) -> String {
        format!(
            "{} iterations, {} frames - {} inserted, {} conflicts, {} malformed, {} device faults, {} dropped",
            self.iterations,
            self.frames,
            self.inserted,
            self.conflicts,
            self.malformed,
            self.device_faults,
            self.rejected + self.retries_exhausted
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AllowFlag, MemberId};

    #[test]
    fn test_stats_record() {
        let mut stats = BridgeStats::default();
        let record = ScanRecord::new(MemberId::new("42"), AllowFlag::new("1"));

        stats.record(&StepOutcome::Inserted(record.clone()));
        stats.record(&StepOutcome::Idle);
        stats.record(&StepOutcome::Skipped(SkipReason::Conflict));
        stats.record(&StepOutcome::Skipped(SkipReason::Rejected));

        assert_eq!(stats.iterations, 4);
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.conflicts, 1);
        assert_eq!(stats.last_insert_at, Some(record.received_at));
    }

    #[test]
    fn test_summary() {
        let mut stats = BridgeStats::default();
        stats.record(&StepOutcome::Skipped(SkipReason::RetriesExhausted));
        assert_eq!(
            stats.summary(),
            "1 iterations, 0 frames - 0 inserted, 0 conflicts, 0 malformed, 0 device faults, 1 dropped"
        );
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::DeviceFault.to_string(), "device fault");
        assert_eq!(SkipReason::RetriesExhausted.to_string(), "retries exhausted");
    }
}
