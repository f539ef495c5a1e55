use std::time::Duration;

use crate::engine::pressure::PressureSample;

/// Statistics of one completed interval.
/// Emitted at every interval boundary alongside the stored snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntervalReport {
    /// Zero-based index of the interval; also the snapshot index.
    pub interval: u64,
    /// Chains completed since the start of the run.
    pub chains: u64,
    /// Collisions since the start of the run.
    pub collisions: u64,
    pub pressure: PressureSample,
}

/// Totals of a finished run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub chains: u64,
    pub intervals: u64,
    pub collisions: u64,
    pub elapsed: Duration,
    /// Estimated collisions per hour.
    pub eph: f64,
    /// The final emitted interval, if any interval completed.
    pub last_interval: Option<IntervalReport>,
}

pub mod ecmc;
