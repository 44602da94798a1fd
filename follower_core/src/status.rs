//! Outcome of a single control-loop iteration.

use crate::telemetry::TelemetryRecord;

/// Mutually exclusive per-iteration states, re-evaluated from fresh readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// Engage flag off: motors released, nothing read.
    Idle,
    /// A sensor reads below the pickup level: motors released, nothing logged.
    PickedUp,
    /// Neither sensor sees the line: pivot toward the last correction.
    LineLost(TelemetryRecord),
    /// Proportional steering applied.
    Tracking(TelemetryRecord),
}

impl LoopStatus {
    pub fn record(&self) -> Option<&TelemetryRecord> {
        match self {
            LoopStatus::LineLost(r) | LoopStatus::Tracking(r) => Some(r),
            LoopStatus::Idle | LoopStatus::PickedUp => None,
        }
    }
}
