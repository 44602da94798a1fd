use eyre::WrapErr;
use follower_traits::DeviceLink;

use crate::control::ControlLoop;
use crate::error::{FollowerError, Report};
use crate::status::LoopStatus;
use crate::telemetry::TelemetrySink;

/// Iteration counts for one run of the control loop.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub idle: u64,
    pub picked_up: u64,
    pub line_lost: u64,
    pub tracking: u64,
    /// Number of telemetry records handed to the sink.
    pub records: usize,
}

impl RunSummary {
    pub fn iterations(&self) -> u64 {
        self.idle + self.picked_up + self.line_lost + self.tracking
    }

    fn count(&mut self, status: &LoopStatus) {
        match status {
            LoopStatus::Idle => self.idle += 1,
            LoopStatus::PickedUp => self.picked_up += 1,
            LoopStatus::LineLost(_) => self.line_lost += 1,
            LoopStatus::Tracking(_) => self.tracking += 1,
        }
    }
}

/// Drive the loop until the shutdown flag is observed.
///
/// The flag is checked before every iteration, and a sensor read that is
/// cancelled by it also ends the run. Whatever ends the run, the records are
/// flushed to `sink` exactly once and both motors are released. Link errors
/// are returned after that flush.
pub fn run<L, S>(control: &mut ControlLoop<L>, sink: &mut S) -> eyre::Result<RunSummary>
where
    L: DeviceLink,
    S: TelemetrySink + ?Sized,
{
    tracing::info!("control loop start");
    let mut summary = RunSummary::default();

    let outcome = loop {
        if control.params().is_shutdown() {
            break Ok(());
        }
        match control.step() {
            Ok(status) => summary.count(&status),
            Err(FollowerError::Cancelled) => break Ok(()),
            Err(e) => {
                tracing::error!(error = %e, "control loop aborted");
                break Err(e);
            }
        }
    };

    let records = control.take_records();
    summary.records = records.len();
    let flushed = sink.flush(&records);
    if let Err(e) = &flushed {
        tracing::error!(error = %e, "telemetry flush failed");
    }

    if let Err(e) = control.release() {
        tracing::warn!(error = %e, "release on shutdown failed");
    }

    outcome.map_err(Report::new)?;
    flushed.wrap_err("flush telemetry")?;
    tracing::info!(
        iterations = summary.iterations(),
        tracking = summary.tracking,
        line_lost = summary.line_lost,
        picked_up = summary.picked_up,
        records = summary.records,
        "control loop stopped"
    );
    Ok(summary)
}
