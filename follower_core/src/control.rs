//! The line-following control loop (`ControlLoop`).
//!
//! Each call to [`ControlLoop::step`] performs one iteration: sense, widen
//! the calibration bounds, classify, command the motors and append telemetry.
//! [`crate::runner::run`] drives `step` until shutdown.

use std::sync::Arc;
use std::time::Duration;

use follower_traits::DeviceLink;
use follower_traits::clock::{Clock, MonotonicClock};

use crate::calibration::CalibrationBounds;
use crate::error::Result;
use crate::params::ControlParams;
use crate::proxy::HardwareProxy;
use crate::status::LoopStatus;
use crate::steering::{Classification, Thresholds, TurnBias, classify, pivot, steer};
use crate::telemetry::TelemetryRecord;
use crate::types::{MotorState, Side};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopCfg {
    pub thresholds: Thresholds,
    /// Pause after each idle iteration so a disengaged robot does not flood the link.
    pub idle_pause: Duration,
}

impl Default for LoopCfg {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            idle_pause: Duration::from_millis(10),
        }
    }
}

pub struct ControlLoop<L: DeviceLink> {
    proxy: HardwareProxy<L>,
    params: Arc<ControlParams>,
    bounds: CalibrationBounds,
    bias: TurnBias,
    cfg: LoopCfg,
    clock: Arc<dyn Clock + Send + Sync>,
    records: Vec<TelemetryRecord>,
}

impl<L: DeviceLink> core::fmt::Debug for ControlLoop<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ControlLoop")
            .field("bounds", &self.bounds)
            .field("bias", &self.bias)
            .field("records", &self.records.len())
            .finish_non_exhaustive()
    }
}

impl<L: DeviceLink> ControlLoop<L> {
    pub fn new(
        proxy: HardwareProxy<L>,
        params: Arc<ControlParams>,
        bounds: CalibrationBounds,
        cfg: LoopCfg,
    ) -> Self {
        Self {
            proxy,
            params,
            bounds,
            bias: TurnBias::default(),
            cfg,
            clock: Arc::new(MonotonicClock::new()),
            records: Vec::new(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    pub fn params(&self) -> &Arc<ControlParams> {
        &self.params
    }

    /// Current bounds, including any widening done while driving.
    pub fn bounds(&self) -> CalibrationBounds {
        self.bounds
    }

    pub fn last_turn(&self) -> TurnBias {
        self.bias
    }

    pub fn records(&self) -> &[TelemetryRecord] {
        &self.records
    }

    /// Hand over the accumulated records, leaving the buffer empty.
    pub fn take_records(&mut self) -> Vec<TelemetryRecord> {
        std::mem::take(&mut self.records)
    }

    pub fn proxy(&self) -> &HardwareProxy<L> {
        &self.proxy
    }

    pub fn proxy_mut(&mut self) -> &mut HardwareProxy<L> {
        &mut self.proxy
    }

    /// De-energize both motors.
    pub fn release(&mut self) -> Result<()> {
        self.proxy.release()
    }

    /// One iteration of the loop.
    pub fn step(&mut self) -> Result<LoopStatus> {
        if !self.params.is_engaged() {
            self.proxy.release()?;
            self.clock.sleep(self.cfg.idle_pause);
            return Ok(LoopStatus::Idle);
        }

        let left = self.proxy.read_sensor(Side::Left)?;
        let right = self.proxy.read_sensor(Side::Right)?;

        if self.bounds.widen(left, right) {
            tracing::debug!(
                left_min = self.bounds.left.min,
                left_max = self.bounds.left.max,
                right_min = self.bounds.right.min,
                right_max = self.bounds.right.max,
                "bounds widened"
            );
        }

        let class = classify(left, right, &self.cfg.thresholds);
        if class == Classification::PickedUp {
            self.proxy.release()?;
            tracing::debug!(left, right, "picked up, motors released");
            return Ok(LoopStatus::PickedUp);
        }
        self.proxy
            .set_states(MotorState::Forward, MotorState::Forward)?;

        // Parameters may change between iterations; within one, use a single view.
        let p = self.params.snapshot();
        let status = if class == Classification::LineLost {
            let turn = pivot(self.bias, p.base_speed);
            let speed = i32::from(turn.speed);
            self.proxy.set_speeds(speed, speed)?;
            self.proxy.set_states(turn.left_state, turn.right_state)?;
            tracing::trace!(left, right, bias = self.bias.as_flag(), "line lost, pivoting");
            LoopStatus::LineLost(TelemetryRecord {
                left_sensor: left,
                right_sensor: right,
                left_motor: turn.left_signed,
                right_motor: turn.right_signed,
            })
        } else {
            let s = steer(left, right, &self.bounds, &p);
            self.bias = s.bias;
            self.proxy
                .set_speeds(i32::from(s.left_speed), i32::from(s.right_speed))?;
            tracing::trace!(
                left,
                right,
                error = s.error,
                adjustment = s.adjustment,
                left_speed = s.left_speed,
                right_speed = s.right_speed,
                "tracking"
            );
            LoopStatus::Tracking(TelemetryRecord {
                left_sensor: left,
                right_sensor: right,
                left_motor: i32::from(s.left_speed),
                right_motor: i32::from(s.right_speed),
            })
        };

        if let Some(record) = status.record() {
            self.records.push(*record);
        }
        Ok(status)
    }
}
