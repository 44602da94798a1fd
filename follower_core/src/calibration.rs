//! Sensor calibration bounds and the spin-in-place routine that discovers them.

use follower_traits::DeviceLink;

use crate::error::Result;
use crate::proxy::HardwareProxy;
use crate::types::{MotorState, Side};

/// Observed reflectance range of one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorBounds {
    pub min: i32,
    pub max: i32,
}

impl SensorBounds {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Bounds that contain exactly one reading.
    pub const fn at(reading: i32) -> Self {
        Self {
            min: reading,
            max: reading,
        }
    }

    /// Grow the range to include `reading`. Only strictly smaller or larger
    /// values move an edge. Returns whether anything changed.
    pub fn widen(&mut self, reading: i32) -> bool {
        if reading < self.min {
            self.min = reading;
            true
        } else if reading > self.max {
            self.max = reading;
            true
        } else {
            false
        }
    }
}

/// Per-side bounds used to normalize readings in the steering law.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationBounds {
    pub left: SensorBounds,
    pub right: SensorBounds,
}

impl Default for CalibrationBounds {
    /// Bounds measured on the reference track.
    fn default() -> Self {
        Self {
            left: SensorBounds::new(70, 432),
            right: SensorBounds::new(59, 430),
        }
    }
}

impl CalibrationBounds {
    pub const fn new(left: SensorBounds, right: SensorBounds) -> Self {
        Self { left, right }
    }

    /// Widen both sides with one pair of readings.
    pub fn widen(&mut self, left: i32, right: i32) -> bool {
        let l = self.left.widen(left);
        let r = self.right.widen(right);
        l || r
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationCfg {
    /// Speed used on both motors while spinning in place.
    pub spin_speed: u8,
    /// Readings between operator checkpoints.
    pub checkpoint_every: usize,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            spin_speed: 25,
            checkpoint_every: 50,
        }
    }
}

/// Progress shown to the operator at each checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub readings: usize,
    pub bounds: CalibrationBounds,
}

/// Spin clockwise while sampling both sensors and track the extremes.
///
/// Every `checkpoint_every` readings both motors are released and
/// `keep_going` is asked whether to continue. The bounds seen so far are
/// returned as soon as it answers `false`. Shutdown (via the proxy's cancel
/// flag) surfaces as `FollowerError::Cancelled`. On any error both motors are
/// released before it is returned.
pub fn calibrate<L, F>(
    proxy: &mut HardwareProxy<L>,
    cfg: &CalibrationCfg,
    keep_going: F,
) -> Result<CalibrationBounds>
where
    L: DeviceLink,
    F: FnMut(&Checkpoint) -> bool,
{
    let every = cfg.checkpoint_every.max(1);
    let speed = i32::from(cfg.spin_speed);
    tracing::info!(spin_speed = speed, every, "calibration start");

    let outcome = sweep(proxy, speed, every, keep_going);
    if let Err(e) = &outcome {
        tracing::warn!(error = %e, "calibration aborted");
        if let Err(release) = proxy.release() {
            tracing::warn!(error = %release, "release after aborted calibration failed");
        }
    }
    outcome
}

fn sweep<L, F>(
    proxy: &mut HardwareProxy<L>,
    speed: i32,
    every: usize,
    mut keep_going: F,
) -> Result<CalibrationBounds>
where
    L: DeviceLink,
    F: FnMut(&Checkpoint) -> bool,
{
    spin(proxy, speed)?;
    let mut bounds: Option<CalibrationBounds> = None;
    let mut readings = 0usize;
    loop {
        // Re-issued every pass in case the controller dropped a command.
        spin(proxy, speed)?;
        let left = proxy.read_sensor(Side::Left)?;
        let right = proxy.read_sensor(Side::Right)?;
        match bounds.as_mut() {
            Some(b) => {
                b.widen(left, right);
            }
            None => {
                bounds = Some(CalibrationBounds::new(
                    SensorBounds::at(left),
                    SensorBounds::at(right),
                ));
            }
        }
        readings += 1;

        if readings % every == 0
            && let Some(current) = bounds
        {
            proxy.release()?;
            tracing::info!(
                readings,
                left_min = current.left.min,
                left_max = current.left.max,
                right_min = current.right.min,
                right_max = current.right.max,
                "calibration checkpoint"
            );
            let checkpoint = Checkpoint {
                readings,
                bounds: current,
            };
            if !keep_going(&checkpoint) {
                tracing::info!(readings, "calibration finished");
                return Ok(current);
            }
        }
    }
}

fn spin<L: DeviceLink>(proxy: &mut HardwareProxy<L>, speed: i32) -> Result<()> {
    proxy.set_speeds(speed, speed)?;
    proxy.set_states(MotorState::Forward, MotorState::Backward)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widen_is_strict() {
        let mut b = SensorBounds::new(10, 20);
        assert!(!b.widen(10));
        assert!(!b.widen(20));
        assert!(!b.widen(15));
        assert_eq!(b, SensorBounds::new(10, 20));
        assert!(b.widen(9));
        assert!(b.widen(21));
        assert_eq!(b, SensorBounds::new(9, 21));
    }

    #[test]
    fn default_bounds_are_reference_track() {
        let b = CalibrationBounds::default();
        assert_eq!(b.left, SensorBounds::new(70, 432));
        assert_eq!(b.right, SensorBounds::new(59, 430));
    }
}
