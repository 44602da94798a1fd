//! Pure decision functions of the control loop: state classification, the
//! line-lost pivot and the proportional steering law.
//!
//! Nothing here touches the link, so every rule can be checked with plain
//! numbers.

use crate::calibration::CalibrationBounds;
use crate::params::ParamSnapshot;
use crate::types::MotorState;

/// Raw reading below which the robot is assumed to be lifted off the floor.
pub const PICKUP_THRESHOLD: i32 = 5;

/// Per-side levels above which a sensor is considered off the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub left: i32,
    pub right: i32,
    pub pickup: i32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            left: 200,
            right: 200,
            pickup: PICKUP_THRESHOLD,
        }
    }
}

/// What one pair of raw readings says about the robot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A sensor sees almost no reflectance: wheels must stop.
    PickedUp,
    /// Neither sensor sees the line.
    LineLost,
    Tracking,
}

/// Decided from the current readings alone; no history, no hysteresis.
pub fn classify(left: i32, right: i32, th: &Thresholds) -> Classification {
    if left < th.pickup || right < th.pickup {
        Classification::PickedUp
    } else if left > th.left && right > th.right {
        Classification::LineLost
    } else {
        Classification::Tracking
    }
}

/// Direction of the most recent steering correction, remembered for recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnBias {
    /// Last error was positive. Encoded as `0` in telemetry tooling.
    #[default]
    Left,
    /// Last error was zero or negative. Encoded as `1`.
    Right,
}

impl TurnBias {
    pub const fn from_error(error: i32) -> Self {
        if error > 0 { TurnBias::Left } else { TurnBias::Right }
    }

    pub const fn as_flag(self) -> u8 {
        match self {
            TurnBias::Left => 0,
            TurnBias::Right => 1,
        }
    }
}

/// Motor commands for an in-place recovery turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pivot {
    pub left_state: MotorState,
    pub right_state: MotorState,
    pub speed: u8,
    /// Signed speeds for telemetry; negative marks the reversed wheel.
    pub left_signed: i32,
    pub right_signed: i32,
}

pub fn pivot(bias: TurnBias, base_speed: u8) -> Pivot {
    let s = i32::from(base_speed);
    match bias {
        TurnBias::Right => Pivot {
            left_state: MotorState::Forward,
            right_state: MotorState::Backward,
            speed: base_speed,
            left_signed: s,
            right_signed: -s,
        },
        TurnBias::Left => Pivot {
            left_state: MotorState::Backward,
            right_state: MotorState::Forward,
            speed: base_speed,
            left_signed: -s,
            right_signed: s,
        },
    }
}

/// Result of one proportional-control evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Steering {
    pub error: i32,
    pub adjustment: i32,
    pub left_speed: u8,
    pub right_speed: u8,
    pub bias: TurnBias,
}

/// Proportional steering law.
///
/// Both readings are offset by the *left* sensor's minimum; the right
/// sensor's own minimum is not used.
pub fn steer(left: i32, right: i32, bounds: &CalibrationBounds, p: &ParamSnapshot) -> Steering {
    let offset = bounds.left.min;
    let norm_left = left.saturating_sub(offset);
    let norm_right = right.saturating_sub(offset);
    let error = norm_right.saturating_sub(norm_left);
    let adjustment = scale_error(error, p.gain);
    let base = i32::from(p.base_speed);
    Steering {
        error,
        adjustment,
        left_speed: clamp_speed(base.saturating_sub(adjustment), p.min_speed, p.max_speed),
        right_speed: clamp_speed(base.saturating_add(adjustment), p.min_speed, p.max_speed),
        bias: TurnBias::from_error(error),
    }
}

/// `round(error * gain)` with ties to even, so `2.5` gives 2 and `-2.5`
/// gives -2. A non-finite product contributes no correction.
#[inline]
fn scale_error(error: i32, gain: f64) -> i32 {
    let v = (f64::from(error) * gain).round_ties_even();
    if v.is_finite() {
        // `as` saturates at the i32 range.
        v as i32
    } else {
        0
    }
}

/// Cap at `max`, then floor at `min`. When `min > max`, `min` wins.
#[inline]
pub fn clamp_speed(speed: i32, min: u8, max: u8) -> u8 {
    let capped = speed.min(i32::from(max));
    let floored = capped.max(i32::from(min));
    // min and max are u8, so the result is in 0..=255.
    u8::try_from(floored).unwrap_or(max)
}
