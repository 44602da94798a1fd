//! `From` implementations bridging `follower_config` types to `follower_core` types.
//!
//! Config values are validated before conversion, so these are infallible.

use std::time::Duration;

use crate::calibration::{CalibrationBounds, CalibrationCfg, SensorBounds};
use crate::control::LoopCfg;
use crate::params::ParamSnapshot;
use crate::proxy::ReadPolicy;
use crate::steering::Thresholds;

// ── Control ──────────────────────────────────────────────────────────────────

impl From<&follower_config::ControlCfg> for ParamSnapshot {
    /// Starts disengaged; the operator engages from the console.
    fn from(c: &follower_config::ControlCfg) -> Self {
        Self {
            gain: c.gain,
            base_speed: c.base_speed,
            min_speed: c.min_speed,
            max_speed: c.max_speed,
            engaged: false,
        }
    }
}

impl From<&follower_config::ThresholdsCfg> for Thresholds {
    fn from(c: &follower_config::ThresholdsCfg) -> Self {
        Self {
            left: c.left,
            right: c.right,
            pickup: c.pickup,
        }
    }
}

impl From<&follower_config::Config> for LoopCfg {
    fn from(c: &follower_config::Config) -> Self {
        Self {
            thresholds: Thresholds::from(&c.thresholds),
            idle_pause: Duration::from_millis(c.runner.idle_pause_ms),
        }
    }
}

// ── Link ─────────────────────────────────────────────────────────────────────

impl From<&follower_config::LinkCfg> for ReadPolicy {
    fn from(c: &follower_config::LinkCfg) -> Self {
        Self {
            poll: Duration::from_millis(c.poll_ms.max(1)),
            deadline: (c.read_timeout_ms > 0).then_some(Duration::from_millis(c.read_timeout_ms)),
        }
    }
}

// ── Calibration ──────────────────────────────────────────────────────────────

impl From<&follower_config::BoundsCfg> for CalibrationBounds {
    fn from(c: &follower_config::BoundsCfg) -> Self {
        Self::new(
            SensorBounds::new(c.left_min, c.left_max),
            SensorBounds::new(c.right_min, c.right_max),
        )
    }
}

impl From<&CalibrationBounds> for follower_config::BoundsCfg {
    fn from(b: &CalibrationBounds) -> Self {
        Self {
            left_min: b.left.min,
            left_max: b.left.max,
            right_min: b.right.min,
            right_max: b.right.max,
        }
    }
}

impl From<&follower_config::CalibrationCfg> for CalibrationCfg {
    fn from(c: &follower_config::CalibrationCfg) -> Self {
        Self {
            spin_speed: c.spin_speed,
            checkpoint_every: c.checkpoint_every,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_maps_to_default_core_types() {
        let cfg = follower_config::Config::default();
        assert_eq!(CalibrationBounds::from(&cfg.bounds), CalibrationBounds::default());
        assert_eq!(ParamSnapshot::from(&cfg.control), ParamSnapshot::default());
        assert_eq!(LoopCfg::from(&cfg), LoopCfg::default());
        assert_eq!(ReadPolicy::from(&cfg.link), ReadPolicy::default());
        assert_eq!(CalibrationCfg::from(&cfg.calibration), CalibrationCfg::default());
    }

    #[test]
    fn nonzero_read_timeout_becomes_deadline() {
        let link = follower_config::LinkCfg {
            read_timeout_ms: 250,
            ..follower_config::LinkCfg::default()
        };
        assert_eq!(
            ReadPolicy::from(&link).deadline,
            Some(Duration::from_millis(250))
        );
    }

    #[test]
    fn bounds_round_trip_through_config_form() {
        let b = CalibrationBounds::new(SensorBounds::new(1, 2), SensorBounds::new(3, 4));
        let cfg = follower_config::BoundsCfg::from(&b);
        assert_eq!(CalibrationBounds::from(&cfg), b);
    }
}
