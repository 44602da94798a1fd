//! Live-tunable control parameters shared by the control loop and the console.
//!
//! Every field is its own atomic: a reader can never observe half a write, but
//! two fields read back to back may come from different operator edits. The
//! loop tolerates that; it snapshots once per iteration and acts on whatever
//! it saw.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

use crate::error::Result;
use crate::types::validate_speed;

/// Plain copy of the parameter values at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub gain: f64,
    pub base_speed: u8,
    pub min_speed: u8,
    pub max_speed: u8,
    pub engaged: bool,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            gain: 0.1,
            base_speed: 45,
            min_speed: 25,
            max_speed: 70,
            engaged: false,
        }
    }
}

#[derive(Debug)]
pub struct ControlParams {
    gain_bits: AtomicU64,
    base_speed: AtomicU8,
    min_speed: AtomicU8,
    max_speed: AtomicU8,
    engaged: AtomicBool,
    shutdown: Arc<AtomicBool>,
}

impl Default for ControlParams {
    fn default() -> Self {
        Self::from_snapshot(ParamSnapshot::default())
    }
}

impl ControlParams {
    /// Build from initial values. Speeds arrive as `u8`, so only the 255 case
    /// can still be out of range; it is clamped to 254.
    pub fn from_snapshot(init: ParamSnapshot) -> Self {
        let cap = |v: u8| v.min(254);
        Self {
            gain_bits: AtomicU64::new(init.gain.to_bits()),
            base_speed: AtomicU8::new(cap(init.base_speed)),
            min_speed: AtomicU8::new(cap(init.min_speed)),
            max_speed: AtomicU8::new(cap(init.max_speed)),
            engaged: AtomicBool::new(init.engaged),
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Convenience for handing the same parameters to several threads.
    pub fn shared(init: ParamSnapshot) -> Arc<Self> {
        Arc::new(Self::from_snapshot(init))
    }

    pub fn gain(&self) -> f64 {
        f64::from_bits(self.gain_bits.load(Ordering::Relaxed))
    }

    /// Any float is accepted, including negative gains.
    pub fn set_gain(&self, gain: f64) {
        self.gain_bits.store(gain.to_bits(), Ordering::Relaxed);
    }

    pub fn base_speed(&self) -> u8 {
        self.base_speed.load(Ordering::Relaxed)
    }

    pub fn set_base_speed(&self, speed: i32) -> Result<()> {
        let v = validate_speed(speed)?;
        self.base_speed.store(v, Ordering::Relaxed);
        Ok(())
    }

    pub fn min_speed(&self) -> u8 {
        self.min_speed.load(Ordering::Relaxed)
    }

    pub fn set_min_speed(&self, speed: i32) -> Result<()> {
        let v = validate_speed(speed)?;
        self.min_speed.store(v, Ordering::Relaxed);
        Ok(())
    }

    pub fn max_speed(&self) -> u8 {
        self.max_speed.load(Ordering::Relaxed)
    }

    pub fn set_max_speed(&self, speed: i32) -> Result<()> {
        let v = validate_speed(speed)?;
        self.max_speed.store(v, Ordering::Relaxed);
        Ok(())
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged.load(Ordering::Relaxed)
    }

    pub fn set_engaged(&self, on: bool) {
        self.engaged.store(on, Ordering::Relaxed);
    }

    /// Flip the engage flag and return the new value.
    pub fn toggle_engaged(&self) -> bool {
        !self.engaged.fetch_xor(true, Ordering::Relaxed)
    }

    /// One-way: once set, the control loop finishes its current iteration and exits.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// The raw shutdown flag, for cancelling blocking reads and for signal handlers.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            gain: self.gain(),
            base_speed: self.base_speed(),
            min_speed: self.min_speed(),
            max_speed: self.max_speed(),
            engaged: self.is_engaged(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_values() {
        let p = ControlParams::default();
        let s = p.snapshot();
        assert!((s.gain - 0.1).abs() < f64::EPSILON);
        assert_eq!((s.base_speed, s.min_speed, s.max_speed), (45, 25, 70));
        assert!(!s.engaged);
        assert!(!p.is_shutdown());
    }

    #[test]
    fn rejected_speed_leaves_field_untouched() {
        let p = ControlParams::default();
        assert!(p.set_base_speed(255).is_err());
        assert!(p.set_min_speed(-3).is_err());
        assert_eq!(p.base_speed(), 45);
        assert_eq!(p.min_speed(), 25);
        p.set_max_speed(254).unwrap();
        assert_eq!(p.max_speed(), 254);
    }

    #[test]
    fn toggle_reports_new_value() {
        let p = ControlParams::default();
        assert!(p.toggle_engaged());
        assert!(p.is_engaged());
        assert!(!p.toggle_engaged());
    }

    #[test]
    fn gain_round_trips_through_bits() {
        let p = ControlParams::default();
        p.set_gain(-2.75);
        assert_eq!(p.gain(), -2.75);
    }

    #[test]
    fn shutdown_flag_is_shared() {
        let p = ControlParams::default();
        let flag = p.shutdown_flag();
        p.request_shutdown();
        assert!(flag.load(Ordering::Relaxed));
    }
}
