//! Validated command surface over a [`DeviceLink`].
//!
//! The proxy is the only writer of motor commands. It rejects bad arguments
//! before anything reaches the link, remembers the last accepted speed and
//! state per side, and implements the request/response sensor read.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use follower_traits::DeviceLink;
use follower_traits::clock::{Clock, MonotonicClock};

use crate::error::{FollowerError, Result};
use crate::hw_error::map_link_error;
use crate::protocol::{Command, parse_sensor_response};
use crate::types::{MotorState, Side, validate_speed};

/// How long a sensor read may wait, and how often it wakes to check for shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadPolicy {
    /// Per-poll wait handed to `DeviceLink::read_line`.
    pub poll: Duration,
    /// Overall limit for one sensor read. `None` waits until a reply or cancellation.
    pub deadline: Option<Duration>,
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self {
            poll: Duration::from_millis(20),
            deadline: None,
        }
    }
}

pub struct HardwareProxy<L: DeviceLink> {
    link: L,
    speeds: [u8; 2],
    states: [MotorState; 2],
    policy: ReadPolicy,
    cancel: Option<Arc<AtomicBool>>,
    clock: Arc<dyn Clock + Send + Sync>,
}

impl<L: DeviceLink> core::fmt::Debug for HardwareProxy<L> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("HardwareProxy")
            .field("speeds", &self.speeds)
            .field("states", &self.states)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<L: DeviceLink> HardwareProxy<L> {
    /// Wrap a link. Cached state starts at speed 0 / `Release` on both sides.
    pub fn new(link: L) -> Self {
        Self {
            link,
            speeds: [0; 2],
            states: [MotorState::Release; 2],
            policy: ReadPolicy::default(),
            cancel: None,
            clock: Arc::new(MonotonicClock::new()),
        }
    }

    pub fn with_policy(mut self, policy: ReadPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Abort pending sensor reads once `flag` becomes true.
    pub fn with_cancel(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock + Send + Sync>) -> Self {
        self.clock = clock;
        self
    }

    /// Last speed accepted for `side`.
    pub fn speed(&self, side: Side) -> u8 {
        self.speeds[side.index()]
    }

    /// Last state accepted for `side`.
    pub fn state(&self, side: Side) -> MotorState {
        self.states[side.index()]
    }

    /// Command a speed magnitude in `[0, 255)`.
    pub fn set_speed(&mut self, side: Side, speed: i32) -> Result<()> {
        let speed = validate_speed(speed)?;
        self.send(Command::SetSpeed { side, speed })?;
        self.speeds[side.index()] = speed;
        Ok(())
    }

    pub fn set_state(&mut self, side: Side, state: MotorState) -> Result<()> {
        self.send(Command::SetState { side, state })?;
        self.states[side.index()] = state;
        Ok(())
    }

    /// Same as [`set_speed`](Self::set_speed) with the side given by name.
    pub fn set_speed_str(&mut self, side: &str, speed: i32) -> Result<()> {
        let side: Side = side.parse()?;
        self.set_speed(side, speed)
    }

    /// Same as [`set_state`](Self::set_state) with side and state given by name.
    pub fn set_state_str(&mut self, side: &str, state: &str) -> Result<()> {
        let side: Side = side.parse()?;
        let state: MotorState = state.parse()?;
        self.set_state(side, state)
    }

    pub fn read_sensor_str(&mut self, side: &str) -> Result<i32> {
        let side: Side = side.parse()?;
        self.read_sensor(side)
    }

    /// Apply `state` to the left motor, then the right one.
    pub fn set_states(&mut self, left: MotorState, right: MotorState) -> Result<()> {
        self.set_state(Side::Left, left)?;
        self.set_state(Side::Right, right)
    }

    pub fn set_speeds(&mut self, left: i32, right: i32) -> Result<()> {
        // Validate both first so a bad right speed never leaves the left one applied.
        validate_speed(left)?;
        validate_speed(right)?;
        self.set_speed(Side::Left, left)?;
        self.set_speed(Side::Right, right)
    }

    pub fn release(&mut self) -> Result<()> {
        self.set_states(MotorState::Release, MotorState::Release)
    }

    /// Request a reading and wait for the matching `<SIDE>SENSOR=` reply.
    ///
    /// Every other line received meanwhile is dropped. A non-numeric payload
    /// returns `-1`. With no deadline configured this waits as long as it takes,
    /// but still returns `Cancelled` once the cancel flag is raised.
    pub fn read_sensor(&mut self, side: Side) -> Result<i32> {
        self.send(Command::ReadSensor(side))?;
        let started = self.clock.now();
        loop {
            if self.cancelled() {
                tracing::debug!(%side, "sensor read cancelled");
                return Err(FollowerError::Cancelled);
            }
            if let Some(limit) = self.policy.deadline
                && self.clock.now().saturating_duration_since(started) >= limit
            {
                tracing::warn!(%side, limit_ms = limit.as_millis() as u64, "sensor read timed out");
                return Err(FollowerError::Timeout(side));
            }
            let line = self
                .link
                .read_line(self.policy.poll)
                .map_err(|e| map_link_error(e.as_ref()))?;
            let Some(line) = line else { continue };
            match parse_sensor_response(&line, side) {
                Some(value) => {
                    tracing::trace!(%side, value, "sensor reading");
                    return Ok(value);
                }
                None => tracing::trace!(%side, line = %line, "discarding unmatched line"),
            }
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn send(&mut self, cmd: Command) -> Result<()> {
        let line = cmd.to_string();
        tracing::trace!(command = %line, "link write");
        self.link
            .write_line(&line)
            .map_err(|e| map_link_error(e.as_ref()))
    }
}
