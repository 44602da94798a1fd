pub mod error;
#[cfg(feature = "hardware")]
pub mod serial;
pub mod util;

#[cfg(feature = "hardware")]
pub use serial::SerialLink;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use follower_traits::{DeviceLink, LinkError};

/// Reflectance over the dark line and over bare floor.
const LINE_LEVEL: f32 = 70.0;
const FLOOR_LEVEL: f32 = 432.0;
/// Half-width of the line and distance between the two sensors, in track units.
const LINE_HALF_WIDTH: f32 = 1.5;
const SENSOR_SPACING: f32 = 0.6;
/// Heading change per tick per unit of wheel-speed difference (radians).
const TURN_RATE: f32 = 0.0008;
/// Lateral travel per tick per unit of mean wheel speed.
const TRAVEL_RATE: f32 = 0.004;

/// Commanded state of one wheel as the simulated controller understood it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WheelState {
    pub speed: u8,
    /// `1` forward, `-1` backward, `0` released.
    pub direction: i8,
}

impl WheelState {
    fn signed(self) -> f32 {
        f32::from(self.speed) * f32::from(self.direction)
    }
}

#[derive(Debug)]
struct Track {
    wheels: [WheelState; 2],
    /// Lateral offset of the robot centre from the line.
    offset: f32,
    heading: f32,
    curvature: f32,
    lifted: bool,
    rng: u32,
    outbox: VecDeque<String>,
}

impl Track {
    fn noise(&mut self) -> f32 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        (x % 7) as f32 - 3.0
    }

    fn tick(&mut self) {
        let [l, r] = self.wheels.map(WheelState::signed);
        self.heading += TURN_RATE * (l - r) + self.curvature;
        self.offset += TRAVEL_RATE * (l + r) * 0.5 * self.heading.sin();
    }

    fn reading(&mut self, right: bool) -> i32 {
        if self.lifted {
            return 0;
        }
        let half = SENSOR_SPACING * 0.5;
        let pos = if right { self.offset + half } else { self.offset - half };
        let t = (pos.abs() / LINE_HALF_WIDTH).min(1.0);
        let v = LINE_LEVEL + (FLOOR_LEVEL - LINE_LEVEL) * t + self.noise();
        // Stay above the pickup level unless lifted.
        v.round().max(10.0) as i32
    }

    fn handle(&mut self, line: &str) {
        let mut parts = line.split_whitespace();
        let (Some(cmd), Some(side)) = (parts.next(), parts.next()) else {
            tracing::trace!(line, "sim ignored command");
            return;
        };
        let idx = match side {
            "LEFT" => 0,
            "RIGHT" => 1,
            _ => {
                tracing::trace!(line, "sim ignored command");
                return;
            }
        };
        match (cmd, parts.next()) {
            ("setSpeed", Some(v)) => {
                if let Ok(speed) = v.parse::<u8>() {
                    self.wheels[idx].speed = speed;
                }
            }
            ("setState", Some(state)) => {
                self.wheels[idx].direction = match state {
                    "FORWARD" => 1,
                    "BACKWARD" => -1,
                    _ => 0,
                };
            }
            ("readSensor", None) => {
                // One physics step per sensor pair.
                if idx == 0 {
                    self.tick();
                }
                let value = self.reading(idx == 1);
                self.outbox.push_back(format!("{side}SENSOR={value}"));
            }
            _ => tracing::trace!(line, "sim ignored command"),
        }
    }
}

/// A robot on a simulated track, speaking the controller's text protocol.
///
/// Motor commands steer a simple kinematic model; `readSensor` replies with
/// reflectance values derived from the robot's offset from the line. Clones
/// share the same robot, so a handle can be kept after the link is moved into
/// the control thread.
#[derive(Debug, Clone)]
pub struct SimulatedLink {
    track: Arc<Mutex<Track>>,
}

impl Default for SimulatedLink {
    fn default() -> Self {
        Self::new(0x5eed)
    }
}

impl SimulatedLink {
    pub fn new(seed: u32) -> Self {
        Self {
            track: Arc::new(Mutex::new(Track {
                wheels: [WheelState::default(); 2],
                offset: 0.0,
                heading: 0.0,
                curvature: 0.0,
                lifted: false,
                rng: seed.max(1),
                outbox: VecDeque::new(),
            })),
        }
    }

    /// Constant bend of the track, in radians per tick.
    pub fn with_curvature(self, curvature: f32) -> Self {
        self.lock().curvature = curvature;
        self
    }

    fn lock(&self) -> MutexGuard<'_, Track> {
        self.track.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Place the robot `offset` track units to the right of the line.
    pub fn place(&self, offset: f32) {
        let mut t = self.lock();
        t.offset = offset;
        t.heading = 0.0;
    }

    /// While lifted, both sensors read 0.
    pub fn set_lifted(&self, lifted: bool) {
        self.lock().lifted = lifted;
    }

    pub fn wheels(&self) -> [WheelState; 2] {
        self.lock().wheels
    }

    pub fn offset(&self) -> f32 {
        self.lock().offset
    }
}

impl DeviceLink for SimulatedLink {
    fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        self.lock().handle(line.trim());
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, LinkError> {
        if let Some(line) = self.lock().outbox.pop_front() {
            return Ok(Some(line));
        }
        std::thread::sleep(timeout);
        Ok(None)
    }
}
