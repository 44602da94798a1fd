#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and calibration-bounds persistence for the line follower.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//!   Every section is optional; missing fields take the tuned defaults.
//! - The bounds CSV loader enforces its header and requires exactly one row
//!   per side.
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Speeds on the wire are `0..255`; 255 itself is rejected.
pub const SPEED_LIMIT: u8 = 255;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LinkCfg {
    /// Serial device of the motor/sensor controller.
    pub port: String,
    pub baud: u32,
    /// Per-poll wait while a sensor reply is outstanding (ms).
    pub poll_ms: u64,
    /// Overall limit for one sensor read (ms). 0 waits indefinitely.
    pub read_timeout_ms: u64,
}

impl Default for LinkCfg {
    fn default() -> Self {
        Self {
            port: "/dev/ttyACM0".to_string(),
            baud: 115_200,
            poll_ms: 20,
            read_timeout_ms: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ControlCfg {
    /// Proportional gain applied to the sensor error.
    pub gain: f64,
    pub base_speed: u8,
    pub min_speed: u8,
    pub max_speed: u8,
}

impl Default for ControlCfg {
    fn default() -> Self {
        Self {
            gain: 0.1,
            base_speed: 45,
            min_speed: 25,
            max_speed: 70,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct ThresholdsCfg {
    /// Readings above these levels mean the sensor is off the line.
    pub left: i32,
    pub right: i32,
    /// Readings below this level mean the robot has been lifted.
    pub pickup: i32,
}

impl Default for ThresholdsCfg {
    fn default() -> Self {
        Self {
            left: 200,
            right: 200,
            pickup: 5,
        }
    }
}

/// Sensor bounds used when no calibration is run or loaded.
///
/// Also the in-memory form of the bounds CSV.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct BoundsCfg {
    pub left_min: i32,
    pub left_max: i32,
    pub right_min: i32,
    pub right_max: i32,
}

impl Default for BoundsCfg {
    fn default() -> Self {
        Self {
            left_min: 70,
            left_max: 432,
            right_min: 59,
            right_max: 430,
        }
    }
}

impl BoundsCfg {
    pub fn validate(&self) -> eyre::Result<()> {
        if self.left_min > self.left_max {
            eyre::bail!(
                "bounds.left_min must be <= bounds.left_max ({} > {})",
                self.left_min,
                self.left_max
            );
        }
        if self.right_min > self.right_max {
            eyre::bail!(
                "bounds.right_min must be <= bounds.right_max ({} > {})",
                self.right_min,
                self.right_max
            );
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CalibrationCfg {
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

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct RunnerCfg {
    /// Pause between iterations while disengaged (ms).
    pub idle_pause_ms: u64,
    /// How long to wait for the control thread after shutdown (ms).
    pub shutdown_grace_ms: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            idle_pause_ms: 10,
            shutdown_grace_ms: 5000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TelemetryCfg {
    pub path: String,
}

impl Default for TelemetryCfg {
    fn default() -> Self {
        Self {
            path: "data.csv".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub link: LinkCfg,
    pub control: ControlCfg,
    pub thresholds: ThresholdsCfg,
    pub bounds: BoundsCfg,
    pub calibration: CalibrationCfg,
    pub runner: RunnerCfg,
    pub telemetry: TelemetryCfg,
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Link
        if self.link.port.trim().is_empty() {
            eyre::bail!("link.port must not be empty");
        }
        if self.link.baud == 0 {
            eyre::bail!("link.baud must be > 0");
        }
        if self.link.poll_ms == 0 {
            eyre::bail!("link.poll_ms must be >= 1");
        }

        // Control
        if !self.control.gain.is_finite() {
            eyre::bail!("control.gain must be a finite number");
        }
        for (name, v) in [
            ("control.base_speed", self.control.base_speed),
            ("control.min_speed", self.control.min_speed),
            ("control.max_speed", self.control.max_speed),
            ("calibration.spin_speed", self.calibration.spin_speed),
        ] {
            if v >= SPEED_LIMIT {
                eyre::bail!("{name} must be in [0, 255), got {v}");
            }
        }
        if self.control.min_speed > self.control.max_speed {
            eyre::bail!("control.min_speed must be <= control.max_speed");
        }

        // Thresholds
        if self.thresholds.pickup < 0 {
            eyre::bail!("thresholds.pickup must be >= 0");
        }

        self.bounds.validate()?;

        // Calibration
        if self.calibration.checkpoint_every == 0 {
            eyre::bail!("calibration.checkpoint_every must be >= 1");
        }

        // Telemetry
        if self.telemetry.path.trim().is_empty() {
            eyre::bail!("telemetry.path must not be empty");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly, got {rot:?}");
        }

        Ok(())
    }
}

/// Bounds CSV schema.
///
/// Expected headers:
/// side,min,max
///
/// Example:
/// side,min,max
/// left,70,432
/// right,59,430
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BoundsRow {
    pub side: String,
    pub min: i32,
    pub max: i32,
}

const BOUNDS_HEADERS: [&str; 3] = ["side", "min", "max"];

impl TryFrom<Vec<BoundsRow>> for BoundsCfg {
    type Error = eyre::Report;

    fn try_from(rows: Vec<BoundsRow>) -> Result<Self, Self::Error> {
        let mut left = None;
        let mut right = None;
        for row in rows {
            let slot = match row.side.trim().to_ascii_lowercase().as_str() {
                "left" => &mut left,
                "right" => &mut right,
                other => eyre::bail!("bounds CSV side must be 'left' or 'right', got {other:?}"),
            };
            if slot.is_some() {
                eyre::bail!("bounds CSV has duplicate row for side {:?}", row.side.trim());
            }
            *slot = Some((row.min, row.max));
        }
        let (Some((left_min, left_max)), Some((right_min, right_max))) = (left, right) else {
            eyre::bail!("bounds CSV must contain one 'left' and one 'right' row");
        };
        let bounds = Self {
            left_min,
            left_max,
            right_min,
            right_max,
        };
        bounds.validate()?;
        Ok(bounds)
    }
}

pub fn load_bounds_csv(path: &Path) -> eyre::Result<BoundsCfg> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open bounds CSV {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let actual: Vec<String> = headers.iter().map(ToString::to_string).collect();
    if actual != BOUNDS_HEADERS {
        eyre::bail!(
            "bounds CSV must have headers 'side,min,max', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<BoundsRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }

    BoundsCfg::try_from(rows)
}

pub fn save_bounds_csv(path: &Path, bounds: &BoundsCfg) -> eyre::Result<()> {
    let mut w = csv::Writer::from_path(path)
        .map_err(|e| eyre::eyre!("create bounds CSV {:?}: {}", path, e))?;
    for row in [
        BoundsRow {
            side: "left".to_string(),
            min: bounds.left_min,
            max: bounds.left_max,
        },
        BoundsRow {
            side: "right".to_string(),
            min: bounds.right_min,
            max: bounds.right_max,
        },
    ] {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}
