#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core line-following logic (hardware-agnostic).
//!
//! All device traffic goes through the `follower_traits::DeviceLink` trait.
//!
//! ## Architecture
//!
//! - **Protocol**: firmware command encoding and sensor-reply matching (`protocol`)
//! - **Proxy**: validated motor commands, cached motor state, cancellable sensor reads (`proxy`)
//! - **Parameters**: per-field atomic tuning values shared with the console (`params`)
//! - **Calibration**: bounds type and the spin-in-place discovery routine (`calibration`)
//! - **Steering**: pure classification, pivot and P-control functions (`steering`)
//! - **Control**: one-iteration state machine (`control`) and the run-to-shutdown driver (`runner`)
//! - **Telemetry**: per-iteration records and sinks (`telemetry`)
//! - **Conversions**: `From` impls from `follower_config` sections (`conversions`)

pub mod atomic;
pub mod calibration;
pub mod control;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod params;
pub mod protocol;
pub mod proxy;
pub mod runner;
pub mod status;
pub mod steering;
pub mod telemetry;
pub mod types;

pub use calibration::{CalibrationBounds, CalibrationCfg, Checkpoint, SensorBounds, calibrate};
pub use control::{ControlLoop, LoopCfg};
pub use error::{FollowerError, Result};
pub use params::{ControlParams, ParamSnapshot};
pub use proxy::{HardwareProxy, ReadPolicy};
pub use runner::{RunSummary, run};
pub use status::LoopStatus;
pub use steering::{Classification, Thresholds, TurnBias};
pub use telemetry::{CsvTelemetrySink, MemorySink, TelemetryRecord, TelemetrySink};
pub use types::{MotorState, SENSOR_GARBLED, Side};
