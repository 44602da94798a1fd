//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "follower", version, about = "Two-sensor line follower controller")]
pub struct Cli {
    /// Path to config TOML; built-in defaults are used when omitted
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log and report errors as JSON lines instead of pretty text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); RUST_LOG takes precedence
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Follow the line, with live tuning from stdin
    Run {
        /// Calibrate before driving instead of using stored bounds
        #[arg(long, action = ArgAction::SetTrue, conflicts_with = "bounds")]
        calibrate: bool,
        /// Bounds CSV (side,min,max) saved by `calibrate`
        #[arg(long, value_name = "FILE")]
        bounds: Option<PathBuf>,
        /// Telemetry CSV written at shutdown (overrides telemetry.path)
        #[arg(long, value_name = "FILE")]
        telemetry: Option<PathBuf>,
        /// Drive the simulated track instead of the serial controller
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
        /// Run the control thread with SCHED_FIFO priority (Linux)
        #[arg(long, action = ArgAction::SetTrue)]
        rt: bool,
        /// SCHED_FIFO priority when --rt is set; clamped to the system range
        #[arg(long, value_name = "PRIO", requires = "rt")]
        rt_prio: Option<i32>,
    },
    /// Spin in place to measure sensor bounds, then save them
    Calibrate {
        /// Where to write the bounds CSV
        #[arg(long, value_name = "FILE", default_value = "bounds.csv")]
        out: PathBuf,
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
    },
    /// Release both motors and read each sensor once
    SelfCheck {
        #[arg(long, action = ArgAction::SetTrue)]
        sim: bool,
    },
}
