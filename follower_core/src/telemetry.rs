//! Per-iteration telemetry and where it goes when the loop ends.

use std::path::{Path, PathBuf};

use eyre::WrapErr;

use crate::atomic::write_atomic;

/// Column names of the telemetry table, in order.
pub const HEADERS: [&str; 4] = ["left sensor", "right sensor", "left motor", "right motor"];

/// One engaged iteration. Motor values are signed: negative means the wheel
/// was driven backward during a recovery pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TelemetryRecord {
    pub left_sensor: i32,
    pub right_sensor: i32,
    pub left_motor: i32,
    pub right_motor: i32,
}

/// Receives the whole run's records once, when the control loop terminates.
pub trait TelemetrySink {
    fn flush(&mut self, records: &[TelemetryRecord]) -> eyre::Result<()>;
}

/// Writes records as CSV, replacing the target file atomically.
#[derive(Debug, Clone)]
pub struct CsvTelemetrySink {
    path: PathBuf,
}

impl CsvTelemetrySink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Render records as CSV bytes. The header row is always present.
pub fn to_csv(records: &[TelemetryRecord]) -> eyre::Result<Vec<u8>> {
    let mut w = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    w.write_record(HEADERS)?;
    for r in records {
        w.write_record([
            r.left_sensor.to_string(),
            r.right_sensor.to_string(),
            r.left_motor.to_string(),
            r.right_motor.to_string(),
        ])?;
    }
    w.into_inner()
        .map_err(|e| eyre::eyre!("finish telemetry CSV: {}", e.error()))
}

impl TelemetrySink for CsvTelemetrySink {
    fn flush(&mut self, records: &[TelemetryRecord]) -> eyre::Result<()> {
        let bytes = to_csv(records)?;
        write_atomic(&self.path, &bytes)
            .wrap_err_with(|| format!("write telemetry to {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), rows = records.len(), "telemetry written");
        Ok(())
    }
}

/// Keeps every flush in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub flushes: Vec<Vec<TelemetryRecord>>,
}

impl TelemetrySink for MemorySink {
    fn flush(&mut self, records: &[TelemetryRecord]) -> eyre::Result<()> {
        self.flushes.push(records.to_vec());
        Ok(())
    }
}
