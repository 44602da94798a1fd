pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::time::Duration;

pub type LinkError = Box<dyn std::error::Error + Send + Sync>;

/// Duplex, line-oriented channel to the motor/sensor controller.
///
/// Lines are passed without their terminator in both directions.
pub trait DeviceLink {
    fn write_line(&mut self, line: &str) -> Result<(), LinkError>;

    /// Wait up to `timeout` for the next complete line.
    ///
    /// Returns `Ok(None)` when nothing arrived in time; callers decide whether to
    /// keep waiting.
    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, LinkError>;
}

impl<L: DeviceLink + ?Sized> DeviceLink for Box<L> {
    fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        (**self).write_line(line)
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, LinkError> {
        (**self).read_line(timeout)
    }
}
