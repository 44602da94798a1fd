//! Serial-port link to the motor/sensor controller.

use std::io::{Read, Write};
use std::time::{Duration, Instant};

use follower_traits::{DeviceLink, LinkError};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::error::{HwError, Result};
use crate::util::LineAssembler;

pub struct SerialLink {
    port: Box<dyn SerialPort>,
    lines: LineAssembler,
    scratch: [u8; 64],
}

impl SerialLink {
    /// Open `path` at `baud`, 8N1 without flow control.
    pub fn open(path: &str, baud: u32) -> Result<Self> {
        let port = serialport::new(path, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(Duration::from_millis(20))
            .open()?;
        tracing::info!(path, baud, "serial link open");
        Ok(Self {
            port,
            lines: LineAssembler::new(),
            scratch: [0; 64],
        })
    }

    fn fill(&mut self, wait: Duration) -> Result<()> {
        self.port.set_timeout(wait.max(Duration::from_millis(1)))?;
        match self.port.read(&mut self.scratch) {
            Ok(0) => Err(HwError::Disconnected),
            Ok(n) => {
                let chunk = &self.scratch[..n];
                if let Err(e) = self.lines.push(chunk) {
                    tracing::warn!(error = %e, "dropped overlong line");
                }
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

impl DeviceLink for SerialLink {
    fn write_line(&mut self, line: &str) -> std::result::Result<(), LinkError> {
        let mut framed = Vec::with_capacity(line.len() + 1);
        framed.extend_from_slice(line.as_bytes());
        framed.push(b'\n');
        self.port.write_all(&framed).map_err(HwError::from)?;
        self.port.flush().map_err(HwError::from)?;
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> std::result::Result<Option<String>, LinkError> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Some(line) = self.lines.pop_line() {
                return Ok(Some(line));
            }
            let left = deadline.saturating_duration_since(Instant::now());
            if left.is_zero() {
                return Ok(None);
            }
            self.fill(left)?;
        }
    }
}
