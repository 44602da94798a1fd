//! Test and helper mocks for follower_core

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use follower_traits::{DeviceLink, LinkError};

use crate::protocol::sensor_tag;
use crate::types::Side;

/// In-memory device link with scripted sensor replies.
///
/// Every `readSensor <SIDE>` written pops the next scripted payload for that
/// side and queues `<SIDE>SENSOR=<payload>` for reading. With nothing
/// scripted the link stays silent: `read_line` sleeps for its timeout and
/// returns `None`. Clones share state, so a test can keep a handle after
/// moving the link into a proxy.
#[derive(Debug, Clone, Default)]
pub struct ScriptedLink {
    inner: Arc<Mutex<ScriptState>>,
}

#[derive(Debug, Default)]
struct ScriptState {
    sent: Vec<String>,
    inbound: VecDeque<String>,
    left: VecDeque<String>,
    right: VecDeque<String>,
    fail_writes: bool,
}

impl ScriptedLink {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Script the payload returned for the next read of `side`.
    pub fn push_payload(&self, side: Side, payload: impl Into<String>) {
        let mut st = self.state();
        match side {
            Side::Left => st.left.push_back(payload.into()),
            Side::Right => st.right.push_back(payload.into()),
        }
    }

    /// Script one numeric reading per side.
    pub fn push_pair(&self, left: i32, right: i32) {
        self.push_payload(Side::Left, left.to_string());
        self.push_payload(Side::Right, right.to_string());
    }

    /// Queue an unsolicited line, delivered before any later reply.
    pub fn push_line(&self, line: impl Into<String>) {
        self.state().inbound.push_back(line.into());
    }

    /// Make every subsequent write fail.
    pub fn fail_writes(&self) {
        self.state().fail_writes = true;
    }

    /// Lines written so far.
    pub fn sent(&self) -> Vec<String> {
        self.state().sent.clone()
    }

    pub fn clear_sent(&self) {
        self.state().sent.clear();
    }
}

impl DeviceLink for ScriptedLink {
    fn write_line(&mut self, line: &str) -> Result<(), LinkError> {
        let mut st = self.state();
        if st.fail_writes {
            return Err(Box::new(std::io::Error::other("scripted write failure")));
        }
        st.sent.push(line.to_string());
        let side = match line {
            "readSensor LEFT" => Some(Side::Left),
            "readSensor RIGHT" => Some(Side::Right),
            _ => None,
        };
        if let Some(side) = side {
            let next = match side {
                Side::Left => st.left.pop_front(),
                Side::Right => st.right.pop_front(),
            };
            if let Some(payload) = next {
                st.inbound.push_back(format!("{}{}", sensor_tag(side), payload));
            }
        }
        Ok(())
    }

    fn read_line(&mut self, timeout: Duration) -> Result<Option<String>, LinkError> {
        if let Some(line) = self.state().inbound.pop_front() {
            return Ok(Some(line));
        }
        std::thread::sleep(timeout);
        Ok(None)
    }
}
