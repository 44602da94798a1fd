use std::collections::VecDeque;

use crate::error::{HwError, Result};

/// Longest line accepted from the controller before the buffer is dropped.
pub const MAX_LINE_LEN: usize = 256;

/// Reassembles newline-terminated text lines from arbitrary byte chunks.
///
/// Trailing `\r` is stripped so CRLF and LF controllers look the same.
/// Invalid UTF-8 is replaced rather than rejected; such lines fail the
/// sensor-tag match upstream and are discarded there.
#[derive(Debug, Default)]
pub struct LineAssembler {
    partial: Vec<u8>,
    ready: VecDeque<String>,
    discarding: bool,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed received bytes. An overlong line is discarded up to its
    /// terminator and reported once; other lines in the chunk are kept.
    pub fn push(&mut self, bytes: &[u8]) -> Result<()> {
        let mut overflowed = false;
        for &b in bytes {
            if b == b'\n' {
                if self.discarding {
                    self.discarding = false;
                    continue;
                }
                let mut line = std::mem::take(&mut self.partial);
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                self.ready
                    .push_back(String::from_utf8_lossy(&line).into_owned());
            } else if !self.discarding {
                self.partial.push(b);
                if self.partial.len() > MAX_LINE_LEN {
                    self.discarding = true;
                    overflowed = true;
                    self.partial.clear();
                }
            }
        }
        if overflowed {
            return Err(HwError::LineTooLong(MAX_LINE_LEN));
        }
        Ok(())
    }

    pub fn pop_line(&mut self) -> Option<String> {
        self.ready.pop_front()
    }

    /// Bytes of an unterminated line held back for the next chunk.
    pub fn pending(&self) -> usize {
        self.partial.len()
    }
}
