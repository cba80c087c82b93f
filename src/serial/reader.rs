//! Line framing over a blocking byte stream.
//!
//! Serial reads return whatever bytes happen to be buffered, and a read
//! timeout can land in the middle of a line. `LineReader` keeps partial
//! input across calls so a frame is never split or dropped.

use crate::error::{FrameError, FrameResult};
use crate::types::Frame;
use std::io::{ErrorKind, Read};

/// Longest line accepted before the buffer is discarded.
pub const MAX_FRAME_LEN: usize = 1024;

/// Splits a byte stream into newline-terminated frames.
pub struct LineReader<R> {
    inner: R,
    pending: Vec<u8>,
    /// Dropping the rest of an overlong line.
    discarding: bool,
}

impl<R: Read> LineReader<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: Vec::with_capacity(64),
            discarding: false,
        }
    }

    /// Read the next frame.
    ///
    /// Returns `Ok(None)` when the underlying read timed out before a
    /// complete line arrived; the partial line is kept for the next call.
    pub fn read_frame(&mut self) -> FrameResult<Option<Frame>> {
        let mut chunk = [0u8; 64];

        loop {
            if let Some(pos) = self.pending.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.pending.drain(..=pos).collect();
                if std::mem::take(&mut self.discarding) {
                    continue;
                }
                if line.len() > MAX_FRAME_LEN {
                    return Err(FrameError::Overlong {
                        limit: MAX_FRAME_LEN,
                    });
                }
                return Frame::decode(&line).map(Some);
            }

            if self.pending.len() > MAX_FRAME_LEN {
                self.pending.clear();
                if !self.discarding {
                    self.discarding = true;
                    return Err(FrameError::Overlong {
                        limit: MAX_FRAME_LEN,
                    });
                }
            }

            match self.inner.read(&mut chunk) {
                Ok(0) if self.pending.is_empty() || self.discarding => {
                    self.pending.clear();
                    return Err(FrameError::Closed);
                }
                Ok(0) => {
                    // Flush an unterminated last line.
                    let line = std::mem::take(&mut self.pending);
                    return Frame::decode(&line).map(Some);
                }
                Ok(n) => self.pending.extend_from_slice(&chunk[..n]),
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {
                    return Ok(None)
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    #[cfg(test)]
    fn pending(&self) -> usize {
        self.pending.len()
    }
}
