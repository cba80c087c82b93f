//! Frame source trait abstraction.
//!
//! Decouples the bridge loop from the physical reader, so the loop can be
//! driven by a scripted source in tests.

use crate::error::FrameResult;
use crate::types::Frame;
use async_trait::async_trait;

/// A source of frames, normally an RFID reader on a serial port.
#[async_trait]
pub trait FrameSource: Send {
    /// Human-readable name of the source, used in log messages.
    fn describe(&self) -> String;

    /// Whether the source currently holds an open device handle.
    fn is_connected(&self) -> bool;

    /// Read the next frame.
    ///
    /// `Ok(None)` means the read timed out without a complete line.
    ///
    /// Must be cancel-safe: if the returned future is dropped mid-read, the
    /// device handle stays with the source and `close` still releases it.
    async fn next_frame(&mut self) -> FrameResult<Option<Frame>>;

    /// Try to (re)acquire the device.
    ///
    /// Sources without a device to lose can rely on the default.
    async fn reopen(&mut self) -> FrameResult<()> {
        Ok(())
    }

    /// Release the device handle.
    async fn close(&mut self) {}
}

/// A boxed frame source for dynamic dispatch.
pub type BoxedFrameSource = Box<dyn FrameSource>;
