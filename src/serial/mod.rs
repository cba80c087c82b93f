//! Serial input for the bridge.
//!
//! Provides the [`FrameSource`] abstraction, line framing over blocking
//! reads, and the `serialport`-backed source for the physical reader.

mod port;
mod reader;
pub mod traits;

pub use port::{list_ports, PortInfo, SerialFrameSource};
pub use reader::{LineReader, MAX_FRAME_LEN};
pub use traits::{BoxedFrameSource, FrameSource};
