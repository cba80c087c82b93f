//! # rfid-bridge - RFID Reader to MySQL Bridge
//!
//! rfid-bridge reads scan events from an RFID reader attached to a serial
//! port and stores each one as a row in a MySQL table.
//!
//! ## Features
//!
//! - **Line Framing**: Partial lines survive read timeouts; overlong lines are dropped
//! - **Classified Failures**: Device faults, malformed frames, conflicts and
//!   transient database faults each get their own handling
//! - **Graceful Shutdown**: Ctrl-C or SIGTERM releases the device and connection
//! - **Settings File**: JSON settings with CLI overrides, defaults match the
//!   original deployment
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use rfid_bridge::bridge::Bridge;
//! use rfid_bridge::config::Settings;
//! use rfid_bridge::serial::SerialFrameSource;
//! use rfid_bridge::storage::MySqlStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let sink = MySqlStore::connect(&settings.database).await?;
//!     let source = SerialFrameSource::connect(settings.serial.clone());
//!
//!     let bridge = Bridge::new(Box::new(source), Box::new(sink), settings.bridge);
//!     let stats = bridge.run(async { tokio::signal::ctrl_c().await.ok(); }).await;
//!     println!("{}", stats.summary());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Frames, scan records and token newtypes
//! - [`serial`] - The `FrameSource` trait and the serial port source
//! - [`storage`] - The `ScanSink` trait, MySQL and in-memory sinks
//! - [`bridge`] - The loop and its per-failure policies
//! - [`config`] - Settings and XDG paths
//! - [`error`] - Error types per stage
//! - [`output`] - Console output helpers

pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod serial;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use bridge::{Bridge, BridgeStats, SkipReason, StepOutcome};
pub use error::{CliError, FrameError, StoreError};
pub use serial::{FrameSource, SerialFrameSource};
pub use storage::{MemoryStore, MySqlStore, ScanSink};
pub use types::{AllowFlag, Frame, MemberId, ScanRecord};
