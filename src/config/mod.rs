//! Configuration management for the bridge.
//!
//! Provides XDG-compliant settings storage for the serial device,
//! the database connection and the loop itself.

mod settings;

pub use settings::{BridgeSettings, DatabaseSettings, Paths, SerialSettings, Settings};
