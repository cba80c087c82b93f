//! Scan record persistence.
//!
//! Provides the [`ScanSink`] abstraction with a MySQL implementation for
//! production and an in-memory table for exercising the bridge loop.

mod memory;
mod mysql;
pub mod traits;

pub use memory::{MemoryStore, StoredRow};
pub use mysql::{connect_options, insert_statement, MySqlStore};
pub use traits::{BoxedScanSink, ScanSink};
