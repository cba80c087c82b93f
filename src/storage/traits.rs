//! Scan sink trait abstraction.

use crate::error::StoreResult;
use crate::types::ScanRecord;
use async_trait::async_trait;

/// Destination for scan records, normally a database table.
#[async_trait]
pub trait ScanSink: Send {
    /// Human-readable name of the sink, used in log messages.
    fn describe(&self) -> String;

    /// Insert one record and make it durable before returning.
    async fn insert(&mut self, record: &ScanRecord) -> StoreResult<()>;

    /// Release the underlying connection.
    async fn close(&mut self) {}
}

/// A boxed scan sink for dynamic dispatch.
pub type BoxedScanSink = Box<dyn ScanSink>;
