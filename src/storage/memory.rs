//! In-process scan sink.
//!
//! Mirrors the table's behaviour closely enough to exercise the bridge
//! loop without a database: rows get auto-increment ids, an optional
//! uniqueness constraint on the member id raises conflicts, and failures
//! can be queued up front.

use super::traits::ScanSink;
use crate::error::{StoreError, StoreResult};
use crate::types::ScanRecord;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// A row as the table would hold it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRow {
    pub id: u64,
    pub member_id: String,
    pub allow: String,
}

#[derive(Debug, Default)]
struct Inner {
    rows: Vec<StoredRow>,
    next_id: u64,
    unique_members: bool,
    failures: VecDeque<StoreError>,
    attempts: usize,
    closed: bool,
}

/// Shared handle to an in-memory table. Clones see the same rows.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject a second row with the same member id.
    pub fn with_unique_members(self) -> Self {
        self.lock().unique_members = true;
        self
    }

    /// Make the next insert attempt fail with `err`.
    pub fn fail_next(&self, err: StoreError) {
        self.lock().failures.push_back(err);
    }

    /// Rows inserted so far.
    pub fn rows(&self) -> Vec<StoredRow> {
        self.lock().rows.clone()
    }

    /// Number of insert attempts, including failed ones.
    pub fn attempts(&self) -> usize {
        self.lock().attempts
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ScanSink for MemoryStore {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    async fn insert(&mut self, record: &ScanRecord) -> StoreResult<()> {
        let mut inner = self.lock();
        inner.attempts += 1;

        if inner.closed {
            return Err(StoreError::Transient("store is closed".to_string()));
        }
        if let Some(err) = inner.failures.pop_front() {
            return Err(err);
        }
        if inner.unique_members
            && inner
                .rows
                .iter()
                .any(|row| row.member_id == record.member_id.as_str())
        {
            return Err(StoreError::Conflict(format!(
                "Duplicate entry '{}' for key 'Member_ID'",
                record.member_id
            )));
        }

        inner.next_id += 1;
        let id = inner.next_id;
        inner.rows.push(StoredRow {
            id,
            member_id: record.member_id.as_str().to_string(),
            allow: record.allow.as_str().to_string(),
        });
        Ok(())
    }

    async fn close(&mut self) {
        self.lock().closed = true;
    }
}
