//! The bridge loop: one serial frame in, one table row out.
//!
//! Each iteration sleeps the poll interval, reads a frame, parses it and
//! inserts the resulting record. Failures are classified and handled per
//! class; none of them stop the loop. Only the shutdown future does.
//!
//! | failure                    | policy                                          |
//! |----------------------------|-------------------------------------------------|
//! | device unavailable / I/O   | skip; reopen the device on the next tick        |
//! | malformed frame            | drop                                            |
//! | integrity conflict         | drop, logged as "failed to insert data"         |
//! | transient database fault   | retry the same record up to `insert_attempts`   |
//! | other database error       | drop                                            |

mod outcome;

pub use outcome::{BridgeStats, SkipReason, StepOutcome};

use crate::config::BridgeSettings;
use crate::error::StoreError;
use crate::serial::BoxedFrameSource;
use crate::storage::BoxedScanSink;
use crate::types::{Frame, ScanRecord};
use std::future::Future;
use tracing::{debug, error, info, warn};

/// Owns both long-lived handles and the loop state.
pub struct Bridge {
    source: BoxedFrameSource,
    sink: BoxedScanSink,
    settings: BridgeSettings,
    stats: BridgeStats,
}

impl Bridge {
    /// Create a bridge over an already-acquired source and sink.
    pub fn new(source: BoxedFrameSource, sink: BoxedScanSink, settings: BridgeSettings) -> Self {
        Self {
            source,
            sink,
            settings,
            stats: BridgeStats::default(),
        }
    }

    /// Totals so far.
    pub fn stats(&self) -> &BridgeStats {
        &self.stats
    }

    /// Run until `shutdown` resolves, then release both handles.
    pub async fn run<F>(mut self, shutdown: F) -> BridgeStats
    where
        F: Future<Output = ()>,
    {
        info!(
            source = %self.source.describe(),
            sink = %self.sink.describe(),
            interval_ms = self.settings.poll_interval_ms,
            "bridge started"
        );

        tokio::pin!(shutdown);
        let interval = self.settings.poll_interval();

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested");
                    break;
                }
                _ = async {
                    tokio::time::sleep(interval).await;
                    self.step().await
                } => {}
            }
        }

        self.close().await
    }

    /// Perform one iteration without the leading sleep.
    pub async fn step(&mut self) -> StepOutcome {
        let outcome = match self.read_frame().await {
            Ok(Some(frame)) => self.handle_frame(frame).await,
            Ok(None) => StepOutcome::Idle,
            Err(reason) => StepOutcome::Skipped(reason),
        };
        self.stats.record(&outcome);
        outcome
    }

    async fn read_frame(&mut self) -> Result<Option<Frame>, SkipReason> {
        let was_connected = self.source.is_connected();
        if !was_connected && self.settings.reopen_device {
            match self.source.reopen().await {
                Ok(()) => info!(source = %self.source.describe(), "serial device reconnected"),
                Err(e) => debug!(error = %e, "serial device still unavailable"),
            }
        }

        match self.source.next_frame().await {
            Ok(frame) => Ok(frame),
            Err(e) if e.is_transient() => {
                if was_connected {
                    warn!(error = %e, "processing");
                } else {
                    debug!(error = %e, "processing");
                }
                Err(SkipReason::DeviceFault)
            }
            Err(e) => {
                // A line arrived but could not be turned into a frame.
                self.stats.frames += 1;
                warn!(error = %e, "processing");
                Err(SkipReason::MalformedFrame)
            }
        }
    }

    async fn handle_frame(&mut self, frame: Frame) -> StepOutcome {
        self.stats.frames += 1;
        info!(frame = %frame.as_str(), "frame received");

        match frame.parse() {
            Ok(record) => self.persist(record).await,
            Err(e) => {
                warn!(error = %e, "processing");
                StepOutcome::Skipped(SkipReason::MalformedFrame)
            }
        }
    }

    async fn persist(&mut self, record: ScanRecord) -> StepOutcome {
        let attempts = self.settings.insert_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.sink.insert(&record).await {
                Ok(()) => {
                    info!(member = %record.member_id, allow = %record.allow, "row inserted");
                    return StepOutcome::Inserted(record);
                }
                Err(StoreError::Conflict(reason)) => {
                    warn!(member = %record.member_id, reason = %reason, "failed to insert data");
                    return StepOutcome::Skipped(SkipReason::Conflict);
                }
                Err(e) if e.is_retryable() && attempt < attempts => {
                    warn!(attempt, attempts, error = %e, "insert failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(self.settings.poll_interval()).await;
                }
                Err(e) if e.is_retryable() => {
                    error!(member = %record.member_id, attempts, error = %e, "insert abandoned");
                    return StepOutcome::Skipped(SkipReason::RetriesExhausted);
                }
                Err(e) => {
                    error!(member = %record.member_id, error = %e, "processing");
                    return StepOutcome::Skipped(SkipReason::Rejected);
                }
            }
        }
    }

    async fn close(mut self) -> BridgeStats {
        self.sink.close().await;
        self.source.close().await;
        info!(summary = %self.stats.summary(), "bridge stopped");
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FrameError, FrameResult};
    use crate::serial::FrameSource;
    use crate::storage::MemoryStore;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use tokio::sync::oneshot;

    /// Replays scripted reads, then signals that the script is exhausted.
    struct ScriptedSource {
        reads: VecDeque<FrameResult<Option<Frame>>>,
        connected: bool,
        reopen_succeeds: bool,
        closed: Arc<AtomicBool>,
        exhausted: Option<oneshot::Sender<()>>,
    }

    impl ScriptedSource {
        fn lines(lines: &[&str]) -> Self {
            Self::new(lines.iter().map(|l| Ok(Some(Frame::new(*l)))).collect())
        }

        fn new(reads: Vec<FrameResult<Option<Frame>>>) -> Self {
            Self {
                reads: reads.into(),
                connected: true,
                reopen_succeeds: true,
                closed: Arc::new(AtomicBool::new(false)),
                exhausted: None,
            }
        }

        fn unreachable() -> Self {
            let mut source = Self::new(Vec::new());
            source.connected = false;
            source.reopen_succeeds = false;
            source
        }
    }

    #[async_trait]
    impl FrameSource for ScriptedSource {
        fn describe(&self) -> String {
            "scripted".to_string()
        }

        fn is_connected(&self) -> bool {
            self.connected
        }

        async fn next_frame(&mut self) -> FrameResult<Option<Frame>> {
            if !self.connected {
                return Err(FrameError::DeviceUnavailable("scripted".to_string()));
            }
            match self.reads.pop_front() {
                Some(Err(e)) => {
                    if e.is_transient() {
                        self.connected = false;
                    }
                    Err(e)
                }
                Some(read) => read,
                None => {
                    if let Some(tx) = self.exhausted.take() {
                        let _ = tx.send(());
                    }
                    Ok(None)
                }
            }
        }

        async fn reopen(&mut self) -> FrameResult<()> {
            if self.reopen_succeeds {
                self.connected = true;
                Ok(())
            } else {
                Err(FrameError::DeviceUnavailable("scripted".to_string()))
            }
        }

        async fn close(&mut self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn fast_settings() -> BridgeSettings {
        BridgeSettings {
            poll_interval_ms: 1,
            ..BridgeSettings::default()
        }
    }

    fn bridge(source: ScriptedSource, store: &MemoryStore) -> Bridge {
        Bridge::new(Box::new(source), Box::new(store.clone()), fast_settings())
    }

    #[tokio::test]
    async fn test_well_formed_frame_is_inserted() {
        let store = MemoryStore::new();
        let mut bridge = bridge(ScriptedSource::lines(&["42 1"]), &store);

        let outcome = bridge.step().await;
        assert!(outcome.is_inserted());

        let rows = store.rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].member_id, "42");
        assert_eq!(rows[0].allow, "1");
    }

    #[tokio::test]
    async fn test_short_frame_is_skipped_and_loop_continues() {
        let store = MemoryStore::new();
        let mut bridge = bridge(ScriptedSource::lines(&["42", "", "7 0"]), &store);

        assert_eq!(
            bridge.step().await,
            StepOutcome::Skipped(SkipReason::MalformedFrame)
        );
        assert_eq!(
            bridge.step().await,
            StepOutcome::Skipped(SkipReason::MalformedFrame)
        );
        assert!(bridge.step().await.is_inserted());

        assert_eq!(store.rows().len(), 1);
        assert_eq!(store.attempts(), 1);
        assert_eq!(bridge.stats().malformed, 2);
        assert_eq!(bridge.stats().frames, 3);
    }

    #[tokio::test]
    async fn test_duplicate_member_is_skipped() {
        let store = MemoryStore::new().with_unique_members();
        let mut bridge = bridge(ScriptedSource::lines(&["42 1", "42 1", "43 0"]), &store);

        assert!(bridge.step().await.is_inserted());
        assert_eq!(bridge.step().await, StepOutcome::Skipped(SkipReason::Conflict));
        assert!(bridge.step().await.is_inserted());

        assert_eq!(store.rows().len(), 2);
        assert_eq!(bridge.stats().conflicts, 1);
    }

    #[tokio::test]
    async fn test_unreachable_device_never_inserts() {
        let store = MemoryStore::new();
        let mut bridge = bridge(ScriptedSource::unreachable(), &store);

        for _ in 0..5 {
            assert_eq!(
                bridge.step().await,
                StepOutcome::Skipped(SkipReason::DeviceFault)
            );
        }
        assert!(store.rows().is_empty());
        assert_eq!(bridge.stats().device_faults, 5);
    }

    #[tokio::test]
    async fn test_device_reopened_after_read_fault() {
        let store = MemoryStore::new();
        let source = ScriptedSource::new(vec![
            Err(FrameError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged"))),
            Ok(Some(Frame::new("42 1"))),
        ]);
        let mut bridge = bridge(source, &store);

        assert_eq!(
            bridge.step().await,
            StepOutcome::Skipped(SkipReason::DeviceFault)
        );
        assert!(bridge.step().await.is_inserted());
    }

    #[tokio::test]
    async fn test_no_reopen_when_disabled() {
        let store = MemoryStore::new();
        let source = ScriptedSource::new(vec![
            Err(FrameError::Closed),
            Ok(Some(Frame::new("42 1"))),
        ]);
        let settings = BridgeSettings {
            reopen_device: false,
            ..fast_settings()
        };
        let mut bridge = Bridge::new(Box::new(source), Box::new(store.clone()), settings);

        for _ in 0..3 {
            assert_eq!(
                bridge.step().await,
                StepOutcome::Skipped(SkipReason::DeviceFault)
            );
        }
        assert!(store.rows().is_empty());
    }

    #[tokio::test]
    async fn test_idle_read_is_not_a_fault() {
        let store = MemoryStore::new();
        let mut bridge = bridge(ScriptedSource::new(vec![Ok(None)]), &store);

        assert_eq!(bridge.step().await, StepOutcome::Idle);
        assert_eq!(bridge.stats().idle, 1);
        assert_eq!(bridge.stats().frames, 0);
    }

    #[tokio::test]
    async fn test_transient_insert_fault_is_retried() {
        let store = MemoryStore::new();
        store.fail_next(StoreError::Transient("connection reset".into()));
        store.fail_next(StoreError::Transient("connection reset".into()));
        let mut bridge = bridge(ScriptedSource::lines(&["42 1"]), &store);

        assert!(bridge.step().await.is_inserted());
        assert_eq!(store.attempts(), 3);
        assert_eq!(store.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_transient_insert_fault_gives_up() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store.fail_next(StoreError::Transient("connection reset".into()));
        }
        let mut bridge = bridge(ScriptedSource::lines(&["42 1", "7 0"]), &store);

        assert_eq!(
            bridge.step().await,
            StepOutcome::Skipped(SkipReason::RetriesExhausted)
        );
        assert_eq!(store.attempts(), 3);
        assert!(bridge.step().await.is_inserted());
    }

    #[tokio::test]
    async fn test_rejected_insert_is_not_retried() {
        let store = MemoryStore::new();
        store.fail_next(StoreError::Rejected("unknown column".into()));
        let mut bridge = bridge(ScriptedSource::lines(&["42 1"]), &store);

        assert_eq!(bridge.step().await, StepOutcome::Skipped(SkipReason::Rejected));
        assert_eq!(store.attempts(), 1);
    }

    #[tokio::test]
    async fn test_invalid_utf8_is_malformed() {
        let store = MemoryStore::new();
        let source = ScriptedSource::new(vec![Err(FrameError::InvalidUtf8)]);
        let mut bridge = bridge(source, &store);

        assert_eq!(
            bridge.step().await,
            StepOutcome::Skipped(SkipReason::MalformedFrame)
        );
        assert_eq!(bridge.stats().frames, 1);
        assert_eq!(bridge.stats().malformed, 1);
    }

    #[tokio::test]
    async fn test_overlong_line_counts_as_frame() {
        let store = MemoryStore::new();
        let source = ScriptedSource::new(vec![
            Err(FrameError::Overlong { limit: 1024 }),
            Ok(Some(Frame::new("42 1"))),
        ]);
        let mut bridge = bridge(source, &store);

        assert_eq!(
            bridge.step().await,
            StepOutcome::Skipped(SkipReason::MalformedFrame)
        );
        assert!(bridge.step().await.is_inserted());
        assert_eq!(bridge.stats().frames, 2);
        assert_eq!(bridge.stats().device_faults, 0);
    }

    #[tokio::test]
    async fn test_run_until_shutdown_releases_handles() {
        let store = MemoryStore::new();
        let (tx, rx) = oneshot::channel();
        let mut source = ScriptedSource::lines(&["42 1", "bad", "7 0"]);
        source.exhausted = Some(tx);
        let closed = Arc::clone(&source.closed);

        let stats = bridge(source, &store)
            .run(async {
                let _ = rx.await;
            })
            .await;

        assert_eq!(stats.inserted, 2);
        assert_eq!(stats.malformed, 1);
        assert!(stats.last_insert_at.is_some());
        assert!(store.is_closed());
        assert!(closed.load(Ordering::SeqCst));

        let members: Vec<_> = store.rows().into_iter().map(|r| r.member_id).collect();
        assert_eq!(members, vec!["42", "7"]);
    }
}
