//! Shared server state and file-list change notifications

use filedrop_core::{Depot, FileMetadata, TransferError};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

/// Event pushed to passive observers (WebSocket clients)
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum FileEvent {
    /// Full snapshot of the registry after a change
    FileList(Vec<FileMetadata>),
}

/// State shared by the gRPC service and the HTTP router.
///
/// Both transports hold clones of the same `Depot`, so they observe a single
/// registry.
#[derive(Clone)]
pub struct AppState {
    pub depot: Depot,
    events: broadcast::Sender<FileEvent>,
    uploads: Arc<UploadCounters>,
}

/// Upload outcomes since the server started
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadStats {
    pub in_flight: usize,
    pub completed: u64,
    /// Streams that ended abruptly or were cancelled
    pub aborted: u64,
    /// Rejected requests and storage failures
    pub failed: u64,
}

#[derive(Debug, Default)]
struct UploadCounters {
    in_flight: AtomicUsize,
    completed: AtomicU64,
    aborted: AtomicU64,
    failed: AtomicU64,
}

/// Tracks one upload from the moment a transport accepts it.
///
/// A guard dropped without [`UploadGuard::finish`] means the handler itself
/// was cancelled, which counts as an abort.
pub struct UploadGuard {
    counters: Arc<UploadCounters>,
    settled: bool,
}

impl UploadGuard {
    pub fn finish<T>(mut self, result: &Result<T, TransferError>) {
        let counter = match result {
            Ok(_) => &self.counters.completed,
            Err(TransferError::TransferAborted(_)) => &self.counters.aborted,
            Err(_) => &self.counters.failed,
        };
        counter.fetch_add(1, Ordering::SeqCst);
        self.settled = true;
    }
}

impl Drop for UploadGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.counters.aborted.fetch_add(1, Ordering::SeqCst);
        }
        self.counters.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

impl AppState {
    pub fn new(depot: Depot) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            depot,
            events,
            uploads: Arc::new(UploadCounters::default()),
        }
    }

    /// Start tracking an upload; settle it with [`UploadGuard::finish`]
    pub fn begin_upload(&self) -> UploadGuard {
        self.uploads.in_flight.fetch_add(1, Ordering::SeqCst);
        UploadGuard {
            counters: self.uploads.clone(),
            settled: false,
        }
    }

    pub fn upload_stats(&self) -> UploadStats {
        UploadStats {
            in_flight: self.uploads.in_flight.load(Ordering::SeqCst),
            completed: self.uploads.completed.load(Ordering::SeqCst),
            aborted: self.uploads.aborted.load(Ordering::SeqCst),
            failed: self.uploads.failed.load(Ordering::SeqCst),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FileEvent> {
        self.events.subscribe()
    }

    /// Current file list, as sent to observers
    pub fn snapshot(&self) -> FileEvent {
        FileEvent::FileList(self.depot.list())
    }

    /// Publish the current file list after an upload or delete
    pub fn notify_changed(&self) {
        let receivers = self.events.send(self.snapshot()).unwrap_or(0);
        trace!("File list change sent to {} observers", receivers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filedrop_core::{MemoryStorage, Registry};
    use std::sync::Arc;

    #[test]
    fn test_event_serialization() {
        let event = FileEvent::FileList(vec![]);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "fileList");
        assert!(json["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_receive_changes() {
        let state = AppState::new(Depot::new(
            Arc::new(Registry::new()),
            Arc::new(MemoryStorage::new()),
        ));
        let mut rx = state.subscribe();

        state.notify_changed();

        let FileEvent::FileList(files) = rx.recv().await.unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_upload_outcomes_are_counted() {
        let state = AppState::new(Depot::new(
            Arc::new(Registry::new()),
            Arc::new(MemoryStorage::new()),
        ));

        let ok = state.begin_upload();
        let aborted = state.begin_upload();
        let rejected = state.begin_upload();
        let cancelled = state.begin_upload();
        assert_eq!(state.upload_stats().in_flight, 4);

        ok.finish::<()>(&Ok(()));
        aborted.finish::<()>(&Err(TransferError::TransferAborted("reset".into())));
        rejected.finish::<()>(&Err(TransferError::InvalidRequest("no info".into())));
        drop(cancelled);

        assert_eq!(
            state.upload_stats(),
            UploadStats {
                in_flight: 0,
                completed: 1,
                aborted: 2,
                failed: 1,
            }
        );
    }

    #[test]
    fn test_notify_without_subscribers_is_harmless() {
        let state = AppState::new(Depot::new(
            Arc::new(Registry::new()),
            Arc::new(MemoryStorage::new()),
        ));
        state.notify_changed();
    }
}
