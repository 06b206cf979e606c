//! Published findings snapshot
//!
//! Readers clone the current `Arc<Snapshot>` and keep it for the whole
//! request; a reload builds a complete new snapshot and swaps it in with a
//! single write.

use std::sync::Arc;

use raster_common::{FindingsList, LocalTime};
use serde::Serialize;
use tokio::sync::RwLock;

/// Last failed reload, shown next to the still-published findings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReloadFailure {
    pub message: String,
    pub at: LocalTime,
}

/// Immutable result of the last successful run plus reload status
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub findings: Arc<FindingsList>,
    /// When the findings were produced; `None` until the first success
    pub generated_at: Option<LocalTime>,
    pub grid_size: usize,
    /// Set when the most recent reload failed
    pub last_error: Option<ReloadFailure>,
}

impl Snapshot {
    pub fn new(findings: FindingsList, grid_size: usize, generated_at: LocalTime) -> Self {
        Self {
            findings: Arc::new(findings),
            generated_at: Some(generated_at),
            grid_size,
            last_error: None,
        }
    }
}

/// Holder of the currently published [`Snapshot`]
#[derive(Clone, Default)]
pub struct SnapshotStore {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot; stays valid even if a reload publishes meanwhile
    pub async fn current(&self) -> Arc<Snapshot> {
        self.current.read().await.clone()
    }

    /// Replace the published snapshot
    pub async fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        *self.current.write().await = snapshot.clone();
        snapshot
    }

    /// Keep the published findings but flag the failed reload
    pub async fn record_failure(&self, message: String, at: LocalTime) -> Arc<Snapshot> {
        let mut current = self.current.write().await;
        let mut next = Snapshot::clone(&current);
        next.last_error = Some(ReloadFailure { message, at });
        let next = Arc::new(next);
        *current = next.clone();
        next
    }
}
