//! Shared analysis snapshot. One writer path (/update or the background
//! refresher), many readers (render passes). Renders read a clone so a
//! refresh never mutates a page mid-render.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::types::AnalysisSnapshot;

pub struct SnapshotStore {
    snapshot: RwLock<AnalysisSnapshot>,
    /// Set while a refresh pass is running — concurrent /update calls are
    /// rejected instead of doubling the exchange load.
    refresh_in_flight: AtomicBool,
}

impl SnapshotStore {
    pub fn new(initial: AnalysisSnapshot) -> Arc<Self> {
        Arc::new(Self {
            snapshot: RwLock::new(initial),
            refresh_in_flight: AtomicBool::new(false),
        })
    }

    pub async fn read(&self) -> AnalysisSnapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn replace(&self, snapshot: AnalysisSnapshot) {
        *self.snapshot.write().await = snapshot;
    }

    /// Claim the refresh slot. Returns false if a refresh is already running.
    pub fn begin_refresh(&self) -> bool {
        self.refresh_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn end_refresh(&self) {
        self.refresh_in_flight.store(false, Ordering::Release);
    }
}
