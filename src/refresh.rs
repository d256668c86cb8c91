//! Snapshot refresh: one shared entry point used by the /update handler and
//! the optional periodic refresher. Concurrent refreshes coalesce — the
//! in-flight guard rejects the second caller instead of doubling exchange
//! load.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{interval, timeout};
use tracing::{error, info};

use crate::analyzer::build_snapshot;
use crate::config::{Config, REFRESH_DEADLINE_SECS};
use crate::error::{AppError, Result};
use crate::fetcher::build_client;
use crate::state::SnapshotStore;

/// Releases the refresh slot on drop, so a panic or cancellation inside the
/// rebuild can never leave the guard held and every later /update at 409.
struct RefreshSlot<'a>(&'a SnapshotStore);

impl Drop for RefreshSlot<'_> {
    fn drop(&mut self) {
        self.0.end_refresh();
    }
}

/// Rebuild the snapshot and swap it into the store. Returns the number of
/// analyzed assets. On timeout or error the previous snapshot stays in place.
pub async fn run_refresh(cfg: &Config, store: &SnapshotStore) -> Result<usize> {
    if !store.begin_refresh() {
        return Err(AppError::RefreshInFlight);
    }
    let _slot = RefreshSlot(store);
    refresh_inner(cfg, store).await
}

async fn refresh_inner(cfg: &Config, store: &SnapshotStore) -> Result<usize> {
    let client = build_client()?;
    let deadline = Duration::from_secs(REFRESH_DEADLINE_SECS);

    let snapshot = timeout(deadline, build_snapshot(cfg, &client, Some(Utc::now())))
        .await
        .map_err(|_| AppError::RefreshTimeout(REFRESH_DEADLINE_SECS))?;

    let count = snapshot.asset_count();
    store.replace(snapshot).await;
    info!(assets = count, "snapshot refreshed");
    Ok(count)
}

/// Optional background refresher (REFRESH_INTERVAL_SECS > 0). The reference
/// behavior is manual-only; this keeps long-lived deployments fresh without
/// anyone clicking the button.
pub struct PeriodicRefresher {
    cfg: Config,
    store: Arc<SnapshotStore>,
}

impl PeriodicRefresher {
    pub fn new(cfg: Config, store: Arc<SnapshotStore>) -> Self {
        Self { cfg, store }
    }

    pub async fn run(self) {
        let secs = self.cfg.refresh_interval_secs;
        if secs == 0 {
            return;
        }
        let mut ticker = interval(Duration::from_secs(secs));
        ticker.tick().await; // skip immediate first tick — bootstrap already ran

        loop {
            ticker.tick().await;
            match run_refresh(&self.cfg, &self.store).await {
                Ok(assets) => info!(assets, "periodic refresh complete"),
                // A manual refresh in flight is fine — this tick just skips.
                Err(AppError::RefreshInFlight) => {}
                Err(e) => error!("periodic refresh failed: {e}"),
            }
        }
    }
}
