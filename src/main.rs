mod analyzer;
mod api;
mod config;
mod dashboard;
mod error;
mod fetcher;
mod indicators;
mod refresh;
mod state;
mod types;

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::analyzer::build_snapshot;
use crate::api::routes::{router, ApiState};
use crate::config::Config;
use crate::error::Result;
use crate::fetcher::build_client;
use crate::refresh::PeriodicRefresher;
use crate::state::SnapshotStore;

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Bootstrap: initial snapshot, last_update stays unset until the
    // first /update (the status bar is empty on first load) ---
    let client = build_client()?;
    let snapshot = build_snapshot(&cfg, &client, None).await;
    info!(
        "Bootstrap complete: {} portfolio + {} watchlist assets",
        snapshot.portfolio.len(),
        snapshot.watchlist.len(),
    );
    if snapshot.asset_count() == 0 {
        // Empty sections render their headings by contract; the page still works.
        warn!("Bootstrap produced no analysis records — check asset lists and connectivity");
    }

    let store = SnapshotStore::new(snapshot);

    // --- Optional background refresher ---
    if cfg.refresh_interval_secs > 0 {
        info!(
            interval_secs = cfg.refresh_interval_secs,
            "periodic refresh enabled"
        );
        let refresher = PeriodicRefresher::new(cfg.clone(), Arc::clone(&store));
        tokio::spawn(async move { refresher.run().await });
    }

    // --- HTTP server ---
    let api_state = ApiState {
        cfg: cfg.clone(),
        store,
    };
    let app = router(api_state);
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Dashboard listening on http://{bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
