use std::sync::Arc;

use axum::{
    extract::State,
    http::header,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use chrono::SecondsFormat;
use serde::Serialize;

use crate::config::Config;
use crate::dashboard::render_page;
use crate::error::AppError;
use crate::refresh::run_refresh;
use crate::state::SnapshotStore;
use crate::types::AnalysisSnapshot;

#[derive(Clone)]
pub struct ApiState {
    pub cfg: Config,
    pub store: Arc<SnapshotStore>,
}

pub fn router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(get_dashboard))
        .route("/update", get(get_update))
        .route("/snapshot", get(get_snapshot))
        .route("/health", get(get_health))
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct UpdateResponse {
    pub status: &'static str,
    pub assets: usize,
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub portfolio_assets: usize,
    pub watchlist_assets: usize,
    pub last_update: Option<String>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// The dashboard itself. Always served fresh — the refresh flow reloads this
/// page with a cache-busting query parameter, and a cached copy would defeat it.
async fn get_dashboard(State(state): State<ApiState>) -> impl IntoResponse {
    let snapshot = state.store.read().await;
    let body = render_page(&snapshot, state.cfg.missing_data_policy);
    (
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CACHE_CONTROL, "no-store"),
        ],
        Html(body),
    )
}

/// Recompute the snapshot from the exchanges. A second call while one is in
/// flight gets 409; timeout or fetch failure gets 5xx and the old snapshot
/// stays visible.
async fn get_update(
    State(state): State<ApiState>,
) -> Result<impl IntoResponse, AppError> {
    let assets = run_refresh(&state.cfg, &state.store).await?;
    Ok((
        [(header::CACHE_CONTROL, "no-store")],
        Json(UpdateResponse {
            status: "ok",
            assets,
        }),
    ))
}

/// The raw analysis snapshot as JSON — the same data the page renders, for
/// scripting against the dashboard without scraping markup.
async fn get_snapshot(State(state): State<ApiState>) -> Json<AnalysisSnapshot> {
    Json(state.store.read().await)
}

async fn get_health(State(state): State<ApiState>) -> Json<HealthResponse> {
    let snapshot = state.store.read().await;
    Json(HealthResponse {
        portfolio_assets: snapshot.portfolio.len(),
        watchlist_assets: snapshot.watchlist.len(),
        last_update: snapshot
            .last_update
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true)),
    })
}
