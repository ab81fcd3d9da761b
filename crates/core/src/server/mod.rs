//! Read-only viewer boundary.
//!
//! The viewer is a separate process that only reads the persisted cycle
//! log. This module exposes that boundary over HTTP: aggregate stats, the
//! filtered cycle list, single-cycle detail, and screenshot passthrough,
//! plus an embedded dashboard page.
//!
//! The server holds its own `CycleStore` and refreshes it from disk before
//! answering queries (mtime check, then `reload()`); it never writes. A
//! reload that fails, e.g. a transient bad read, keeps serving the stale
//! cache and retries on the next request.

pub mod assets;

use crate::store::CycleStore;
use axum::extract::{Path as AxumPath, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use dp_protocol::{Cycle, CycleFilter, CycleStatus, SortOrder, StoreStats};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Shared state: the viewer's own read-only store handle.
pub struct ViewerState {
    store: RwLock<CycleStore>,
    last_seen_mtime: RwLock<Option<SystemTime>>,
}

impl ViewerState {
    pub fn new(store: CycleStore) -> Self {
        Self {
            store: RwLock::new(store),
            last_seen_mtime: RwLock::new(None),
        }
    }

    /// Reload the cache if the document changed on disk since the last
    /// look. Reload failures are tolerated: the stale cache keeps serving.
    async fn refresh(&self) {
        let path = { self.store.read().await.path().to_path_buf() };
        let mtime = std::fs::metadata(&path).and_then(|m| m.modified()).ok();

        let changed = {
            let last = self.last_seen_mtime.read().await;
            *last != mtime
        };
        if !changed {
            return;
        }

        let mut store = self.store.write().await;
        if store.reload().is_ok() {
            *self.last_seen_mtime.write().await = mtime;
            debug!("viewer cache refreshed");
        }
    }
}

/// Query-string shape of `GET /api/cycles`.
#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
    status: Option<CycleStatus>,
    since: Option<chrono::DateTime<chrono::Utc>>,
    until: Option<chrono::DateTime<chrono::Utc>>,
    q: Option<String>,
    sort: Option<SortOrder>,
}

impl ListParams {
    fn into_filter_and_sort(self) -> (CycleFilter, SortOrder) {
        (
            CycleFilter {
                status: self.status,
                since: self.since,
                until: self.until,
                query: self.q,
            },
            self.sort.unwrap_or_default(),
        )
    }
}

/// Build the viewer router.
pub fn build_router(state: Arc<ViewerState>) -> Router {
    Router::new()
        .route("/", get(handle_index))
        .route("/api/stats", get(handle_stats))
        .route("/api/cycles", get(handle_list))
        .route("/api/cycles/{id}", get(handle_get))
        .route("/api/screenshots/{id}", get(handle_screenshot))
        .with_state(state)
}

/// Serve the viewer until the process is stopped.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(store: CycleStore, addr: SocketAddr) -> anyhow::Result<()> {
    let state = Arc::new(ViewerState::new(store));
    let router = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %addr, "viewer listening");
    axum::serve(listener, router).await?;
    Ok(())
}

async fn handle_index() -> Html<String> {
    Html(assets::dashboard_page())
}

async fn handle_stats(State(state): State<Arc<ViewerState>>) -> Json<StoreStats> {
    state.refresh().await;
    let stats = state.store.read().await.stats();
    Json(stats)
}

async fn handle_list(
    State(state): State<Arc<ViewerState>>,
    Query(params): Query<ListParams>,
) -> Json<Vec<Cycle>> {
    state.refresh().await;
    let (filter, sort) = params.into_filter_and_sort();
    let cycles = state.store.read().await.list(&filter, sort);
    Json(cycles)
}

async fn handle_get(
    State(state): State<Arc<ViewerState>>,
    AxumPath(id): AxumPath<u64>,
) -> Response {
    state.refresh().await;
    let store = state.store.read().await;
    match store.get(id) {
        Some(cycle) => Json(cycle.clone()).into_response(),
        None => not_found(format!("cycle {id} not found")),
    }
}

/// Static byte passthrough of the referenced screenshot; no transformation.
async fn handle_screenshot(
    State(state): State<Arc<ViewerState>>,
    AxumPath(id): AxumPath<u64>,
) -> Response {
    state.refresh().await;
    let screenshot_path = {
        let store = state.store.read().await;
        store.get(id).and_then(|c| c.screenshot_path.clone())
    };

    let Some(path) = screenshot_path else {
        return not_found(format!("cycle {id} has no screenshot"));
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Err(_) => not_found(format!("screenshot for cycle {id} is missing on disk")),
    }
}

fn not_found(message: String) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}
