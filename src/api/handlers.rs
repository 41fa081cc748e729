//! API Handlers
//!
//! HTTP request handlers for the cache, worker and search endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::cache::{ResponseCache, SharedCache};
use crate::client::{CachedApi, DynBackend, HttpBackend};
use crate::config::Config;
use crate::error::Result;
use crate::models::{HealthResponse, InvalidateResponse, SearchParams, StatsResponse};
use crate::workers::{PoolStatus, TaskEnvelope, TaskResponse, WorkerPool};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: SharedCache,
    pub workers: Arc<WorkerPool>,
    pub api: CachedApi<DynBackend>,
}

impl AppState {
    pub fn new(cache: SharedCache, workers: Arc<WorkerPool>, backend: DynBackend) -> Self {
        Self {
            api: CachedApi::new(backend, cache.clone()),
            cache,
            workers,
        }
    }

    /// Builds the cache, the worker pool and the HTTP backend from configuration.
    ///
    /// Spawns the pool's workers, so must run inside a tokio runtime.
    pub fn from_config(config: &Config) -> Result<Self> {
        let cache = ResponseCache::shared(config.default_ttl());
        let workers = Arc::new(WorkerPool::new("compute", config.worker_pool_size));
        let backend: DynBackend = Arc::new(HttpBackend::from_config(config)?);
        Ok(Self::new(cache, workers, backend))
    }
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.read().await.stats();
    Json(stats.into())
}

/// Handler for DELETE /cache
pub async fn clear_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let removed = state.cache.write().await.clear();
    info!(removed, "Cache cleared");
    Json(InvalidateResponse::cleared(removed))
}

/// Handler for DELETE /cache/:key
///
/// Deleting a key that is not cached is not an error.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Json<InvalidateResponse> {
    let removed = state.cache.write().await.delete(&key);
    Json(InvalidateResponse::deleted(&key, removed))
}

/// Handler for POST /cache/sweep
pub async fn sweep_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let removed = state.cache.write().await.clean_expired();
    Json(InvalidateResponse::swept(removed))
}

/// Handler for GET /workers/status
pub async fn workers_status_handler(State(state): State<AppState>) -> Json<PoolStatus> {
    Json(state.workers.status())
}

/// Handler for POST /tasks
///
/// Any `{taskId, type, payload}` envelope is answered with its task id;
/// unknown types, bad payloads and task failures travel in the `error`
/// field. Bodies that are not an envelope are rejected by the extractor.
pub async fn task_handler(
    State(state): State<AppState>,
    Json(envelope): Json<TaskEnvelope>,
) -> Json<TaskResponse> {
    let response = match envelope.into_request() {
        Ok(request) => state.workers.handle_message(request).await,
        Err(rejected) => rejected,
    };
    if response.is_error() {
        warn!(task_id = %response.task_id, "Task request failed");
    }
    Json(response)
}

/// Handler for GET /search/hotels
pub async fn search_hotels_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Value>> {
    Ok(Json(state.api.search_hotels(&params).await?))
}
