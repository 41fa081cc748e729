//! API Routes
//!
//! Configures the Axum router with all endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_handler, health_handler, search_hotels_handler, stats_handler,
    sweep_handler, task_handler, workers_status_handler, AppState,
};

/// Creates the main router.
///
/// # Endpoints
/// - `GET /health`
/// - `GET /cache/stats`
/// - `DELETE /cache`, `DELETE /cache/:key`
/// - `POST /cache/sweep`
/// - `GET /workers/status`
/// - `POST /tasks`
/// - `GET /search/hotels`
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/cache", delete(clear_handler))
        .route("/cache/stats", get(stats_handler))
        .route("/cache/sweep", post(sweep_handler))
        .route("/cache/:key", delete(delete_handler))
        .route("/workers/status", get(workers_status_handler))
        .route("/tasks", post(task_handler))
        .route("/search/hotels", get(search_hotels_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
