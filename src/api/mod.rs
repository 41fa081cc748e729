//! API Module
//!
//! HTTP handlers and routing for the local REST surface.
//!
//! # Endpoints
//! - `GET /health` - Health check
//! - `GET /cache/stats` - Cache statistics
//! - `DELETE /cache` - Drop every cached response
//! - `DELETE /cache/:key` - Drop one cached response
//! - `POST /cache/sweep` - Remove expired entries now
//! - `GET /workers/status` - Worker pool occupancy
//! - `POST /tasks` - Run a worker task (`{taskId, type, payload}`)
//! - `GET /search/hotels` - Cached public hotel search

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
