//! StayHub cache client
//!
//! Response caching and off-request computation for the StayHub hotel
//! booking API: a TTL cache with deterministic keys and a background sweep,
//! cached backend reads, and a worker pool for filtering, sorting and
//! booking analytics.

pub mod api;
pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod workers;

pub use api::AppState;
pub use cache::{generate_cache_key, ResponseCache, SharedCache};
pub use client::{Backend, CachedApi, HttpBackend};
pub use config::Config;
pub use error::{Error, Result};
pub use tasks::{spawn_cleanup_task, CleanupTask};
pub use workers::WorkerPool;
