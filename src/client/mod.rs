//! Backend client
//!
//! Transport to the StayHub REST API and the cached reads built on it.

pub mod backend;
pub mod cached;

pub use backend::{Backend, DynBackend, HttpBackend};
pub use cached::CachedApi;
