//! Configuration Module
//!
//! Handles loading the client configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default TTL in seconds for entries without explicit TTL
    pub default_ttl: u64,
    /// Background sweep interval in seconds
    pub cleanup_interval: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Base URL of the StayHub REST API
    pub api_base_url: String,
    /// Bearer token forwarded to the backend, if any
    pub api_token: Option<String>,
    /// Backend request timeout in seconds
    pub request_timeout: u64,
    /// Number of workers in the computation pool
    pub worker_pool_size: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `DEFAULT_TTL` - Default TTL in seconds (default: 300)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `API_BASE_URL` - Backend base URL (default: http://localhost:8080/api)
    /// - `API_TOKEN` - Optional bearer token
    /// - `REQUEST_TIMEOUT` - Backend timeout in seconds (default: 30)
    /// - `WORKER_POOL_SIZE` - Worker count (default: 4)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            default_ttl: parse_var("DEFAULT_TTL").unwrap_or(defaults.default_ttl),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            api_base_url: env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            api_token: env::var("API_TOKEN").ok().filter(|t| !t.is_empty()),
            request_timeout: parse_var("REQUEST_TIMEOUT").unwrap_or(defaults.request_timeout),
            worker_pool_size: parse_var("WORKER_POOL_SIZE").unwrap_or(defaults.worker_pool_size),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_ttl: 300,
            cleanup_interval: 300,
            server_port: 3000,
            api_base_url: "http://localhost:8080/api".to_string(),
            api_token: None,
            request_timeout: 30,
            worker_pool_size: 4,
        }
    }
}
