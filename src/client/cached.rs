//! Cached backend reads
//!
//! Each read is memoized in the shared [`ResponseCache`](crate::cache::ResponseCache)
//! under a namespaced key with a per-endpoint TTL. Writes elsewhere in the
//! system call the `clear_*` methods to drop affected entries.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{cache_key_for, query_pairs, SharedCache};
use crate::client::backend::Backend;
use crate::error::Result;
use crate::models::{Booking, Hotel, HostBookingFilters, PeriodFilters, SearchParams};

pub const DASHBOARD_TTL: Duration = Duration::from_secs(2 * 60);
pub const HOTELS_TTL: Duration = Duration::from_secs(10 * 60);
pub const BOOKINGS_TTL: Duration = Duration::from_secs(2 * 60);
pub const ANALYTICS_TTL: Duration = Duration::from_secs(3 * 60);
pub const UPCOMING_TTL: Duration = Duration::from_secs(60);
pub const SEARCH_TTL: Duration = Duration::from_secs(3 * 60);

const HOTELS_KEY: &str = "host:hotels";
const BOOKINGS_PREFIX: &str = "host:bookings";
const SEARCH_PREFIX: &str = "search:hotels";

// == Cached API ==
pub struct CachedApi<B> {
    backend: Arc<B>,
    cache: SharedCache,
}

impl<B> Clone for CachedApi<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            cache: self.cache.clone(),
        }
    }
}

impl<B: Backend + 'static> CachedApi<B> {
    pub fn new(backend: B, cache: SharedCache) -> Self {
        Self {
            backend: Arc::new(backend),
            cache,
        }
    }

    pub fn cache(&self) -> &SharedCache {
        &self.cache
    }

    /// Returns the cached value under `key`, or runs `fetch` and caches its
    /// result for `ttl`. Fetch errors are returned and nothing is stored.
    pub async fn fetch_cached<F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let cached = self.cache.write().await.get(key);
        if let Some(value) = cached {
            return Ok(value);
        }

        let value = fetch().await?;
        self.cache.write().await.set(key, value.clone(), ttl);
        Ok(value)
    }

    /// Typed [`fetch_cached`](Self::fetch_cached): a fetched value is cached
    /// only if it decodes as `T`, so a malformed response is reported once
    /// and the next call goes back to the backend.
    pub async fn fetch_cached_as<T, F, Fut>(&self, key: &str, ttl: Duration, fetch: F) -> Result<T>
    where
        T: DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        let cached = self.cache.write().await.get_as::<T>(key);
        match cached {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => {
                warn!(key, "Dropping cache entry that no longer decodes: {}", e);
                self.cache.write().await.delete(key);
            }
        }

        let value = fetch().await?;
        let decoded = T::deserialize(&value)?;
        self.cache.write().await.set(key, value, ttl);
        Ok(decoded)
    }

    async fn read<T: DeserializeOwned>(
        &self,
        key: &str,
        ttl: Duration,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        self.fetch_cached_as(key, ttl, || self.backend.get_json(path, &query))
            .await
    }

    // == Host dashboard ==
    pub async fn dashboard_summary(&self) -> Result<Value> {
        self.read("host:dashboard:summary", DASHBOARD_TTL, "/host/dashboard/summary", Vec::new())
            .await
    }

    /// Host hotels, served stale-while-revalidate: a cached list is returned
    /// at once and refreshed in the background.
    pub async fn hotels(&self) -> Result<Vec<Hotel>> {
        let cached = self.cache.write().await.get_as::<Vec<Hotel>>(HOTELS_KEY);
        match cached {
            Ok(Some(hotels)) => {
                self.refresh_hotels();
                return Ok(hotels);
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Dropping cached hotels that no longer decode: {}", e);
                self.cache.write().await.delete(HOTELS_KEY);
            }
        }

        let value = self.backend.get_json("/host/hotels", &[]).await?;
        let hotels = Vec::<Hotel>::deserialize(&value)?;
        self.cache.write().await.set(HOTELS_KEY, value, HOTELS_TTL);
        Ok(hotels)
    }

    fn refresh_hotels(&self) -> JoinHandle<()> {
        let backend = self.backend.clone();
        let cache = self.cache.clone();
        tokio::spawn(async move {
            let fresh = match backend.get_json("/host/hotels", &[]).await {
                Ok(fresh) => fresh,
                Err(e) => {
                    warn!("Failed to refresh hotels cache: {}", e);
                    return;
                }
            };
            if let Err(e) = Vec::<Hotel>::deserialize(&fresh) {
                warn!("Discarding undecodable hotels refresh: {}", e);
                return;
            }
            cache.write().await.set(HOTELS_KEY, fresh, HOTELS_TTL);
            debug!("Hotels cache refreshed");
        })
    }

    // == Bookings ==
    pub async fn host_bookings(&self, filters: &HostBookingFilters) -> Result<Vec<Booking>> {
        let key = cache_key_for(BOOKINGS_PREFIX, filters)?;
        self.read(&key, BOOKINGS_TTL, "/host/bookings", query_pairs(filters)?)
            .await
    }

    pub async fn all_host_bookings(&self) -> Result<Vec<Booking>> {
        self.read("host:bookings:all", BOOKINGS_TTL, "/host/bookings/all", Vec::new())
            .await
    }

    pub async fn upcoming_bookings(&self, hotel_id: u64) -> Result<Vec<Booking>> {
        self.read(
            &format!("host:bookings:upcoming:{hotel_id}"),
            UPCOMING_TTL,
            &format!("/host/bookings/{hotel_id}/upcoming"),
            Vec::new(),
        )
        .await
    }

    pub async fn pending_check_ins(&self, hotel_id: u64) -> Result<Vec<Booking>> {
        self.read(
            &format!("host:bookings:pending-checkins:{hotel_id}"),
            UPCOMING_TTL,
            &format!("/host/bookings/{hotel_id}/pending-checkins"),
            Vec::new(),
        )
        .await
    }

    pub async fn pending_check_outs(&self, hotel_id: u64) -> Result<Vec<Booking>> {
        self.read(
            &format!("host:bookings:pending-checkouts:{hotel_id}"),
            UPCOMING_TTL,
            &format!("/host/bookings/{hotel_id}/pending-checkouts"),
            Vec::new(),
        )
        .await
    }

    // == Analytics ==
    pub async fn analytics(&self, filters: Option<&PeriodFilters>) -> Result<Value> {
        let key = cache_key_for("host:analytics", &filters)?;
        self.read(&key, ANALYTICS_TTL, "/host/bookings/analytics", query_pairs(&filters)?)
            .await
    }

    pub async fn earnings(&self, filters: Option<&PeriodFilters>) -> Result<Value> {
        let key = cache_key_for("host:earnings", &filters)?;
        self.read(&key, ANALYTICS_TTL, "/host/bookings/earnings", query_pairs(&filters)?)
            .await
    }

    // == Public search ==
    pub async fn search_hotels(&self, params: &SearchParams) -> Result<Value> {
        let key = cache_key_for(SEARCH_PREFIX, params)?;
        self.read(&key, SEARCH_TTL, "/public/hotels/search", query_pairs(params)?)
            .await
    }

    // == Invalidation ==
    /// Drops the hotel list and every booking read.
    pub async fn clear_host_cache(&self) -> usize {
        let mut cache = self.cache.write().await;
        let removed = usize::from(cache.delete(HOTELS_KEY)) + cache.delete_prefix(BOOKINGS_PREFIX);
        info!(removed, "Host cache cleared");
        removed
    }

    /// Booking keys are not indexed by hotel, so this clears all host reads.
    pub async fn clear_booking_cache(&self, hotel_id: Option<u64>) -> usize {
        debug!(?hotel_id, "Clearing booking cache");
        self.clear_host_cache().await
    }

    pub async fn clear_search_cache(&self) -> usize {
        let removed = self.cache.write().await.delete_prefix(SEARCH_PREFIX);
        info!(removed, "Search cache cleared");
        removed
    }

    pub async fn clear_search_cache_for_query(&self, params: &SearchParams) -> Result<bool> {
        let key = cache_key_for(SEARCH_PREFIX, params)?;
        Ok(self.cache.write().await.delete(&key))
    }
}
