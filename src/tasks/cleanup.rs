//! TTL Sweep Task
//!
//! Background task that periodically drops expired cache entries. Reads
//! already ignore stale entries; the sweep only bounds memory.

use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::SharedCache;

/// Handle to a running sweep task.
#[derive(Debug)]
pub struct CleanupTask {
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl CleanupTask {
    /// Signals the loop to stop and waits for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = self.handle.await {
            if !e.is_cancelled() {
                warn!("Cleanup task ended abnormally: {}", e);
            }
        }
    }

    /// Stops the task without waiting.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Spawns a background task that calls `clean_expired` every `interval`.
///
/// The first sweep happens one full interval after spawning.
///
/// # Example
/// ```ignore
/// let cache = ResponseCache::shared(DEFAULT_TTL);
/// let sweeper = spawn_cleanup_task(cache.clone(), DEFAULT_CLEANUP_INTERVAL);
/// // Later, during shutdown:
/// sweeper.shutdown().await;
/// ```
pub fn spawn_cleanup_task(cache: SharedCache, interval: Duration) -> CleanupTask {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        info!("Starting cache sweep task with interval of {:?}", interval);

        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    info!("Cache sweep task stopped");
                    break;
                }
                _ = ticker.tick() => {
                    let removed = cache.write().await.clean_expired();

                    if removed > 0 {
                        info!("Cache sweep: removed {} expired entries", removed);
                    } else {
                        debug!("Cache sweep: no expired entries found");
                    }
                }
            }
        }
    });

    CleanupTask {
        shutdown_tx: Some(shutdown_tx),
        handle,
    }
}
