//! Background expiry sweeper.
//!
//! Periodically sweeps a [`StorageCore`] for TTL-expired entries. The sweep
//! interval races a `tokio::sync::watch` shutdown signal, following the same
//! cancellation idiom the HTTP adapter's shutdown controller uses: a
//! broadcast-style watch channel that every listener can observe without
//! consuming it.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::StorageCore;

/// Owns the background sweep task and its shutdown signal.
pub struct Expirer {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl Expirer {
    /// Spawns the sweep loop on the current Tokio runtime.
    pub fn spawn(core: Arc<StorageCore>, interval: Duration) -> Self {
        let (shutdown, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The first tick fires immediately; skip it so the first real
            // sweep happens after one full interval.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let reclaimed = core.evict_expired_sweep();
                        if reclaimed > 0 {
                            debug!(reclaimed, "background expirer reclaimed entries");
                        }
                    }
                    result = shutdown_rx.changed() => {
                        if result.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        Self { shutdown, handle }
    }

    /// Signals the sweep loop to stop and waits for it to terminate.
    ///
    /// Consumes `self`, so it can only be called once; repeated-stop
    /// idempotence is handled one layer up by `Engine`, which holds the
    /// `Expirer` behind a `Mutex<Option<Expirer>>` and `take`s it before
    /// calling this.
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        if let Err(err) = self.handle.await {
            warn!(%err, "background expirer task panicked");
        }
    }
}
