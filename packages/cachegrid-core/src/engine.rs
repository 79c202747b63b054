//! Engine facade: lifecycle, health reporting, and batch operations built
//! on top of a [`StorageCore`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use crate::config::CacheConfig;
use crate::entry::now_millis;
use crate::error::CoreError;
use crate::storage::{Expirer, StatsSnapshot, StorageCore};

/// Coarse health state reported by [`Engine::health`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Stopped,
}

/// Point-in-time health report.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub uptime_seconds: f64,
    pub entry_count: u64,
    pub hit_ratio: f64,
    pub memory_mb: f64,
    pub last_check_millis: i64,
}

/// Owns a [`StorageCore`] and the background expirer, and exposes the
/// lifecycle-aware surface the HTTP adapter calls through.
///
/// `start`/`stop` are idempotent. All other operations fail with
/// [`CoreError::NotRunning`] unless the engine is currently started.
pub struct Engine {
    core: Arc<StorageCore>,
    config: CacheConfig,
    running: AtomicBool,
    started_at_millis: AtomicI64,
    expirer: Mutex<Option<Expirer>>,
}

impl Engine {
    /// Builds a new engine, not yet started.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        let core = Arc::new(StorageCore::new(
            config.max_entries,
            config.max_bytes,
            config.policy,
        ));
        Self {
            core,
            config,
            running: AtomicBool::new(false),
            started_at_millis: AtomicI64::new(0),
            expirer: Mutex::new(None),
        }
    }

    /// Starts the background expirer and marks the engine running.
    ///
    /// Idempotent: calling `start` while already running is a no-op.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }
        self.started_at_millis.store(now_millis(), Ordering::SeqCst);
        let expirer = Expirer::spawn(Arc::clone(&self.core), self.config.cleanup_interval);
        *self.expirer.lock() = Some(expirer);
    }

    /// Stops the background expirer and marks the engine not running.
    ///
    /// Idempotent: calling `stop` while already stopped is a no-op. Waits
    /// for the expirer task to terminate before returning.
    pub async fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }
        let expirer = self.expirer.lock().take();
        if let Some(expirer) = expirer {
            expirer.stop().await;
        }
    }

    /// Returns `true` if the engine is currently started.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn ensure_running(&self) -> Result<(), CoreError> {
        if self.running.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CoreError::NotRunning)
        }
    }

    /// Looks up a single key.
    pub fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        self.ensure_running()?;
        Ok(self.core.get(key))
    }

    /// Inserts or replaces a single key.
    pub fn set(
        &self,
        key: &str,
        value: Value,
        ttl: Option<Duration>,
        tags: std::collections::HashSet<String>,
    ) -> Result<(), CoreError> {
        self.ensure_running()?;
        self.core.set(key, value, ttl, tags)
    }

    /// Deletes a single key.
    pub fn delete(&self, key: &str) -> Result<bool, CoreError> {
        self.ensure_running()?;
        Ok(self.core.delete(key))
    }

    /// Removes all entries, returning the count removed.
    pub fn clear(&self) -> Result<u64, CoreError> {
        self.ensure_running()?;
        Ok(self.core.clear(self.config.policy))
    }

    /// Lists keys, optionally filtered by literal substring.
    pub fn get_keys(&self, substring: Option<&str>) -> Result<Vec<String>, CoreError> {
        self.ensure_running()?;
        Ok(self.core.get_keys(substring))
    }

    /// Returns the current statistics snapshot.
    pub fn stats(&self) -> Result<StatsSnapshot, CoreError> {
        self.ensure_running()?;
        Ok(self.core.stats())
    }

    /// Fetches each of `keys`, returning only those that hit.
    ///
    /// Not atomic across keys: each lookup is applied independently, and a
    /// partial result (fewer entries than requested) is the normal outcome
    /// when some keys miss.
    pub fn get_multi(&self, keys: &[String]) -> Result<HashMap<String, Value>, CoreError> {
        self.ensure_running()?;
        let mut result = HashMap::with_capacity(keys.len());
        for key in keys {
            if let Some(value) = self.core.get(key) {
                result.insert(key.clone(), value);
            }
        }
        Ok(result)
    }

    /// Inserts every item in `items` with the same optional TTL, returning
    /// the count successfully inserted.
    ///
    /// Not atomic: each key is applied independently, and a partial count
    /// (fewer than `items.len()`) is normal if some inserts are refused.
    pub fn set_multi(
        &self,
        items: HashMap<String, Value>,
        ttl: Option<Duration>,
    ) -> Result<u64, CoreError> {
        self.ensure_running()?;
        let mut inserted = 0u64;
        for (key, value) in items {
            if self.core.set(&key, value, ttl, std::collections::HashSet::new()).is_ok() {
                inserted += 1;
            }
        }
        Ok(inserted)
    }

    /// Reports coarse health, regardless of running state.
    #[must_use]
    pub fn health(&self) -> HealthReport {
        let now = now_millis();
        if !self.running.load(Ordering::SeqCst) {
            return HealthReport {
                status: HealthStatus::Stopped,
                uptime_seconds: 0.0,
                entry_count: 0,
                hit_ratio: 0.0,
                memory_mb: 0.0,
                last_check_millis: now,
            };
        }

        let stats = self.core.stats();
        let started_at = self.started_at_millis.load(Ordering::SeqCst);
        HealthReport {
            status: HealthStatus::Healthy,
            uptime_seconds: (now - started_at).max(0) as f64 / 1000.0,
            entry_count: stats.entry_count,
            hit_ratio: stats.hit_ratio,
            memory_mb: stats.total_bytes as f64 / (1024.0 * 1024.0),
            last_check_millis: now,
        }
    }
}
