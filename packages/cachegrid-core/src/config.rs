//! Core-level cache configuration, independent of any HTTP adapter.

use std::time::Duration;

use crate::policy::PolicyKind;

/// Bounds and policy choice for a [`crate::Engine`]/[`crate::StorageCore`] pair.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before eviction kicks in.
    pub max_entries: u64,
    /// Maximum total estimated byte size before eviction kicks in.
    pub max_bytes: u64,
    /// Period between background expiry sweeps.
    pub cleanup_interval: Duration,
    /// Eviction policy to construct the storage core with.
    pub policy: PolicyKind,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_bytes: 100 * 1024 * 1024,
            cleanup_interval: Duration::from_secs(60),
            policy: PolicyKind::Lru,
        }
    }
}
