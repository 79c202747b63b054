//! Pluggable eviction policies.
//!
//! An [`EvictionPolicy`] is a small state machine notified of every insert,
//! access, and removal, and asked to name a victim when the storage core
//! needs to free space. All four methods are called from inside
//! [`StorageCore`](crate::storage::StorageCore)'s single lock, so policies
//! need no internal synchronization of their own.

mod lfu;
mod lru;
mod ttl;

pub use lfu::LfuPolicy;
pub use lru::LruPolicy;
pub use ttl::TtlPolicy;

use std::collections::HashMap;

use crate::entry::Entry;

/// Which concrete eviction policy a `StorageCore` is configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    /// Least-recently-used.
    Lru,
    /// Least-frequently-used.
    Lfu,
    /// Evicts only entries whose TTL has already passed.
    Ttl,
}

impl PolicyKind {
    /// Builds a fresh, empty policy instance of this kind.
    #[must_use]
    pub fn build(self) -> Box<dyn EvictionPolicy> {
        match self {
            PolicyKind::Lru => Box::new(LruPolicy::new()),
            PolicyKind::Lfu => Box::new(LfuPolicy::new()),
            PolicyKind::Ttl => Box::new(TtlPolicy::new()),
        }
    }

    /// Parses a policy name from configuration/HTTP input.
    ///
    /// Accepts `"lru"`, `"lfu"`, `"ttl"` case-insensitively.
    pub fn parse(name: &str) -> Result<Self, crate::error::CoreError> {
        match name.to_ascii_lowercase().as_str() {
            "lru" => Ok(PolicyKind::Lru),
            "lfu" => Ok(PolicyKind::Lfu),
            "ttl" => Ok(PolicyKind::Ttl),
            other => Err(crate::error::CoreError::InvalidArgument(format!(
                "unknown eviction policy: {other}"
            ))),
        }
    }
}

/// Eviction policy contract: tracks per-key ordering metadata and names a
/// victim on demand. Implementations must tolerate `on_remove` for keys
/// they never saw, and must never name a key absent from `entries`.
pub trait EvictionPolicy: Send + Sync + std::fmt::Debug {
    /// Short, stable name surfaced in `stats.policy_name`.
    fn name(&self) -> &'static str;

    /// Called after a successful insert of a new key.
    fn on_insert(&mut self, key: &str, entry: &Entry);

    /// Called after a successful non-expired read.
    fn on_access(&mut self, key: &str, entry: &Entry);

    /// Called after any removal (delete, expiry, eviction).
    fn on_remove(&mut self, key: &str);

    /// Returns a key currently in `entries` whose removal is permitted, or
    /// `None` if the policy cannot name a victim.
    fn select_victim(&mut self, now_millis: i64, entries: &HashMap<String, Entry>) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_known_names_case_insensitively() {
        assert_eq!(PolicyKind::parse("LRU").unwrap(), PolicyKind::Lru);
        assert_eq!(PolicyKind::parse("lfu").unwrap(), PolicyKind::Lfu);
        assert_eq!(PolicyKind::parse("Ttl").unwrap(), PolicyKind::Ttl);
    }

    #[test]
    fn parse_rejects_unknown_names() {
        assert!(PolicyKind::parse("random").is_err());
    }
}
