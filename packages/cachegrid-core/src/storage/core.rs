//! Storage core: the concurrent, bounded key-value store.
//!
//! [`StorageCore`] owns the key→entry map, the tag secondary index,
//! byte/entry accounting, and the configured [`EvictionPolicy`]. Every
//! public method takes the single internal lock for its whole duration;
//! see the module-level note on the concurrency model in the crate root.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use crate::entry::{now_millis, Entry};
use crate::error::CoreError;
use crate::policy::{EvictionPolicy, PolicyKind};

/// Point-in-time statistics snapshot, safe to return by value outside the lock.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    pub entry_count: u64,
    pub max_entries: u64,
    pub total_bytes: u64,
    pub max_bytes: u64,
    pub memory_percent: f64,
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub hit_ratio: f64,
    pub evictions: u64,
    pub expired: u64,
    pub tag_count: u64,
    pub policy_name: &'static str,
}

struct Inner {
    entries: HashMap<String, Entry>,
    tag_index: HashMap<String, HashSet<String>>,
    policy: Box<dyn EvictionPolicy>,
    total_bytes: u64,
    accesses: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
    expired: u64,
}

impl Inner {
    fn index_tags(&mut self, key: &str, tags: &HashSet<String>) {
        for tag in tags {
            self.tag_index
                .entry(tag.clone())
                .or_default()
                .insert(key.to_string());
        }
    }

    fn unindex_tags(&mut self, key: &str, tags: &HashSet<String>) {
        for tag in tags {
            if let Some(bucket) = self.tag_index.get_mut(tag) {
                bucket.remove(key);
                if bucket.is_empty() {
                    self.tag_index.remove(tag);
                }
            }
        }
    }

    /// Removes `key` unconditionally: updates tag index, accounting, and
    /// notifies the policy. Returns the removed entry, if any.
    fn remove_entry(&mut self, key: &str) -> Option<Entry> {
        let entry = self.entries.remove(key)?;
        self.unindex_tags(key, &entry.tags);
        self.total_bytes = self.total_bytes.saturating_sub(entry.size_bytes);
        self.policy.on_remove(key);
        Some(entry)
    }

    /// Evicts entries until `entries.len() < max_entries` and
    /// `total_bytes + incoming_bytes <= max_bytes`, or the policy can no
    /// longer name a victim.
    fn make_space(&mut self, max_entries: u64, max_bytes: u64, incoming_bytes: u64, now: i64) -> bool {
        loop {
            let over_count = self.entries.len() as u64 >= max_entries;
            let over_bytes = self.total_bytes + incoming_bytes > max_bytes;
            if !over_count && !over_bytes {
                return true;
            }

            match self.policy.select_victim(now, &self.entries) {
                Some(victim) => {
                    // Re-check under lock: the policy may have named a key
                    // that was already removed by a prior eviction this loop.
                    if self.entries.contains_key(&victim) {
                        self.remove_entry(&victim);
                        self.evictions += 1;
                    }
                }
                None => return false,
            }
        }
    }
}

/// The concurrent, bounded key-value store described in the module docs.
pub struct StorageCore {
    inner: Mutex<Inner>,
    max_entries: u64,
    max_bytes: u64,
}

impl StorageCore {
    /// Creates a new, empty storage core with the given bounds and policy.
    #[must_use]
    pub fn new(max_entries: u64, max_bytes: u64, policy_kind: PolicyKind) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                tag_index: HashMap::new(),
                policy: policy_kind.build(),
                total_bytes: 0,
                accesses: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
                expired: 0,
            }),
            max_entries,
            max_bytes,
        }
    }

    /// Looks up `key`. Lazily expires it first if its TTL has passed.
    ///
    /// Lazy expiry is authoritative: a stale entry is never returned, whether
    /// or not the background expirer has reclaimed it yet.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = now_millis();
        let mut inner = self.inner.lock();
        inner.accesses += 1;

        let expired = inner.entries.get(key).is_some_and(|e| e.is_expired(now));
        if expired {
            inner.remove_entry(key);
            inner.expired += 1;
            inner.misses += 1;
            return None;
        }

        let inner = &mut *inner;
        match inner.entries.get_mut(key) {
            Some(entry) => {
                entry.touch(now);
                let value = entry.value.clone();
                inner.policy.on_access(key, entry);
                inner.hits += 1;
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Inserts or fully replaces `key`. Evicts as needed to satisfy the
    /// configured bounds; returns `Err(CoreError::Refused)` if no victim can
    /// be named and the new entry still does not fit.
    ///
    /// If `key` already existed, the old entry is removed before eviction is
    /// considered, even if the insert is ultimately refused — see the
    /// replacement-then-refusal note carried over from the reference design.
    pub fn set(
        &self,
        key: &str,
        value: Value,
        ttl: Option<Duration>,
        tags: HashSet<String>,
    ) -> Result<(), CoreError> {
        if key.is_empty() || key.len() > 250 {
            return Err(CoreError::InvalidArgument(
                "key must be 1..250 bytes".to_string(),
            ));
        }
        if ttl.is_some_and(|t| t.is_zero()) {
            return Err(CoreError::InvalidArgument(
                "ttl must be strictly positive".to_string(),
            ));
        }

        let now = now_millis();
        let entry = Entry::new(key, value, now, ttl, tags);
        let incoming_bytes = entry.size_bytes;

        let mut inner = self.inner.lock();
        inner.remove_entry(key);

        if !inner.make_space(self.max_entries, self.max_bytes, incoming_bytes, now) {
            return Err(CoreError::Refused);
        }

        inner.total_bytes += incoming_bytes;
        inner.index_tags(key, &entry.tags);
        inner.policy.on_insert(key, &entry);
        inner.entries.insert(key.to_string(), entry);
        Ok(())
    }

    /// Deletes `key`. Returns `true` iff it was present.
    pub fn delete(&self, key: &str) -> bool {
        let mut inner = self.inner.lock();
        inner.remove_entry(key).is_some()
    }

    /// Removes every entry, resetting accounting, the tag index, and the
    /// eviction policy. Returns the number of entries removed.
    pub fn clear(&self, policy_kind: PolicyKind) -> u64 {
        let mut inner = self.inner.lock();
        let count = inner.entries.len() as u64;
        inner.entries.clear();
        inner.tag_index.clear();
        inner.total_bytes = 0;
        inner.policy = policy_kind.build();
        count
    }

    /// Returns a snapshot of all keys present at call time, optionally
    /// filtered to those containing `substring` literally.
    #[must_use]
    pub fn get_keys(&self, substring: Option<&str>) -> Vec<String> {
        let inner = self.inner.lock();
        inner
            .entries
            .keys()
            .filter(|k| substring.is_none_or(|s| k.contains(s)))
            .cloned()
            .collect()
    }

    /// Returns a by-value statistics snapshot.
    #[must_use]
    pub fn stats(&self) -> StatsSnapshot {
        let inner = self.inner.lock();
        let hit_ratio = if inner.accesses == 0 {
            0.0
        } else {
            inner.hits as f64 / inner.accesses as f64
        };
        let memory_percent = if self.max_bytes == 0 {
            0.0
        } else {
            (inner.total_bytes as f64 / self.max_bytes as f64) * 100.0
        };

        StatsSnapshot {
            entry_count: inner.entries.len() as u64,
            max_entries: self.max_entries,
            total_bytes: inner.total_bytes,
            max_bytes: self.max_bytes,
            memory_percent,
            accesses: inner.accesses,
            hits: inner.hits,
            misses: inner.misses,
            hit_ratio,
            evictions: inner.evictions,
            expired: inner.expired,
            tag_count: inner.tag_index.len() as u64,
            policy_name: inner.policy.name(),
        }
    }

    /// Scans all entries and removes those whose TTL has passed, via the same
    /// path as lazy expiry. Used by the background expirer; also callable
    /// directly in tests.
    ///
    /// Returns the number of entries reclaimed.
    pub fn evict_expired_sweep(&self) -> u64 {
        let now = now_millis();
        let mut inner = self.inner.lock();
        let stale: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, e)| e.is_expired(now))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &stale {
            inner.remove_entry(key);
            inner.expired += 1;
        }
        stale.len() as u64
    }
}


/// Property-based tests for the invariants in spec section 8.
#[cfg(test)]
mod proptests {
    use std::collections::HashSet;

    use proptest::prelude::*;
    use serde_json::json;

    use super::*;

    /// Strategy for generating short ASCII keys distinct from each other.
    fn arb_key() -> impl Strategy<Value = String> {
        "[a-z]{1,8}"
    }

    proptest! {
        /// `set(k, v)` immediately followed by `get(k)` returns `v`, as long
        /// as nothing else touches `k` in between.
        #[test]
        fn set_then_get_round_trips(key in arb_key(), n in any::<i64>()) {
            let c = core(100, 10_000_000);
            c.set(&key, json!(n), None, HashSet::new()).unwrap();
            prop_assert_eq!(c.get(&key), Some(json!(n)));
        }

        /// Deleting twice is idempotent: the second delete reports absence.
        #[test]
        fn double_delete_returns_false_on_second_call(key in arb_key(), n in any::<i64>()) {
            let c = core(100, 10_000_000);
            c.set(&key, json!(n), None, HashSet::new()).unwrap();
            prop_assert!(c.delete(&key));
            prop_assert!(!c.delete(&key));
        }

        /// Replacing a key leaves `entryCount` unchanged and the latest
        /// value readable.
        #[test]
        fn replace_keeps_entry_count_net_zero(key in arb_key(), a in any::<i64>(), b in any::<i64>()) {
            let c = core(100, 10_000_000);
            c.set(&key, json!(a), None, HashSet::new()).unwrap();
            let count_before = c.stats().entry_count;
            c.set(&key, json!(b), None, HashSet::new()).unwrap();
            prop_assert_eq!(c.stats().entry_count, count_before);
            prop_assert_eq!(c.get(&key), Some(json!(b)));
        }

        /// No sequence of successful inserts can push `entryCount` or
        /// `totalBytes` above the configured bounds.
        #[test]
        fn bounds_are_never_exceeded(values in prop::collection::vec(any::<i64>(), 1..200)) {
            let c = core(10, 5_000);
            for (i, v) in values.into_iter().enumerate() {
                let _ = c.set(&format!("k{i}"), json!(v), None, HashSet::new());
                let stats = c.stats();
                prop_assert!(stats.entry_count <= stats.max_entries);
                prop_assert!(stats.total_bytes <= stats.max_bytes);
            }
        }

        /// `hits + misses` always equals the number of `get` calls made.
        #[test]
        fn accesses_equal_hits_plus_misses(keys in prop::collection::vec(arb_key(), 1..50)) {
            let c = core(100, 10_000_000);
            c.set("present", json!(1), None, HashSet::new()).unwrap();
            for k in &keys {
                c.get(k);
            }
            let stats = c.stats();
            prop_assert_eq!(stats.hits + stats.misses, stats.accesses);
        }
    }
}
