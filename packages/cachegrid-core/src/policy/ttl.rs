//! Time-to-live eviction policy.
//!
//! Indexes keys by absolute expiry time in a min-heap. `select_victim`
//! only ever names a key whose expiry has already passed; if none has, it
//! reports `None` so the storage core can fall back to refusing the
//! insert rather than evicting a still-live entry.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::collections::HashMap;

use super::EvictionPolicy;
use crate::entry::Entry;

/// TTL policy: evicts only already-expired entries.
#[derive(Debug, Default)]
pub struct TtlPolicy {
    expiry_heap: BinaryHeap<Reverse<(i64, String)>>,
}

impl TtlPolicy {
    /// Creates an empty TTL policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl EvictionPolicy for TtlPolicy {
    fn name(&self) -> &'static str {
        "ttl"
    }

    fn on_insert(&mut self, key: &str, entry: &Entry) {
        if let Some(expiry) = entry.expiry_millis() {
            self.expiry_heap.push(Reverse((expiry, key.to_string())));
        }
    }

    fn on_access(&mut self, _key: &str, _entry: &Entry) {
        // No special handling: TTL eviction only cares about expiry time.
    }

    fn on_remove(&mut self, _key: &str) {
        // Stale heap entries for removed keys are skipped lazily in
        // select_victim; no eager cleanup needed.
    }

    fn select_victim(&mut self, now_millis: i64, entries: &HashMap<String, Entry>) -> Option<String> {
        while let Some(Reverse((expiry, key))) = self.expiry_heap.pop() {
            let Some(entry) = entries.get(&key) else {
                continue;
            };
            if entry.expiry_millis() == Some(expiry) && expiry <= now_millis {
                return Some(key);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;

    fn entry_with_ttl(created_at: i64, ttl_millis: u64) -> Entry {
        Entry::new("k", json!(1), created_at, Some(Duration::from_millis(ttl_millis)), Default::default())
    }

    #[test]
    fn select_victim_returns_none_when_nothing_expired() {
        let mut policy = TtlPolicy::new();
        let e = entry_with_ttl(1_000, 500);
        policy.on_insert("a", &e);

        let store: HashMap<String, Entry> = [("a".to_string(), e)].into();
        assert_eq!(policy.select_victim(1_200, &store), None);
    }

    #[test]
    fn select_victim_returns_expired_key() {
        let mut policy = TtlPolicy::new();
        let e = entry_with_ttl(1_000, 500);
        policy.on_insert("a", &e);

        let store: HashMap<String, Entry> = [("a".to_string(), e)].into();
        assert_eq!(policy.select_victim(1_600, &store), Some("a".to_string()));
    }

    #[test]
    fn entries_without_ttl_are_never_named() {
        let mut policy = TtlPolicy::new();
        let e = Entry::new("k", json!(1), 1_000, None, Default::default());
        policy.on_insert("a", &e);

        let store: HashMap<String, Entry> = [("a".to_string(), e)].into();
        assert_eq!(policy.select_victim(i64::MAX, &store), None);
    }

    #[test]
    fn stale_entries_for_replaced_keys_are_skipped() {
        let mut policy = TtlPolicy::new();
        let first = entry_with_ttl(1_000, 100);
        policy.on_insert("a", &first);

        // key "a" replaced with a later expiry; the stale heap entry for
        // the first expiry must not be mistaken for the live one.
        let second = entry_with_ttl(1_000, 10_000);
        policy.on_insert("a", &second);

        let store: HashMap<String, Entry> = [("a".to_string(), second)].into();
        assert_eq!(policy.select_victim(1_200, &store), None);
    }
}
