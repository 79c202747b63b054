//! Entry types for the storage layer.
//!
//! Defines [`Entry`], the record stored under each key in the
//! [`StorageCore`](crate::storage::StorageCore): an opaque value plus the
//! metadata (timestamps, access stats, TTL, tags, estimated size) needed
//! for expiry, eviction, and statistics.

use std::collections::HashSet;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::Value;

/// Fixed per-entry overhead added to the byte-size estimate, approximating
/// the cost of the surrounding record (timestamps, counters, tag set) that
/// isn't part of the key or value themselves.
pub const ENTRY_OVERHEAD_BYTES: u64 = 200;

/// Returns the current wall-clock time as milliseconds since the Unix epoch.
///
/// Millisecond timestamps fit comfortably in i64 until the year 292 million.
#[allow(clippy::cast_possible_truncation)]
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// A single stored key's value plus server-internal bookkeeping.
///
/// `value` is treated as an opaque blob by the storage core: it is never
/// interpreted, only stored, sized, and handed back on `get`.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The stored value.
    pub value: Value,
    /// Wall-clock time (millis since epoch) when this entry was (re)written.
    pub created_at_millis: i64,
    /// Optional time-to-live. `None` means the entry never expires.
    pub ttl: Option<Duration>,
    /// Number of successful reads. Incremented on every `get` that hits.
    pub access_count: u64,
    /// Wall-clock time of the last successful read.
    pub last_accessed_millis: i64,
    /// Estimated storage footprint in bytes: key + rendered value + overhead.
    pub size_bytes: u64,
    /// Secondary-index labels attached to this entry.
    pub tags: HashSet<String>,
}

impl Entry {
    /// Creates a new entry, computing its size estimate from `key` and `value`.
    #[must_use]
    pub fn new(
        key: &str,
        value: Value,
        now_millis: i64,
        ttl: Option<Duration>,
        tags: HashSet<String>,
    ) -> Self {
        let size_bytes = estimate_size(key, &value);
        Self {
            value,
            created_at_millis: now_millis,
            ttl,
            access_count: 0,
            last_accessed_millis: now_millis,
            size_bytes,
            tags,
        }
    }

    /// Returns `true` if `now_millis` is past this entry's expiry time.
    ///
    /// An entry with no TTL never expires.
    #[must_use]
    pub fn is_expired(&self, now_millis: i64) -> bool {
        self.expiry_millis()
            .is_some_and(|expiry| now_millis > expiry)
    }

    /// Absolute expiry time in millis since epoch, or `None` if no TTL is set.
    #[must_use]
    pub fn expiry_millis(&self) -> Option<i64> {
        // TTLs are always reasonable millisecond durations, never near i64::MAX.
        #[allow(clippy::cast_possible_wrap)]
        self.ttl
            .map(|ttl| self.created_at_millis + ttl.as_millis() as i64)
    }

    /// Records a successful read: bumps the access counter and timestamp.
    ///
    /// Does not touch `value`, `created_at_millis`, or `ttl` — a `get`
    /// never mutates the stored value, only access metadata.
    pub fn touch(&mut self, now_millis: i64) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed_millis = now_millis;
    }

    /// Age of this entry relative to `now_millis`, in milliseconds.
    #[must_use]
    pub fn age_millis(&self, now_millis: i64) -> i64 {
        now_millis - self.created_at_millis
    }
}

/// Estimates the storage footprint of a key/value pair.
///
/// `utf8_len(key) + utf8_len(render(value)) + ENTRY_OVERHEAD_BYTES`. The
/// renderer (`serde_json::to_string`) is deterministic for a given `Value`,
/// so repeated `set`s of the same value produce the same estimate.
#[must_use]
pub fn estimate_size(key: &str, value: &Value) -> u64 {
    let rendered_len = serde_json::to_string(value).map_or(0, |s| s.len());
    (key.len() + rendered_len) as u64 + ENTRY_OVERHEAD_BYTES
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_entry_initializes_access_metadata_from_created_at() {
        let entry = Entry::new("k", json!("v"), 1_000, None, HashSet::new());
        assert_eq!(entry.last_accessed_millis, 1_000);
        assert_eq!(entry.access_count, 0);
    }

    #[test]
    fn is_expired_false_without_ttl() {
        let entry = Entry::new("k", json!("v"), 1_000, None, HashSet::new());
        assert!(!entry.is_expired(i64::MAX));
    }

    #[test]
    fn is_expired_true_past_ttl() {
        let entry = Entry::new("k", json!("v"), 1_000, Some(Duration::from_millis(500)), HashSet::new());
        assert!(!entry.is_expired(1_499));
        assert!(entry.is_expired(1_501));
    }

    #[test]
    fn touch_updates_access_count_and_timestamp_not_value() {
        let mut entry = Entry::new("k", json!("v"), 1_000, None, HashSet::new());
        entry.touch(2_000);
        assert_eq!(entry.access_count, 1);
        assert_eq!(entry.last_accessed_millis, 2_000);
        assert_eq!(entry.created_at_millis, 1_000);
        assert_eq!(entry.value, json!("v"));
    }

    #[test]
    fn estimate_size_is_additive_and_deterministic() {
        let a = estimate_size("key", &json!("hello"));
        let b = estimate_size("key", &json!("hello"));
        assert_eq!(a, b);
        assert_eq!(a, "key".len() as u64 + "\"hello\"".len() as u64 + ENTRY_OVERHEAD_BYTES);
    }

    #[test]
    fn age_millis_reflects_elapsed_time() {
        let entry = Entry::new("k", json!(1), 1_000, None, HashSet::new());
        assert_eq!(entry.age_millis(1_500), 500);
    }
}
