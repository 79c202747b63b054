//! Least-frequently-used eviction policy.
//!
//! Tracks per-key access frequency in a `HashMap`, backed by a min-heap
//! keyed `(frequency, insertion_tick, key)` for O(log n) victim selection
//! with FIFO tie-breaking among equal frequencies. Stale heap entries (left
//! behind when a key's frequency increases) are invalidated lazily: they
//! are skipped the next time `select_victim` pops them.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use super::EvictionPolicy;
use crate::entry::Entry;

/// LFU policy with a lazily-invalidated frequency min-heap.
#[derive(Debug, Default)]
pub struct LfuPolicy {
    freq: HashMap<String, u64>,
    heap: BinaryHeap<Reverse<(u64, u64, String)>>,
    tick: u64,
}

impl LfuPolicy {
    /// Creates an empty LFU policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self, key: &str) {
        let next_freq = self.freq.get(key).copied().unwrap_or(0) + 1;
        self.freq.insert(key.to_string(), next_freq);
        self.heap.push(Reverse((next_freq, self.tick, key.to_string())));
        self.tick += 1;
    }
}

impl EvictionPolicy for LfuPolicy {
    fn name(&self) -> &'static str {
        "lfu"
    }

    fn on_insert(&mut self, key: &str, _entry: &Entry) {
        self.bump(key);
    }

    fn on_access(&mut self, key: &str, _entry: &Entry) {
        self.bump(key);
    }

    fn on_remove(&mut self, key: &str) {
        self.freq.remove(key);
    }

    fn select_victim(&mut self, _now_millis: i64, entries: &HashMap<String, Entry>) -> Option<String> {
        while let Some(Reverse((freq, _tick, key))) = self.heap.pop() {
            if self.freq.get(&key) == Some(&freq) && entries.contains_key(&key) {
                return Some(key);
            }
        }
        None
    }
}
