//! Least-recently-used eviction policy.
//!
//! Maintains key order with an intrusive doubly-linked list threaded
//! through a `HashMap<String, usize>` index into a `Vec` arena, per the
//! ordered-map design note: each node carries its own key so unlinking is
//! O(1) without needing a second lookup.

use std::collections::HashMap;

use super::EvictionPolicy;
use crate::entry::Entry;

#[derive(Debug)]
struct Node {
    key: String,
    prev: Option<usize>,
    next: Option<usize>,
}

/// LRU policy: `on_insert`/`on_access` move a key to the most-recent end,
/// `select_victim` returns the least-recent end. All operations are O(1).
#[derive(Debug, Default)]
pub struct LruPolicy {
    nodes: Vec<Option<Node>>,
    index: HashMap<String, usize>,
    free: Vec<usize>,
    /// Most-recently-used node.
    head: Option<usize>,
    /// Least-recently-used node.
    tail: Option<usize>,
}

impl LruPolicy {
    /// Creates an empty LRU policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn unlink(&mut self, id: usize) {
        let (prev, next) = {
            let node = self.nodes[id].as_ref().expect("node present");
            (node.prev, node.next)
        };

        match prev {
            Some(p) => self.nodes[p].as_mut().expect("prev present").next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].as_mut().expect("next present").prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, id: usize) {
        let old_head = self.head;
        {
            let node = self.nodes[id].as_mut().expect("node present");
            node.prev = None;
            node.next = old_head;
        }
        if let Some(h) = old_head {
            self.nodes[h].as_mut().expect("head present").prev = Some(id);
        }
        self.head = Some(id);
        if self.tail.is_none() {
            self.tail = Some(id);
        }
    }

    /// Moves `key` to the most-recently-used end, inserting it if new.
    fn touch(&mut self, key: &str) {
        if let Some(&id) = self.index.get(key) {
            self.unlink(id);
            self.push_front(id);
            return;
        }

        let id = match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(Node {
                    key: key.to_string(),
                    prev: None,
                    next: None,
                });
                id
            }
            None => {
                self.nodes.push(Some(Node {
                    key: key.to_string(),
                    prev: None,
                    next: None,
                }));
                self.nodes.len() - 1
            }
        };
        self.index.insert(key.to_string(), id);
        self.push_front(id);
    }
}

impl EvictionPolicy for LruPolicy {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn on_insert(&mut self, key: &str, _entry: &Entry) {
        self.touch(key);
    }

    fn on_access(&mut self, key: &str, _entry: &Entry) {
        self.touch(key);
    }

    fn on_remove(&mut self, key: &str) {
        if let Some(id) = self.index.remove(key) {
            self.unlink(id);
            self.nodes[id] = None;
            self.free.push(id);
        }
    }

    fn select_victim(&mut self, _now_millis: i64, entries: &HashMap<String, Entry>) -> Option<String> {
        let mut cursor = self.tail;
        while let Some(id) = cursor {
            let key = self.nodes[id].as_ref().expect("node present").key.clone();
            if entries.contains_key(&key) {
                return Some(key);
            }
            cursor = self.nodes[id].as_ref().expect("node present").prev;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entry() -> Entry {
        Entry::new("k", json!(1), 0, None, Default::default())
    }

    fn storage(keys: &[&str]) -> HashMap<String, Entry> {
        keys.iter().map(|k| (k.to_string(), entry())).collect()
    }

    #[test]
    fn select_victim_returns_least_recently_used() {
        let mut policy = LruPolicy::new();
        policy.on_insert("a", &entry());
        policy.on_insert("b", &entry());
        policy.on_insert("c", &entry());

        let store = storage(&["a", "b", "c"]);
        assert_eq!(policy.select_victim(0, &store), Some("a".to_string()));
    }

    #[test]
    fn on_access_moves_key_to_most_recent_end() {
        let mut policy = LruPolicy::new();
        policy.on_insert("a", &entry());
        policy.on_insert("b", &entry());
        policy.on_insert("c", &entry());
        policy.on_access("a", &entry());

        let store = storage(&["a", "b", "c"]);
        assert_eq!(policy.select_victim(0, &store), Some("b".to_string()));
    }

    #[test]
    fn on_remove_untracked_key_is_a_no_op() {
        let mut policy = LruPolicy::new();
        policy.on_remove("never-seen");
    }

    #[test]
    fn select_victim_skips_keys_no_longer_in_storage() {
        let mut policy = LruPolicy::new();
        policy.on_insert("a", &entry());
        policy.on_insert("b", &entry());

        // "a" removed from storage out-of-band (simulating delete); the
        // policy wasn't told via on_remove yet.
        let store = storage(&["b"]);
        assert_eq!(policy.select_victim(0, &store), Some("b".to_string()));
    }

    #[test]
    fn select_victim_empty_returns_none() {
        let mut policy = LruPolicy::new();
        assert_eq!(policy.select_victim(0, &HashMap::new()), None);
    }

    #[test]
    fn reinserting_a_key_reuses_its_slot_at_front() {
        let mut policy = LruPolicy::new();
        policy.on_insert("a", &entry());
        policy.on_insert("b", &entry());
        policy.on_insert("a", &entry());

        let store = storage(&["a", "b"]);
        assert_eq!(policy.select_victim(0, &store), Some("b".to_string()));
    }
}
