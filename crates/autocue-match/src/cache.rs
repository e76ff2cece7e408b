use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Size-capped map with least-recently-used eviction.
///
/// Recency is tracked with a monotonic tick: the map stores each entry's
/// latest tick and a `BTreeMap` orders keys by tick, so eviction pops the
/// smallest. The matcher owns its caches and only one thread calls it, so no
/// interior locking is needed.
pub struct LruCache<K, V> {
    capacity: usize,
    tick: u64,
    entries: HashMap<K, Entry<V>>,
    order: BTreeMap<u64, K>,
}

struct Entry<V> {
    value: V,
    stamp: u64,
}

impl<K: Eq + Hash + Clone, V> LruCache<K, V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            tick: 0,
            entries: HashMap::new(),
            order: BTreeMap::new(),
        }
    }

    pub fn get(&mut self, key: &K) -> Option<&V> {
        let entry = self.entries.get_mut(key)?;
        self.order.remove(&entry.stamp);
        self.tick += 1;
        entry.stamp = self.tick;
        self.order.insert(self.tick, key.clone());
        Some(&entry.value)
    }

    pub fn insert(&mut self, key: K, value: V) {
        if let Some(entry) = self.entries.get_mut(&key) {
            self.order.remove(&entry.stamp);
            self.tick += 1;
            entry.stamp = self.tick;
            entry.value = value;
            self.order.insert(self.tick, key);
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some((_, oldest)) = self.order.pop_first() {
                self.entries.remove(&oldest);
            }
        }

        self.tick += 1;
        self.entries.insert(
            key.clone(),
            Entry {
                value,
                stamp: self.tick,
            },
        );
        self.order.insert(self.tick, key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut cache = LruCache::new(8);
        cache.insert("hello", 1);
        assert_eq!(cache.get(&"hello"), Some(&1));
        assert_eq!(cache.get(&"missing"), None);
    }

    #[test]
    fn evicts_least_recently_used() {
        let mut cache = LruCache::new(3);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("c", 3);
        // Touch "a" so "b" becomes the oldest.
        cache.get(&"a");
        cache.insert("d", 4);

        assert_eq!(cache.len(), 3);
        assert!(cache.get(&"a").is_some());
        assert!(cache.get(&"b").is_none());
        assert!(cache.get(&"c").is_some());
        assert!(cache.get(&"d").is_some());
    }

    #[test]
    fn reinsert_updates_value_and_recency() {
        let mut cache = LruCache::new(2);
        cache.insert("a", 1);
        cache.insert("b", 2);
        cache.insert("a", 10);
        cache.insert("c", 3);

        assert_eq!(cache.get(&"a"), Some(&10));
        assert!(cache.get(&"b").is_none());
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let mut cache = LruCache::new(0);
        cache.insert("a", 1);
        assert_eq!(cache.capacity(), 1);
        assert_eq!(cache.len(), 1);
    }
}
