//! Per-type memo table shared by the coercion and catalog registries.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// A write-once map from a value type to its single shared instance.
///
/// Entries are keyed by the `TypeId` of the stored value, so each value type
/// has at most one entry. Lookups take the read lock only. Values are always
/// computed by the caller with no lock held; when two threads race on first
/// use, the first insert wins and the loser's value is dropped.
#[derive(Default)]
pub(crate) struct TypeCache {
    entries: RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl TypeCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get<V: Any + Send + Sync>(&self) -> Option<Arc<V>> {
        let entry = self.entries.read().get(&TypeId::of::<V>()).cloned()?;
        entry.downcast::<V>().ok()
    }

    /// Inserts `value` unless another thread got there first, and returns
    /// whichever value is now stored.
    pub(crate) fn insert<V: Any + Send + Sync>(&self, value: V) -> Arc<V> {
        let fresh = Arc::new(value);
        let winner = {
            let mut entries = self.entries.write();
            entries
                .entry(TypeId::of::<V>())
                .or_insert_with(|| fresh.clone() as Arc<dyn Any + Send + Sync>)
                .clone()
        };

        winner.downcast::<V>().unwrap_or(fresh)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_wins() {
        let cache = TypeCache::new();

        let first = cache.insert(String::from("first"));
        let second = cache.insert(String::from("second"));

        assert_eq!(*first, "first");
        assert_eq!(*second, "first");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn entries_are_keyed_by_value_type() {
        let cache = TypeCache::new();
        cache.insert(7u32);
        cache.insert(String::from("x"));

        assert_eq!(cache.get::<u32>().as_deref(), Some(&7));
        assert_eq!(cache.get::<String>().as_deref().map(String::as_str), Some("x"));
        assert!(cache.get::<u64>().is_none());
    }

    #[test]
    fn concurrent_inserts_agree_on_one_value() {
        let cache = TypeCache::new();

        let values: Vec<Arc<usize>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let cache = &cache;
                    scope.spawn(move || cache.insert(i))
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let winner = *values[0];
        assert!(values.iter().all(|v| **v == winner));
        assert_eq!(cache.len(), 1);
    }
}
