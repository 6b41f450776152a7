use indexmap::IndexMap;
use std::{fmt, hash::Hash};

/// Insertion-ordered container of uniquely keyed values
///
/// Keys are derived from the values with the extraction function given at
/// construction. Removal keeps the relative order of the remaining entries.
pub struct OrderedStore<K, V> {
    entries: IndexMap<K, V>,
    key_of: fn(&V) -> K,
}

impl<K: Hash + Eq + Clone, V> OrderedStore<K, V> {
    pub fn new(key_of: fn(&V) -> K) -> Self {
        Self::with_capacity(0, key_of)
    }

    pub fn with_capacity(capacity: usize, key_of: fn(&V) -> K) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
            key_of,
        }
    }

    /// Append a value under its derived key.
    ///
    /// Fails without touching the store if the key is already present.
    pub fn add_value(&mut self, value: V) -> Result<(), StoreError<K>> {
        let key = (self.key_of)(&value);
        if self.entries.contains_key(&key) {
            return Err(StoreError::DuplicateKey(key));
        }
        self.entries.insert(key, value);
        Ok(())
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove an entry if present. Absent keys are not an error.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.entries.shift_remove(key)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> {
        self.entries.keys()
    }

    /// Values in insertion order
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedStore<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Ordered store errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError<K> {
    /// A value with the same key is already stored
    DuplicateKey(K),
}

impl<K: fmt::Debug> fmt::Display for StoreError<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::DuplicateKey(key) => write!(f, "Key {:?} already stored", key),
        }
    }
}

impl<K: fmt::Debug> std::error::Error for StoreError<K> {}
