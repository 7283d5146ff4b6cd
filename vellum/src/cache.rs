//! A size-bounded lookup cache.
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// A `Mutex` guarded map that never grows past a fixed bound.
///
/// When an insert would exceed the bound, the older half of the entries
/// (by insertion order) is dropped. Entries this keeps are the ones
/// still likely to be asked for; the exact eviction shape is not part of
/// the contract, the bound is.
pub struct BoundedCache<K, V> {
    inner: Mutex<Inner<K, V>>,
    max_len: usize,
}

struct Inner<K, V> {
    map: HashMap<K, V>,
    order: Vec<K>,
}

impl<K, V> BoundedCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(max_len: usize) -> Self {
        assert!(max_len >= 2, "bound too small to be a cache");
        BoundedCache {
            inner: Mutex::new(Inner { map: HashMap::new(), order: Vec::new() }),
            max_len,
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.inner.lock() {
            Ok(inner) => inner.map.get(key).cloned(),
            // a poisoned cache only means some insert panicked halfway,
            // treat it as a miss
            Err(_) => None,
        }
    }

    pub fn insert(&self, key: K, value: V) {
        let Ok(mut inner) = self.inner.lock() else {
            return;
        };
        let inner = &mut *inner;
        if inner.map.len() >= self.max_len && !inner.map.contains_key(&key) {
            let keep = inner.order.split_off(inner.order.len() / 2);
            for old in &inner.order {
                inner.map.remove(old);
            }
            inner.order = keep;
        }
        if inner.map.insert(key.clone(), value).is_none() {
            inner.order.push(key);
        }
    }

    pub fn len(&self) -> usize {
        match self.inner.lock() {
            Ok(inner) => inner.map.len(),
            Err(_) => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
