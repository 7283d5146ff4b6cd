//! An immutable string-to-index map.
use std::fmt;

const MAX_VARIATIONS_TRIED: u32 = 4;

/// Maps string keys to non-negative array indices.
///
/// Built once, then read-only, so construction can afford to try a few
/// hash spread variations and keep the one with the fewest bucket
/// collisions. Lookup of an absent key returns `-1` instead of failing,
/// as callers normally branch on the index anyway.
#[derive(Debug, Clone)]
pub struct KeyedIndexMap {
    buckets: Box<[Vec<Entry>]>,
    mask: u32,
    overlap: u32,
    keys: Vec<String>,
}

#[derive(Debug, Clone)]
struct Entry {
    key: String,
    value: i32,
}

/// The same key was given twice to [`KeyedIndexMap::of`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateKeyError {
    pub key: String,
}

impl std::error::Error for DuplicateKeyError {}

impl fmt::Display for DuplicateKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Duplicate key: {:?}", self.key)
    }
}

impl KeyedIndexMap {
    /// A shared-use map with no entries.
    pub fn empty() -> Self {
        KeyedIndexMap {
            buckets: Box::from([]),
            mask: 0,
            overlap: 0,
            keys: Vec::new(),
        }
    }

    /// Builds the map from `(key, index)` entries.
    ///
    /// The entry order is kept by [`KeyedIndexMap::keys`]. Indices must be
    /// non-negative, as `-1` is the not-found result of
    /// [`KeyedIndexMap::get`].
    pub fn of<K>(entries: impl IntoIterator<Item = (K, i32)>) -> Result<Self, DuplicateKeyError>
    where
        K: Into<String>,
    {
        let entries: Vec<(String, i32)> = entries
            .into_iter()
            .map(|(key, value)| (key.into(), value))
            .collect();
        if entries.is_empty() {
            return Ok(KeyedIndexMap::empty());
        }
        for (key, value) in &entries {
            assert!(*value >= 0, "negative index for key {key:?}");
        }
        if let [(key, value)] = entries.as_slice() {
            // one bucket, no spreading to tune
            let entry = Entry { key: key.clone(), value: *value };
            return Ok(KeyedIndexMap {
                buckets: Box::from([vec![entry]]),
                mask: 0,
                overlap: 0,
                keys: vec![key.clone()],
            });
        }

        // aim for a fill factor under 50%
        let bucket_cnt = (entries.len() * 2 + entries.len() / 2).next_power_of_two();
        let mask = (bucket_cnt - 1) as u32;
        let base_overlap = bucket_cnt.trailing_zeros();

        let mut best_goodness = i32::MIN;
        let mut best_overlap = base_overlap;
        let mut best_buckets = Vec::new();
        for variation in 0..MAX_VARIATIONS_TRIED {
            let overlap = base_overlap + variation;
            let mut buckets = vec![Vec::new(); bucket_cnt];
            let mut filled = 0i32;
            for (key, value) in &entries {
                let bucket = &mut buckets[bucket_index(hash(key), overlap, mask)];
                if bucket.is_empty() {
                    filled += 1;
                }
                if bucket.iter().any(|e: &Entry| e.key == *key) {
                    return Err(DuplicateKeyError { key: key.clone() });
                }
                bucket.push(Entry { key: key.clone(), value: *value });
            }
            // 0 when every key got its own bucket
            let goodness = filled - entries.len() as i32;
            if goodness > best_goodness {
                best_goodness = goodness;
                best_overlap = overlap;
                best_buckets = buckets;
            }
            if goodness == 0 {
                break;
            }
        }

        Ok(KeyedIndexMap {
            buckets: best_buckets.into_boxed_slice(),
            mask,
            overlap: best_overlap,
            keys: entries.into_iter().map(|(key, _)| key).collect(),
        })
    }

    /// The index of `key`, or `-1` when absent.
    pub fn get(&self, key: &str) -> i32 {
        if self.buckets.is_empty() {
            return -1;
        }
        let bucket = &self.buckets[bucket_index(hash(key), self.overlap, self.mask)];
        for entry in bucket {
            if entry.key == key {
                return entry.value;
            }
        }
        -1
    }

    /// The keys in the order they were given to [`KeyedIndexMap::of`].
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Reverse lookup; linear, meant for error messages only.
    pub fn key_of_value(&self, value: i32) -> Option<&str> {
        self.buckets
            .iter()
            .flatten()
            .find(|e| e.value == value)
            .map(|e| e.key.as_str())
    }

    /// Asserts that every index falls into `start .. start + len`.
    ///
    /// Violation means the map was built for a differently shaped array
    /// than it's used with, which is a bug in the caller.
    pub fn check_index_range(&self, start: i32) {
        let end = start + self.keys.len() as i32;
        for entry in self.buckets.iter().flatten() {
            assert!(
                entry.value >= start && entry.value < end,
                "index of key {:?} is {}, outside of {}..{}",
                entry.key,
                entry.value,
                start,
                end,
            );
        }
    }
}

fn bucket_index(h: u32, overlap: u32, mask: u32) -> usize {
    // fold the high bits down so the overlap amount varies the spread
    ((h ^ (h >> overlap)) & mask) as usize
}

fn hash(key: &str) -> u32 {
    key.bytes()
        .fold(0u32, |h, b| h.wrapping_mul(31).wrapping_add(b as u32))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn small_map() {
        let map = KeyedIndexMap::of([("a", 0), ("b", 1), ("c", 2)]).unwrap();
        assert_eq!(map.get("a"), 0);
        assert_eq!(map.get("b"), 1);
        assert_eq!(map.get("c"), 2);
        assert_eq!(map.get("d"), -1);
        assert_eq!(map.get(""), -1);
        assert_eq!(map.len(), 3);
        assert_eq!(map.keys(), ["a", "b", "c"]);
    }

    #[test]
    fn empty_map() {
        let map = KeyedIndexMap::empty();
        assert_eq!(map.get("a"), -1);
        assert!(map.is_empty());
        assert!(map.keys().is_empty());

        let map = KeyedIndexMap::of(Vec::<(String, i32)>::new()).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn single_entry_map() {
        let map = KeyedIndexMap::of([("only", 3)]).unwrap();
        assert_eq!(map.get("only"), 3);
        assert_eq!(map.get("other"), -1);
        assert_eq!(map.keys(), ["only"]);
    }

    #[test]
    fn larger_map() {
        let entries: Vec<(String, i32)> =
            (0..40).map(|i| (format!("key{i}"), i)).collect();
        let map = KeyedIndexMap::of(entries.clone()).unwrap();
        for (key, value) in &entries {
            assert_eq!(map.get(key), *value, "key {key}");
        }
        assert_eq!(map.get("key40"), -1);
        let keys: Vec<&str> = map.keys().iter().map(String::as_str).collect();
        let expected: Vec<&String> = entries.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn duplicate_key() {
        let err = KeyedIndexMap::of([("a", 0), ("b", 1), ("a", 2)]).unwrap_err();
        assert_eq!(err.key, "a");
    }

    #[test]
    fn key_of_value() {
        let map = KeyedIndexMap::of([("a", 0), ("b", 1)]).unwrap();
        assert_eq!(map.key_of_value(1), Some("b"));
        assert_eq!(map.key_of_value(7), None);
    }

    #[test]
    fn check_index_range_accepts_shifted() {
        let map = KeyedIndexMap::of([("a", 2), ("b", 3)]).unwrap();
        map.check_index_range(2);
    }

    #[test]
    #[should_panic]
    fn check_index_range_rejects_gap() {
        let map = KeyedIndexMap::of([("a", 0), ("b", 5)]).unwrap();
        map.check_index_range(0);
    }
}
