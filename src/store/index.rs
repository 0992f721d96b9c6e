use crate::errors::CacheError;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Computes an object's key for one index. `Ok(None)` means the index does not apply to the object.
pub type KeyCreator<T> = Arc<dyn Fn(&T) -> Result<Option<String>, CacheError> + Send + Sync>;

/// Registration record for one index.
pub struct IndexSpec<T> {
    pub name: String,
    pub key_creator: KeyCreator<T>,
    pub allow_missing: bool,
}

impl<T> IndexSpec<T> {
    pub fn new<F>(name: &str, key_creator: F) -> Self
    where
        F: Fn(&T) -> Result<Option<String>, CacheError> + Send + Sync + 'static,
    {
        Self { name: name.to_string(), key_creator: Arc::new(key_creator), allow_missing: false }
    }

    /// Lets objects without a key for this index be stored anyway (they are left out of it).
    #[must_use]
    pub fn allow_missing(mut self, allow: bool) -> Self {
        self.allow_missing = allow;
        self
    }

    pub(crate) fn key_for(&self, obj: &T) -> Result<Option<String>, CacheError> {
        (self.key_creator)(obj)
    }
}

impl<T> Clone for IndexSpec<T> {
    fn clone(&self) -> Self {
        Self { name: self.name.clone(), key_creator: self.key_creator.clone(), allow_missing: self.allow_missing }
    }
}

impl<T> fmt::Debug for IndexSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexSpec").field("name", &self.name).field("allow_missing", &self.allow_missing).finish()
    }
}

#[derive(Debug, Default)]
pub struct IndexStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
}

impl IndexStats {
    pub(crate) fn record(&self, found: usize) {
        if found == 0 {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexStatsSnapshot {
    pub name: String,
    pub keys: usize,
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Ordered secondary index: secondary key to the primary keys filed under it.
pub(crate) struct SecondaryIndex<T> {
    pub spec: IndexSpec<T>,
    pub map: BTreeMap<String, BTreeSet<String>>,
    pub entries: usize,
    pub stats: IndexStats,
}

impl<T> SecondaryIndex<T> {
    pub fn new(spec: IndexSpec<T>) -> Self {
        Self { spec, map: BTreeMap::new(), entries: 0, stats: IndexStats::default() }
    }

    pub fn insert(&mut self, key: &str, primary: &str) {
        if self.map.entry(key.to_string()).or_default().insert(primary.to_string()) {
            self.entries += 1;
        }
    }

    pub fn remove(&mut self, key: &str, primary: &str) {
        if let Some(set) = self.map.get_mut(key) {
            if set.remove(primary) {
                self.entries = self.entries.saturating_sub(1);
            }
            if set.is_empty() {
                self.map.remove(key);
            }
        }
    }

    /// Primary keys whose secondary key starts with `prefix`, in secondary-key order.
    pub fn scan_prefix(&self, prefix: &str) -> Vec<String> {
        let out: Vec<String> = prefix_range(&self.map, prefix).flat_map(|(_, set)| set.iter().cloned()).collect();
        self.stats.record(out.len());
        out
    }

    pub fn snapshot(&self) -> IndexStatsSnapshot {
        IndexStatsSnapshot {
            name: self.spec.name.clone(),
            keys: self.map.len(),
            entries: self.entries,
            hits: self.stats.hits.load(Ordering::Relaxed),
            misses: self.stats.misses.load(Ordering::Relaxed),
        }
    }
}

/// Entries of `map` whose key starts with `prefix`, in key order.
pub(crate) fn prefix_range<'a, V>(
    map: &'a BTreeMap<String, V>,
    prefix: &'a str,
) -> impl Iterator<Item = (&'a String, &'a V)> + 'a {
    map.range::<str, _>((std::ops::Bound::Included(prefix), std::ops::Bound::Unbounded))
        .take_while(move |(k, _)| k.starts_with(prefix))
}
