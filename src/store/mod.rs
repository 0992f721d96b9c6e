//! In-memory object store with one primary and any number of secondary indices.
//!
//! Writers replace whole objects; readers receive `Arc` snapshots and never block each other.
//! Every mutation either updates all indices or none of them.

mod index;
mod predicate;

pub use index::{IndexSpec, IndexStats, IndexStatsSnapshot, KeyCreator};
pub use predicate::{And, FnPredicate, Predicate};

use crate::errors::CacheError;
use index::{SecondaryIndex, prefix_range};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

struct Entry<T> {
    object: Arc<T>,
    // one slot per secondary index, in registration order
    secondary_keys: Vec<Option<String>>,
}

struct Tables<T> {
    primary: Option<IndexSpec<T>>,
    primary_stats: IndexStats,
    objects: BTreeMap<String, Entry<T>>,
    secondary: Vec<SecondaryIndex<T>>,
}

impl<T> Tables<T> {
    fn primary_spec(&self) -> Result<&IndexSpec<T>, CacheError> {
        self.primary.as_ref().ok_or_else(|| CacheError::IndexConfig("store has no registered indices".into()))
    }

    fn primary_key(&self, obj: &T) -> Result<String, CacheError> {
        let spec = self.primary_spec()?;
        spec.key_for(obj)?.ok_or_else(|| {
            CacheError::Registration(format!("no '{}' key creator applies to this object", spec.name))
        })
    }

    fn secondary_keys(&self, obj: &T, primary: &str) -> Result<Vec<Option<String>>, CacheError> {
        let mut keys = Vec::with_capacity(self.secondary.len());
        for idx in &self.secondary {
            match idx.spec.key_for(obj)? {
                Some(k) => keys.push(Some(k)),
                None if idx.spec.allow_missing => keys.push(None),
                None => {
                    return Err(CacheError::MissingIndexKey {
                        index: idx.spec.name.clone(),
                        object: primary.to_string(),
                    });
                }
            }
        }
        Ok(keys)
    }

    fn unlink(&mut self, primary: &str) -> Option<Entry<T>> {
        let old = self.objects.remove(primary)?;
        for (idx, key) in self.secondary.iter_mut().zip(&old.secondary_keys) {
            if let Some(k) = key {
                idx.remove(k, primary);
            }
        }
        Some(old)
    }

    fn link(&mut self, primary: String, entry: Entry<T>) {
        for (idx, key) in self.secondary.iter_mut().zip(&entry.secondary_keys) {
            if let Some(k) = key {
                idx.insert(k, &primary);
            }
        }
        self.objects.insert(primary, entry);
    }

    fn secondary_by_name(&self, name: &str) -> Option<&SecondaryIndex<T>> {
        self.secondary.iter().find(|s| s.spec.name == name)
    }

    fn is_primary(&self, name: &str) -> bool {
        self.primary.as_ref().is_some_and(|p| p.name == name)
    }

    fn resolve(&self, primaries: &[String]) -> Vec<Arc<T>> {
        primaries.iter().filter_map(|k| self.objects.get(k)).map(|e| e.object.clone()).collect()
    }
}

/// Thread-safe indexed object store.
pub struct IndexedStore<T> {
    tables: RwLock<Tables<T>>,
}

impl<T> Default for IndexedStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IndexedStore<T> {
    /// An empty store with no indices; call [`IndexedStore::init`] before use.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                primary: None,
                primary_stats: IndexStats::default(),
                objects: BTreeMap::new(),
                secondary: Vec::new(),
            }),
        }
    }

    /// # Errors
    /// See [`IndexedStore::init`].
    pub fn with_indexes(specs: Vec<IndexSpec<T>>) -> Result<Self, CacheError> {
        let store = Self::new();
        store.init(specs)?;
        Ok(store)
    }

    /// Registers the indices. The first spec is the primary index.
    ///
    /// # Errors
    /// `CacheError::IndexConfig` for an empty list, a repeated call, duplicate names
    /// or a primary index that allows missing keys.
    pub fn init(&self, specs: Vec<IndexSpec<T>>) -> Result<(), CacheError> {
        let mut tables = self.tables.write();
        if tables.primary.is_some() {
            return Err(CacheError::IndexConfig("indices are already registered".into()));
        }
        let mut specs = specs.into_iter();
        let Some(primary) = specs.next() else {
            return Err(CacheError::IndexConfig("at least one index is required".into()));
        };
        if primary.allow_missing {
            return Err(CacheError::IndexConfig(format!("primary index '{}' cannot allow missing keys", primary.name)));
        }
        let mut names = vec![primary.name.clone()];
        let mut secondary = Vec::new();
        for spec in specs {
            if names.contains(&spec.name) {
                return Err(CacheError::IndexConfig(format!("duplicate index name '{}'", spec.name)));
            }
            names.push(spec.name.clone());
            secondary.push(SecondaryIndex::new(spec));
        }
        log::debug!("store indices registered: {}", names.join(", "));
        tables.primary = Some(primary);
        tables.secondary = secondary;
        Ok(())
    }

    /// Inserts `obj`, replacing any object with the same primary key.
    ///
    /// # Errors
    /// `CacheError::Registration` when no primary key applies, `CacheError::MissingIndexKey`
    /// when a mandatory secondary index has no key, or any key-creator error. The store is unchanged on error.
    pub fn add(&self, obj: T) -> Result<(), CacheError> {
        self.upsert(obj, "add")
    }

    /// Replaces the stored object with the same primary key, inserting it when absent.
    ///
    /// # Errors
    /// As for [`IndexedStore::add`].
    pub fn update(&self, obj: T) -> Result<(), CacheError> {
        self.upsert(obj, "update")
    }

    fn upsert(&self, obj: T, op: &str) -> Result<(), CacheError> {
        let mut tables = self.tables.write();
        let keys = tables.primary_key(&obj).and_then(|pk| {
            let sk = tables.secondary_keys(&obj, &pk)?;
            Ok((pk, sk))
        });
        let (primary, secondary_keys) = match keys {
            Ok(k) => k,
            Err(e) => {
                log::warn!("store {op} rejected: {e}");
                return Err(e);
            }
        };
        let replaced = tables.unlink(&primary).is_some();
        log::debug!("store {op} {primary} (replaced: {replaced})");
        tables.link(primary, Entry { object: Arc::new(obj), secondary_keys });
        Ok(())
    }

    /// Removes the object with `obj`'s primary key from every index. Absent objects are ignored.
    ///
    /// # Errors
    /// `CacheError::Registration` when no primary key applies to `obj`.
    pub fn delete(&self, obj: &T) -> Result<(), CacheError> {
        let mut tables = self.tables.write();
        let primary = match tables.primary_key(obj) {
            Ok(k) => k,
            Err(e) => {
                log::warn!("store delete rejected: {e}");
                return Err(e);
            }
        };
        match tables.unlink(&primary) {
            Some(_) => log::debug!("store delete {primary}"),
            None => log::debug!("store delete {primary}: not present"),
        }
        Ok(())
    }

    /// Exact lookup on the primary index, prefix scan on a secondary index, then `predicate`.
    ///
    /// # Errors
    /// `CacheError::NoSuchIndex` for an unknown index, or the first predicate error.
    pub fn get(&self, index: &str, key: &str, predicate: Option<&dyn Predicate<T>>) -> Result<Vec<Arc<T>>, CacheError> {
        let candidates = {
            let tables = self.tables.read();
            if tables.is_primary(index) {
                let found: Vec<Arc<T>> = tables.objects.get(key).map(|e| e.object.clone()).into_iter().collect();
                tables.primary_stats.record(found.len());
                found
            } else {
                let idx = tables.secondary_by_name(index).ok_or_else(|| CacheError::NoSuchIndex(index.to_string()))?;
                tables.resolve(&idx.scan_prefix(key))
            }
        };
        filter(candidates, predicate)
    }

    /// Prefix scan on any index, including the primary one, then `predicate`.
    ///
    /// # Errors
    /// As for [`IndexedStore::get`].
    pub fn list(&self, index: &str, prefix: &str, predicate: Option<&dyn Predicate<T>>) -> Result<Vec<Arc<T>>, CacheError> {
        let candidates = {
            let tables = self.tables.read();
            if tables.is_primary(index) {
                let found: Vec<Arc<T>> = prefix_range(&tables.objects, prefix).map(|(_, e)| e.object.clone()).collect();
                tables.primary_stats.record(found.len());
                found
            } else {
                let idx = tables.secondary_by_name(index).ok_or_else(|| CacheError::NoSuchIndex(index.to_string()))?;
                tables.resolve(&idx.scan_prefix(prefix))
            }
        };
        filter(candidates, predicate)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.read().objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.read().objects.is_empty()
    }

    /// Registered index names, primary first.
    #[must_use]
    pub fn index_names(&self) -> Vec<String> {
        let tables = self.tables.read();
        tables.primary.iter().map(|p| p.name.clone()).chain(tables.secondary.iter().map(|s| s.spec.name.clone())).collect()
    }

    #[must_use]
    pub fn stats(&self) -> Vec<IndexStatsSnapshot> {
        use std::sync::atomic::Ordering;
        let tables = self.tables.read();
        let mut out = Vec::with_capacity(tables.secondary.len() + 1);
        if let Some(p) = &tables.primary {
            out.push(IndexStatsSnapshot {
                name: p.name.clone(),
                keys: tables.objects.len(),
                entries: tables.objects.len(),
                hits: tables.primary_stats.hits.load(Ordering::Relaxed),
                misses: tables.primary_stats.misses.load(Ordering::Relaxed),
            });
        }
        out.extend(tables.secondary.iter().map(SecondaryIndex::snapshot));
        out
    }
}

fn filter<T>(candidates: Vec<Arc<T>>, predicate: Option<&dyn Predicate<T>>) -> Result<Vec<Arc<T>>, CacheError> {
    let Some(p) = predicate else {
        return Ok(candidates);
    };
    let mut out = Vec::with_capacity(candidates.len());
    for obj in candidates {
        if p.test(&obj)? {
            out.push(obj);
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn by_field(field: &'static str) -> impl Fn(&Value) -> Result<Option<String>, CacheError> + Send + Sync {
        move |v: &Value| Ok(v.get(field).and_then(Value::as_str).map(str::to_string))
    }

    fn store() -> IndexedStore<Value> {
        IndexedStore::with_indexes(vec![
            IndexSpec::new("id", by_field("id")),
            IndexSpec::new("parent", by_field("parent")).allow_missing(true),
        ])
        .unwrap()
    }

    #[test]
    fn init_rejects_bad_registrations() {
        let s: IndexedStore<Value> = IndexedStore::new();
        assert!(matches!(s.init(vec![]), Err(CacheError::IndexConfig(_))));
        let dup = vec![IndexSpec::new("a", by_field("a")), IndexSpec::new("a", by_field("b"))];
        assert!(s.init(dup).is_err());
        assert!(s.init(vec![IndexSpec::new("a", by_field("a")).allow_missing(true)]).is_err());
        s.init(vec![IndexSpec::new("a", by_field("a"))]).unwrap();
        assert!(s.init(vec![IndexSpec::new("b", by_field("b"))]).is_err());
    }

    #[test]
    fn update_moves_secondary_entry() {
        let s = store();
        s.add(json!({"id": "x", "parent": "p1/"})).unwrap();
        s.update(json!({"id": "x", "parent": "p2/"})).unwrap();
        assert!(s.get("parent", "p1/", None).unwrap().is_empty());
        assert_eq!(s.get("parent", "p2/", None).unwrap().len(), 1);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn rejected_add_leaves_store_unchanged() {
        let s: IndexedStore<Value> = IndexedStore::with_indexes(vec![
            IndexSpec::new("id", by_field("id")),
            IndexSpec::new("must", by_field("must")),
        ])
        .unwrap();
        s.add(json!({"id": "a", "must": "1"})).unwrap();
        let err = s.update(json!({"id": "a"})).unwrap_err();
        assert!(matches!(err, CacheError::MissingIndexKey { ref index, .. } if index == "must"));
        assert_eq!(s.get("id", "a", None).unwrap()[0]["must"], "1");
        assert!(matches!(s.add(json!({"nope": 1})), Err(CacheError::Registration(_))));
    }

    #[test]
    fn unknown_index_is_error() {
        assert!(matches!(store().get("nope", "", None), Err(CacheError::NoSuchIndex(_))));
    }

    #[test]
    fn stats_count_hits_and_misses() {
        let s = store();
        s.add(json!({"id": "a"})).unwrap();
        s.get("id", "a", None).unwrap();
        s.get("id", "b", None).unwrap();
        let stats = s.stats();
        assert_eq!(stats[0].name, "id");
        assert_eq!((stats[0].hits, stats[0].misses), (1, 1));
        assert_eq!(stats[1].entries, 0);
    }
}
