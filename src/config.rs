//! Runtime limits for query compilation and the index names used by the console cache.

use crate::errors::CacheError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PRIMARY_INDEX: &str = "id";
pub const DEFAULT_ADDRESS_LINK_INDEX: &str = "addressLinkHierarchy";

/// Safety limits applied when compiling filter and order-by text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    pub max_path_depth: usize,
    pub max_order_keys: usize,
    pub max_filter_len: usize,
    /// Upper bound on nested parentheses and `NOT` operators.
    pub max_nesting_depth: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self { max_path_depth: 32, max_order_keys: 8, max_filter_len: 16 * 1024, max_nesting_depth: 64 }
    }
}

impl QueryLimits {
    /// Defaults overridden by the environment; see [`QueryLimits::apply_env`].
    #[must_use]
    pub fn from_env() -> Self {
        let mut limits = Self::default();
        limits.apply_env();
        limits
    }

    /// Overrides fields from any of:
    /// - CONSOLECACHE_MAX_PATH_DEPTH
    /// - CONSOLECACHE_MAX_ORDER_KEYS
    /// - CONSOLECACHE_MAX_FILTER_LEN
    /// - CONSOLECACHE_MAX_NESTING_DEPTH
    ///
    /// Unset or unparsable variables leave the field as is.
    pub fn apply_env(&mut self) {
        fn var(name: &str) -> Option<usize> {
            std::env::var(name).ok().and_then(|s| s.trim().parse::<usize>().ok())
        }
        if let Some(v) = var("CONSOLECACHE_MAX_PATH_DEPTH") {
            self.max_path_depth = v;
        }
        if let Some(v) = var("CONSOLECACHE_MAX_ORDER_KEYS") {
            self.max_order_keys = v;
        }
        if let Some(v) = var("CONSOLECACHE_MAX_FILTER_LEN") {
            self.max_filter_len = v;
        }
        if let Some(v) = var("CONSOLECACHE_MAX_NESTING_DEPTH") {
            self.max_nesting_depth = v;
        }
    }

    /// # Errors
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml_str(s: &str) -> Result<Self, CacheError> {
        Ok(toml::from_str(s)?)
    }
}

/// Names of the indices registered by `create_object_cache`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    pub primary: String,
    pub address_link: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { primary: DEFAULT_PRIMARY_INDEX.to_string(), address_link: DEFAULT_ADDRESS_LINK_INDEX.to_string() }
    }
}

/// Top-level configuration file layout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub limits: QueryLimits,
    pub indexes: IndexConfig,
}

impl CacheConfig {
    /// # Errors
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml_str(s: &str) -> Result<Self, CacheError> {
        Ok(toml::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = CacheConfig::from_toml_str("[limits]\nmax_order_keys = 3\n").unwrap();
        assert_eq!(cfg.limits.max_order_keys, 3);
        assert_eq!(cfg.limits.max_path_depth, QueryLimits::default().max_path_depth);
        assert_eq!(cfg.indexes, IndexConfig::default());
    }

    #[test]
    fn index_names_overridable() {
        let cfg = CacheConfig::from_toml_str("[indexes]\nprimary = \"pk\"\n").unwrap();
        assert_eq!(cfg.indexes.primary, "pk");
        assert_eq!(cfg.indexes.address_link, DEFAULT_ADDRESS_LINK_INDEX);
    }

    #[test]
    fn bad_toml_is_an_error() {
        assert!(matches!(QueryLimits::from_toml_str("max_path_depth = 'x'"), Err(CacheError::Toml(_))));
    }
}
