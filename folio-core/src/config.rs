//! # Folio configuration
//!
//! A minimal, framework-agnostic string key/value store. Applications
//! layer their own loaders (env, TOML, secrets managers) on top of it;
//! the tenancy core only ever reads an immutable snapshot.
//!
//! Keys consumed by the tenancy core:
//! - `provision.default_plan` — slug of the plan assigned at signup
//!   (default `free`)
//! - `provision.slug_retry_limit` — collision retry bound (default 8)
//! - `entitlement.fallback_limit.<key>` — conservative cap applied when a
//!   plan does not record a limit for `<key>`

use std::collections::HashMap;

#[derive(Debug, Default)]
pub struct FolioConfig {
    values: HashMap<String, String>,
}

impl FolioConfig {
    /// Create an empty config store.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Set a configuration key to a string value.
    pub fn set<K, V>(&mut self, key: K, value: V)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.values.insert(key.into(), value.into());
    }

    /// Get a configuration value by key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }

    /// Check whether a key is present.
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn snapshot(&self) -> FolioConfigSnapshot {
        FolioConfigSnapshot::new(self.values.clone())
    }
}

/// An immutable copy handed to long-lived components.
#[derive(Debug, Clone, Default)]
pub struct FolioConfigSnapshot {
    map: HashMap<String, String>,
}

impl FolioConfigSnapshot {
    pub(crate) fn new(map: HashMap<String, String>) -> Self {
        Self { map }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.map.get(key).map(|s| s.as_str())
    }

    pub fn get_string(&self, key: &str) -> Option<String> {
        self.map.get(key).cloned()
    }

    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key).and_then(|v| v.parse::<usize>().ok())
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(|v| v.parse::<i64>().ok())
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|v| v.parse::<bool>().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_roundtrip() {
        let mut cfg = FolioConfig::new();
        cfg.set("provision.default_plan", "free");
        assert_eq!(cfg.get("provision.default_plan"), Some("free"));
        assert!(cfg.has("provision.default_plan"));
        assert!(!cfg.has("provision.slug_retry_limit"));
    }

    #[test]
    fn snapshot_typed_getters() {
        let mut cfg = FolioConfig::new();
        cfg.set("provision.slug_retry_limit", "5");
        cfg.set("entitlement.fallback_limit.max_portfolios", "3");
        cfg.set("billing.live", "true");

        let snap = cfg.snapshot();
        assert_eq!(snap.get_usize("provision.slug_retry_limit"), Some(5));
        assert_eq!(snap.get_i64("entitlement.fallback_limit.max_portfolios"), Some(3));
        assert_eq!(snap.get_bool("billing.live"), Some(true));
        assert_eq!(snap.get_usize("missing"), None);
    }

    #[test]
    fn snapshot_is_detached_from_later_writes() {
        let mut cfg = FolioConfig::new();
        cfg.set("k", "1");
        let snap = cfg.snapshot();
        cfg.set("k", "2");
        assert_eq!(snap.get("k"), Some("1"));
    }
}
