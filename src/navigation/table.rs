//! Routing table: symbolic destination keys → entry templates.
//!
//! # Responsibilities
//! - Map keys to static templates (from config) or dynamic resolvers
//!   (registered in code, evaluated against current application state)
//! - Resolve key sequences and named paths into a [`Path`]
//!
//! # Design Decisions
//! - Shared through `ArcSwap` so a config reload is one atomic swap and
//!   readers never wait
//! - A reload rebuilds the static part only; dynamic resolvers survive

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::config::TableConfig;
use crate::error::TableError;
use crate::navigation::path::Path;
use crate::routing::{RoutingContext, RoutingEntry};

/// Routing table shared between the navigator and its callers.
pub type SharedTable = Arc<ArcSwap<RoutingTable>>;

/// Produces a destination from current application state.
pub trait Resolver: Send + Sync {
    /// `None` when the destination is not reachable right now.
    fn resolve(&self) -> Option<RoutingEntry>;
}

impl<F> Resolver for F
where
    F: Fn() -> Option<RoutingEntry> + Send + Sync,
{
    fn resolve(&self) -> Option<RoutingEntry> {
        self()
    }
}

#[derive(Clone)]
enum TableEntry {
    Static(RoutingEntry),
    Dynamic(Arc<dyn Resolver>),
}

/// Maps destination keys to routing entry templates.
#[derive(Clone, Default)]
pub struct RoutingTable {
    entries: HashMap<String, TableEntry>,
    paths: HashMap<String, Vec<String>>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the static part from config.
    pub fn from_config(config: &TableConfig) -> Result<Self, TableError> {
        let mut table = Self::new();
        table.load_static(config)?;
        Ok(table)
    }

    /// A copy of this table with its static entries and paths replaced by
    /// `config`. Dynamic entries are kept unless config now declares the key.
    pub fn reloaded(&self, config: &TableConfig) -> Result<Self, TableError> {
        let mut table = Self {
            entries: self
                .entries
                .iter()
                .filter(|(_, entry)| matches!(entry, TableEntry::Dynamic(_)))
                .map(|(key, entry)| (key.clone(), entry.clone()))
                .collect(),
            paths: HashMap::new(),
        };
        for entry in &config.entries {
            table.entries.remove(&entry.key);
        }
        table.load_static(config)?;
        Ok(table)
    }

    fn load_static(&mut self, config: &TableConfig) -> Result<(), TableError> {
        for entry in &config.entries {
            let mut template = RoutingEntry::new(entry.identifier.as_str());
            if let Some(context) = &entry.context {
                template = template.with_context(RoutingContext::from(context.clone()));
            }
            self.insert_static(entry.key.as_str(), template)?;
        }
        for path in &config.paths {
            self.register_path(path.name.as_str(), path.segments.iter().map(String::as_str));
        }
        Ok(())
    }

    /// Register a fixed template. Keys are unique.
    pub fn insert_static(&mut self, key: impl Into<String>, entry: RoutingEntry) -> Result<(), TableError> {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return Err(TableError::DuplicateKey(key));
        }
        self.entries.insert(key, TableEntry::Static(entry.template()));
        Ok(())
    }

    /// Register a resolver, replacing any previous entry for the key.
    pub fn insert_dynamic<R>(&mut self, key: impl Into<String>, resolver: R)
    where
        R: Resolver + 'static,
    {
        self.entries.insert(key.into(), TableEntry::Dynamic(Arc::new(resolver)));
    }

    /// Register a named sequence of keys.
    pub fn register_path<I, S>(&mut self, name: impl Into<String>, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paths
            .insert(name.into(), keys.into_iter().map(Into::into).collect());
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn contains_path(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<_> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    /// Resolve a single key. `None` for unknown keys and for dynamic entries
    /// that currently resolve to nothing.
    pub fn resolve(&self, key: &str) -> Option<RoutingEntry> {
        self.try_resolve(key).ok()
    }

    fn try_resolve(&self, key: &str) -> Result<RoutingEntry, TableError> {
        match self.entries.get(key) {
            Some(TableEntry::Static(entry)) => Ok(entry.clone()),
            Some(TableEntry::Dynamic(resolver)) => resolver
                .resolve()
                .map(|entry| entry.template())
                .ok_or_else(|| TableError::Unresolved(key.to_string())),
            None => Err(TableError::UnknownKey(key.to_string())),
        }
    }

    /// Resolve every key, in order, into a path.
    pub fn resolve_path<I, S>(&self, keys: I) -> Result<Path, TableError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter()
            .map(|key| self.try_resolve(key.as_ref()))
            .collect::<Result<Vec<_>, _>>()
            .map(Path::from)
    }

    /// Resolve a path registered under `name`.
    pub fn resolve_named(&self, name: &str) -> Result<Path, TableError> {
        let keys = self
            .paths
            .get(name)
            .ok_or_else(|| TableError::UnknownPath(name.to_string()))?;
        self.resolve_path(keys)
    }
}

impl std::fmt::Debug for RoutingTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut paths: Vec<_> = self.paths.keys().collect();
        paths.sort_unstable();
        f.debug_struct("RoutingTable")
            .field("keys", &self.keys())
            .field("paths", &paths)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PathConfig, TableEntryConfig};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn config() -> TableConfig {
        let mut context = BTreeMap::new();
        context.insert("tab".to_string(), serde_json::json!("inbox"));
        TableConfig {
            entries: vec![
                TableEntryConfig {
                    key: "home".into(),
                    identifier: "a".into(),
                    context: None,
                },
                TableEntryConfig {
                    key: "inbox".into(),
                    identifier: "b".into(),
                    context: Some(context),
                },
            ],
            paths: vec![PathConfig {
                name: "deep".into(),
                segments: vec!["home".into(), "inbox".into()],
            }],
            dynamic_keys: Vec::new(),
        }
    }

    #[test]
    fn test_static_resolution() {
        let table = RoutingTable::from_config(&config()).unwrap();
        let entry = table.resolve("inbox").unwrap();
        assert_eq!(entry.identifier.as_str(), "b");
        assert_eq!(entry.context.unwrap().get_str("tab"), Some("inbox"));
        assert!(table.resolve("missing").is_none());
    }

    #[test]
    fn test_duplicate_static_key_is_rejected() {
        let mut table = RoutingTable::new();
        table.insert_static("home", RoutingEntry::new("a")).unwrap();
        assert_eq!(
            table.insert_static("home", RoutingEntry::new("b")),
            Err(TableError::DuplicateKey("home".into()))
        );
    }

    #[test]
    fn test_dynamic_entry_reads_current_state() {
        let visits = Arc::new(AtomicU64::new(0));
        let state = visits.clone();
        let mut table = RoutingTable::new();
        table.insert_dynamic("profile", move || {
            let visit = state.fetch_add(1, Ordering::SeqCst);
            Some(RoutingEntry::new("c").with_context(RoutingContext::new().with("visit", visit)))
        });
        table.insert_dynamic("never", || None::<RoutingEntry>);

        let first = table.resolve("profile").unwrap();
        let second = table.resolve("profile").unwrap();
        assert_ne!(first, second);
        assert_eq!(visits.load(Ordering::SeqCst), 2);

        assert_eq!(
            table.resolve_path(["profile", "never"]),
            Err(TableError::Unresolved("never".into()))
        );
    }

    #[test]
    fn test_resolve_named_path() {
        let table = RoutingTable::from_config(&config()).unwrap();
        let path = table.resolve_named("deep").unwrap();
        assert_eq!(path.to_string(), "a/b");
        assert_eq!(
            table.resolve_named("shallow"),
            Err(TableError::UnknownPath("shallow".into()))
        );
        assert_eq!(
            table.resolve_path(["home", "nope"]),
            Err(TableError::UnknownKey("nope".into()))
        );
    }

    #[test]
    fn test_reload_keeps_dynamic_entries() {
        let mut table = RoutingTable::from_config(&config()).unwrap();
        table.insert_dynamic("profile", || Some(RoutingEntry::new("c")));

        let mut next = config();
        next.entries.remove(1);
        next.paths.clear();
        let reloaded = table.reloaded(&next).unwrap();

        assert_eq!(reloaded.keys(), vec!["home", "profile"]);
        assert!(!reloaded.contains_path("deep"));
        assert_eq!(reloaded.resolve("profile").unwrap().identifier.as_str(), "c");
    }

    #[test]
    fn test_shared_table_swap() {
        let shared: SharedTable = Arc::new(ArcSwap::from_pointee(RoutingTable::new()));
        assert!(shared.load().resolve("home").is_none());

        shared.store(Arc::new(RoutingTable::from_config(&config()).unwrap()));
        assert!(shared.load().resolve("home").is_some());
    }
}
