//! The limit registry: item type → cap, where a cap of 0 means banned.
//!
//! Every mutation flushes the complete mapping to the backing store before
//! returning. A failed flush is logged and the in-memory change stands.

use std::collections::{BTreeMap, HashMap};

use log::{debug, error, info, warn};

use crate::host::ItemCatalog;
use crate::limits::errors::LimitError;
use crate::limits::types::ItemType;
use crate::logutil::escape_log;
use crate::storage::LimitStore;

pub struct LimitRegistry {
    limits: HashMap<ItemType, u32>,
    store: Box<dyn LimitStore>,
}

impl std::fmt::Debug for LimitRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LimitRegistry")
            .field("limits", &self.limits)
            .field("store", &self.store.describe())
            .finish()
    }
}

impl LimitRegistry {
    /// Empty registry bound to `store`; nothing is read.
    pub fn new(store: Box<dyn LimitStore>) -> Self {
        Self {
            limits: HashMap::new(),
            store,
        }
    }

    /// Populate a registry from `store`.
    ///
    /// Entries naming an unknown item or the sentinel, and entries whose value
    /// is not an integer in `0..=max_cap`, are skipped with a warning. If the
    /// store cannot be read at all the registry starts empty.
    pub fn load(store: Box<dyn LimitStore>, catalog: &dyn ItemCatalog, max_cap: u32) -> Self {
        let mut registry = Self::new(store);
        let raw = match registry.store.load() {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "could not load item limits from {}: {} (starting with no limits)",
                    registry.store.describe(),
                    e
                );
                return registry;
            }
        };

        for (key, value) in raw {
            let Some(item) = catalog.resolve(&key).filter(|i| !i.is_air()) else {
                warn!("invalid item in limits file: {}", escape_log(&key));
                continue;
            };
            let cap = match value.as_integer() {
                Some(n) if n >= 0 && n <= i64::from(max_cap) => n as u32,
                _ => {
                    warn!(
                        "invalid limit for {} in limits file: {}",
                        item,
                        escape_log(&value.to_string())
                    );
                    continue;
                }
            };
            registry.limits.insert(item, cap);
        }
        info!(
            "loaded {} limited items from {}",
            registry.limits.len(),
            registry.store.describe()
        );
        registry
    }

    /// Set the cap for `item`, replacing any previous one. Returns false
    /// without touching anything when `item` is the sentinel.
    pub fn add_or_update(&mut self, item: ItemType, cap: u32) -> bool {
        if item.is_air() {
            return false;
        }
        self.limits.insert(item, cap);
        self.flush();
        true
    }

    /// Drop the cap for `item`. Returns whether one existed.
    pub fn remove(&mut self, item: &ItemType) -> bool {
        let removed = self.limits.remove(item).is_some();
        if removed {
            self.flush();
        }
        removed
    }

    pub fn clear(&mut self) {
        self.limits.clear();
        self.flush();
    }

    pub fn lookup(&self, item: &ItemType) -> Option<u32> {
        if item.is_air() {
            return None;
        }
        self.limits.get(item).copied()
    }

    pub fn is_limited(&self, item: &ItemType) -> bool {
        self.lookup(item).is_some()
    }

    pub fn is_banned(&self, item: &ItemType) -> bool {
        self.lookup(item) == Some(0)
    }

    /// Snapshot copy of every entry; later mutations do not affect it.
    pub fn list_all(&self) -> HashMap<ItemType, u32> {
        self.limits.clone()
    }

    /// Entries sorted by item name.
    pub fn sorted_entries(&self) -> Vec<(ItemType, u32)> {
        let mut entries: Vec<_> = self.limits.iter().map(|(k, v)| (k.clone(), *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn item_names(&self) -> Vec<String> {
        self.sorted_entries()
            .into_iter()
            .map(|(item, _)| item.name().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// Persist the full mapping now.
    pub fn save(&self) -> Result<(), LimitError> {
        let snapshot: BTreeMap<String, u32> = self
            .limits
            .iter()
            .map(|(k, v)| (k.name().to_string(), *v))
            .collect();
        self.store.save(&snapshot)?;
        debug!("saved {} limited items to {}", snapshot.len(), self.store.describe());
        Ok(())
    }

    fn flush(&self) {
        if let Err(e) = self.save() {
            error!("could not save item limits to {}: {}", self.store.describe(), e);
        }
    }
}
