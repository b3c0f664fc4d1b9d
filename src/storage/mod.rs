//! # Limit Storage
//!
//! Persistence for the limit registry: a single mapping of item name to cap
//! kept under the `[limited-items]` section of a TOML file.
//!
//! ```toml
//! [limited-items]
//! GOLDEN_APPLE = 4
//! TOTEM_OF_UNDYING = 0
//! ```
//!
//! The store hands raw TOML values to the registry on load so that a single
//! malformed entry can be skipped without discarding the rest of the file.
//! Saves replace the whole file atomically under an exclusive lock.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use fs2::FileExt;
use log::debug;
use serde::Serialize;

use crate::limits::errors::LimitError;

/// Top-level section holding the item → cap mapping.
pub const LIMITS_SECTION: &str = "limited-items";

/// Key → integer storage backing the registry.
pub trait LimitStore: Send {
    /// Raw contents of the limits section; empty when the section is absent.
    fn load(&self) -> Result<toml::Table, LimitError>;

    /// Replace the persisted mapping with `limits`.
    fn save(&self, limits: &BTreeMap<String, u32>) -> Result<(), LimitError>;

    /// Human-readable location for log lines.
    fn describe(&self) -> String;
}

#[derive(Serialize)]
struct LimitsFile<'a> {
    #[serde(rename = "limited-items", skip_serializing_if = "BTreeMap::is_empty")]
    limited_items: &'a BTreeMap<String, u32>,
}

fn section_of(mut table: toml::Table) -> Result<toml::Table, LimitError> {
    match table.remove(LIMITS_SECTION) {
        None => Ok(toml::Table::new()),
        Some(toml::Value::Table(section)) => Ok(section),
        Some(other) => Err(LimitError::Malformed(format!(
            "[{}] must be a table, found {}",
            LIMITS_SECTION,
            other.type_str()
        ))),
    }
}

/// File-backed store (`<data_dir>/limited-items.toml` by default).
#[derive(Debug, Clone)]
pub struct TomlLimitStore {
    path: PathBuf,
}

impl TomlLimitStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the parent directory and an empty file if the file is missing.
    fn ensure_exists(&self) -> Result<(), LimitError> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        File::create(&self.path)?;
        debug!("created empty limits file {}", self.path.display());
        Ok(())
    }

    /// Write `content` to `path` under an exclusive lock via temp file + rename.
    fn write_file_locked(path: &Path, content: &str) -> Result<(), LimitError> {
        // Step 1: Open (or create) the destination file to acquire an exclusive lock
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)?;
        lock_file.lock_exclusive()?;

        // Step 2: Create a unique temp file in the same directory
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
        let base = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("limited-items.toml");
        let mut counter = 0u32;
        let tmp_path = loop {
            let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
            match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(mut tmp) => {
                    tmp.write_all(content.as_bytes())?;
                    tmp.flush()?;
                    let _ = tmp.sync_all();
                    break candidate;
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    counter = counter.saturating_add(1);
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        };

        // Step 3: Atomically replace the destination with the temp file
        fs::rename(&tmp_path, path)?;

        // Step 4: Fsync the directory to persist the rename (best-effort)
        if let Ok(dir_file) = File::open(dir) {
            let _ = dir_file.sync_all();
        }

        drop(lock_file);
        Ok(())
    }
}

impl LimitStore for TomlLimitStore {
    fn load(&self) -> Result<toml::Table, LimitError> {
        self.ensure_exists()?;
        let content = fs::read_to_string(&self.path)?;
        let table: toml::Table = content.parse()?;
        section_of(table)
    }

    fn save(&self, limits: &BTreeMap<String, u32>) -> Result<(), LimitError> {
        self.ensure_exists()?;
        let content = toml::to_string_pretty(&LimitsFile {
            limited_items: limits,
        })?;
        Self::write_file_locked(&self.path, &content)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    table: toml::Table,
}

/// In-memory store. Clones share state, so a test can keep a handle after
/// moving one into a registry.
#[derive(Debug, Clone, Default)]
pub struct MemoryLimitStore {
    state: Arc<Mutex<MemoryState>>,
    fail_saves: Arc<AtomicBool>,
    fail_loads: Arc<AtomicBool>,
    saves: Arc<AtomicUsize>,
}

impl MemoryLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store whose limits section starts out as `raw` (may contain junk).
    pub fn with_raw(raw: toml::Table) -> Self {
        let store = Self::default();
        if let Ok(mut state) = store.state.lock() {
            state.table = raw;
        }
        store
    }

    /// Make every subsequent save fail with an IO error.
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent load fail with an IO error.
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Snapshot of what is currently persisted.
    pub fn persisted(&self) -> BTreeMap<String, i64> {
        self.state
            .lock()
            .map(|state| {
                state
                    .table
                    .iter()
                    .filter_map(|(k, v)| v.as_integer().map(|n| (k.clone(), n)))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl LimitStore for MemoryLimitStore {
    fn load(&self) -> Result<toml::Table, LimitError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "load failure injected").into());
        }
        let state = self
            .state
            .lock()
            .map_err(|_| LimitError::Malformed("memory store lock poisoned".to_string()))?;
        Ok(state.table.clone())
    }

    fn save(&self, limits: &BTreeMap<String, u32>) -> Result<(), LimitError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "save failure injected").into());
        }
        let mut state = self
            .state
            .lock()
            .map_err(|_| LimitError::Malformed("memory store lock poisoned".to_string()))?;
        state.table = limits
            .iter()
            .map(|(k, v)| (k.clone(), toml::Value::Integer(i64::from(*v))))
            .collect();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("limited-items.toml");
        let store = TomlLimitStore::new(&path);
        let table = store.load().expect("load");
        assert!(table.is_empty());
        assert!(path.exists());
    }

    #[test]
    fn save_writes_nested_section() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("limited-items.toml");
        let store = TomlLimitStore::new(&path);
        let mut limits = BTreeMap::new();
        limits.insert("GOLDEN_APPLE".to_string(), 4);
        limits.insert("TOTEM_OF_UNDYING".to_string(), 0);
        store.save(&limits).expect("save");

        let text = fs::read_to_string(&path).expect("read");
        assert!(text.contains("[limited-items]"));
        assert!(text.contains("GOLDEN_APPLE = 4"));

        let table = store.load().expect("load");
        assert_eq!(table.get("TOTEM_OF_UNDYING").and_then(|v| v.as_integer()), Some(0));
    }

    #[test]
    fn saving_empty_mapping_drops_section() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("limited-items.toml");
        let store = TomlLimitStore::new(&path);
        store.save(&BTreeMap::new()).expect("save");
        let text = fs::read_to_string(&path).expect("read");
        assert!(!text.contains("limited-items"));
        assert!(store.load().expect("load").is_empty());
    }

    #[test]
    fn non_table_section_is_malformed() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("limited-items.toml");
        fs::write(&path, "limited-items = 5\n").expect("write");
        let err = TomlLimitStore::new(&path).load().unwrap_err();
        assert!(matches!(err, LimitError::Malformed(_)));
    }

    #[test]
    fn memory_store_failure_switches() {
        let store = MemoryLimitStore::new();
        store.set_fail_saves(true);
        assert!(store.save(&BTreeMap::new()).is_err());
        store.set_fail_saves(false);
        assert!(store.save(&BTreeMap::new()).is_ok());
        assert_eq!(store.save_count(), 1);
        store.set_fail_loads(true);
        assert!(store.load().is_err());
    }
}
