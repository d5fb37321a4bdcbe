//! Durable key-value storage for small integer preferences.
//!
//! Values written with `set_int` are only durable after `save` returns `Ok`. Both stores here
//! honour that: the file store commits through a synced temp file + rename, and the memory
//! store keeps a separate "durable" map that only `save` updates.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;

pub trait KeyValueStore {
    /// Returns `None` for missing keys and for values that are not integers.
    fn get_int(&self, key: &str) -> Option<i64>;
    fn set_int(&mut self, key: &str, value: i64);
    fn remove(&mut self, key: &str);
    /// Commits every pending write before returning.
    fn save(&mut self) -> Result<(), StorageError>;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode store: {0}")]
    Encode(#[from] serde_json::Error),
}

const PREFS_PATH_ENV: &str = "MENU_PREFS_PATH";

/// An explicit path wins. Otherwise `menu-kit/prefs.json` under the first config home found.
fn prefs_path(
    explicit: Option<OsString>,
    xdg_config: Option<OsString>,
    home: Option<OsString>,
) -> PathBuf {
    if let Some(explicit) = explicit {
        return PathBuf::from(explicit);
    }
    let config_home = xdg_config
        .map(PathBuf::from)
        .or_else(|| home.map(|home| Path::new(&home).join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));
    config_home.join("menu-kit").join("prefs.json")
}

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
}

impl JsonFileStore {
    pub fn from_env() -> Self {
        Self::open(Self::default_path())
    }

    pub fn default_path() -> PathBuf {
        prefs_path(
            std::env::var_os(PREFS_PATH_ENV),
            std::env::var_os("XDG_CONFIG_HOME"),
            std::env::var_os("HOME"),
        )
    }

    /// Opens the store at `path`. A missing or unreadable file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = read_entries(&path);
        Self { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn io_error(&self, source: io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

fn read_entries(path: &Path) -> BTreeMap<String, Value> {
    let Ok(bytes) = fs::read(path) else {
        return BTreeMap::new();
    };
    match serde_json::from_slice::<BTreeMap<String, Value>>(&bytes) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %path.display(), "ignoring unreadable preference file: {err}");
            BTreeMap::new()
        }
    }
}

impl KeyValueStore for JsonFileStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.entries.get(key).and_then(Value::as_i64)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.entries.insert(key.to_string(), Value::from(value));
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }

    fn save(&mut self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
            }
        }
        let text = serde_json::to_string_pretty(&self.entries)?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        let written = File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(text.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(err) = written {
            let _ = fs::remove_file(&tmp);
            return Err(self.io_error(err));
        }
        Ok(())
    }
}

/// In-process store that models a disk: writes stay pending until `save`.
///
/// Clones share the durable map, so a clone kept by a test can `reopen` the store the way a
/// restarted process would.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pending: BTreeMap<String, i64>,
    durable: Rc<RefCell<BTreeMap<String, i64>>>,
    saves: Rc<Cell<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a value as if an earlier session had saved it.
    pub fn with_entry(mut self, key: &str, value: i64) -> Self {
        self.pending.insert(key.to_string(), value);
        self.durable.borrow_mut().insert(key.to_string(), value);
        self
    }

    /// A fresh view of only what has been saved, sharing the same durable backing.
    pub fn reopen(&self) -> Self {
        Self {
            pending: self.durable.borrow().clone(),
            durable: Rc::clone(&self.durable),
            saves: Rc::clone(&self.saves),
        }
    }

    pub fn durable_int(&self, key: &str) -> Option<i64> {
        self.durable.borrow().get(key).copied()
    }

    pub fn save_count(&self) -> usize {
        self.saves.get()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_int(&self, key: &str) -> Option<i64> {
        self.pending.get(key).copied()
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.pending.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.pending.remove(key);
    }

    fn save(&mut self) -> Result<(), StorageError> {
        *self.durable.borrow_mut() = self.pending.clone();
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_writes_are_not_durable_until_saved() {
        let disk = MemoryStore::new();
        let mut store = disk.clone();
        store.set_int("SFXEnabled", 0);
        assert_eq!(store.get_int("SFXEnabled"), Some(0));
        assert_eq!(disk.reopen().get_int("SFXEnabled"), None);

        store.save().expect("memory save");
        assert_eq!(disk.reopen().get_int("SFXEnabled"), Some(0));
        assert_eq!(disk.save_count(), 1);
    }

    #[test]
    fn prefs_path_prefers_explicit_then_xdg_then_home() {
        let explicit = Some(OsString::from("/tmp/custom.json"));
        let xdg = Some(OsString::from("/xdg"));
        let home = Some(OsString::from("/home/player"));

        assert_eq!(
            prefs_path(explicit, xdg.clone(), home.clone()),
            PathBuf::from("/tmp/custom.json")
        );
        assert_eq!(
            prefs_path(None, xdg, home.clone()),
            PathBuf::from("/xdg/menu-kit/prefs.json")
        );
        assert_eq!(
            prefs_path(None, None, home),
            PathBuf::from("/home/player/.config/menu-kit/prefs.json")
        );
        assert_eq!(prefs_path(None, None, None), PathBuf::from("./menu-kit/prefs.json"));
    }

    #[test]
    fn memory_store_remove_commits_on_save() {
        let disk = MemoryStore::new().with_entry("MusicEnabled", 0);
        let mut store = disk.reopen();
        store.remove("MusicEnabled");
        assert_eq!(disk.durable_int("MusicEnabled"), Some(0));
        store.save().expect("memory save");
        assert_eq!(disk.durable_int("MusicEnabled"), None);
    }
}
