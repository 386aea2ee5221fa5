//! JSON-file key-value store confined to one directory.
//!
//! The store is a single JSON object file. Every write replaces the file
//! through a temporary sibling and a rename, so readers see either the old
//! or the new contents. A corrupt file fails reads but is overwritten by the
//! next write.

use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use std::sync::Mutex;

use cap_std::{ambient_authority, fs::Dir};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{KeyValueStore, StoreError};

/// Default file name inside the storage directory.
pub const DEFAULT_STORE_FILE: &str = "session.json";

type Entries = BTreeMap<String, String>;

/// [`KeyValueStore`] persisted as `session.json` in a capability directory.
#[derive(Debug)]
pub struct FileKeyValueStore {
    dir: Dir,
    file_name: String,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    /// Open (creating if needed) the store directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] when the directory cannot be created or
    /// opened.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        Dir::create_ambient_dir_all(path, ambient_authority()).map_err(|error| {
            StoreError::write(format!("create {}: {error}", path.display()))
        })?;
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(|error| {
            StoreError::write(format!("open {}: {error}", path.display()))
        })?;
        Ok(Self::in_dir(dir))
    }

    /// Use an already opened directory.
    pub fn in_dir(dir: Dir) -> Self {
        Self {
            dir,
            file_name: DEFAULT_STORE_FILE.to_owned(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_raw(&self) -> Result<Option<String>, StoreError> {
        match self.dir.read_to_string(&self.file_name) {
            Ok(raw) if raw.trim().is_empty() => Ok(None),
            Ok(raw) => Ok(Some(raw)),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(StoreError::read(format!("{}: {error}", self.file_name))),
        }
    }

    fn load(&self) -> Result<Entries, StoreError> {
        let Some(raw) = self.read_raw()? else {
            return Ok(Entries::new());
        };
        serde_json::from_str(&raw)
            .map_err(|error| StoreError::read(format!("{} is corrupt: {error}", self.file_name)))
    }

    fn load_for_update(&self) -> Result<Entries, StoreError> {
        let Some(raw) = self.read_raw()? else {
            return Ok(Entries::new());
        };
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(error) => {
                warn!(
                    file = %self.file_name,
                    error = %error,
                    "discarding corrupt store file"
                );
                Ok(Entries::new())
            }
        }
    }

    fn persist(&self, entries: &Entries) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(entries)
            .map_err(|error| StoreError::write(error.to_string()))?;
        let temp_name = format!(".{}.{}.tmp", self.file_name, Uuid::new_v4());
        self.dir
            .write(&temp_name, &bytes)
            .map_err(|error| StoreError::write(format!("{temp_name}: {error}")))?;
        if let Err(error) = self.dir.rename(&temp_name, &self.dir, &self.file_name) {
            if let Err(cleanup) = self.dir.remove_file(&temp_name) {
                warn!(file = %temp_name, error = %cleanup, "temporary store file left behind");
            }
            return Err(StoreError::write(format!("{}: {error}", self.file_name)));
        }
        Ok(())
    }

    fn update(&self, change: impl FnOnce(&mut Entries)) -> Result<(), StoreError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::write("file store lock poisoned"))?;
        let mut entries = self.load_for_update()?;
        change(&mut entries);
        self.persist(&entries)
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.insert(key.to_owned(), value.to_owned());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }
}
