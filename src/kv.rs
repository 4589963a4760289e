// src/kv.rs
use crate::error::{StoreError, StoreResult};
use log;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// The persistence substrate: string values under string keys.
///
/// `set` is expected to be durable once it returns `Ok`. Values are always
/// replaced whole; there is no partial write.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}

/// Directory-backed key-value store. Each key lives in its own file named
/// after the hex encoding of the key, so keys like `@notes_v1` stay path-safe.
#[derive(Debug, Clone)]
pub struct FileKv {
    root: PathBuf,
}

impl FileKv {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileKv { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", hex::encode(key)))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!(".{}.json.tmp", hex::encode(key)))
    }

    fn discard_temp(&self, temp_path: &Path) {
        match fs::remove_file(temp_path) {
            Ok(()) => log::debug!("Removed leftover {:?}", temp_path),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => log::warn!("Could not remove leftover {:?}: {}", temp_path, e),
        }
    }
}

impl KeyValueStore for FileKv {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(value) => {
                log::debug!("Read {} bytes for key '{}' from {:?}", value.len(), key, path);
                Ok(Some(value))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::debug!("No value stored for key '{}'", key);
                Ok(None)
            }
            Err(e) => {
                log::error!("Failed to read key '{}' from {:?}: {}", key, path, e);
                Err(StoreError::Io(e))
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(|e| {
                log::error!("Failed to create data directory {:?}: {}", self.root, e);
                StoreError::Io(e)
            })?;
            log::info!("Created data directory {:?}", self.root);
        }

        // Write to a sibling temp file and rename over the target so readers
        // only ever observe the old or the new value.
        let temp_path = self.temp_path_for(key);
        let path = self.path_for(key);
        let written = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .and_then(|mut file| {
                file.write_all(value.as_bytes())?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&temp_path, &path));

        if let Err(e) = written {
            log::error!("Failed to store key '{}' at {:?} via {:?}: {}", key, path, temp_path, e);
            self.discard_temp(&temp_path);
            return Err(StoreError::Io(e));
        }
        log::debug!("Stored {} bytes under key '{}'", value.len(), key);
        Ok(())
    }
}
