// src/store.rs
use crate::error::{StoreError, StoreResult};
use crate::kv::KeyValueStore;
use crate::models::Record;
use log;
use std::sync::Mutex;

/// Full-collection CRUD over the key-value substrate.
///
/// Every operation reads the whole collection stored under the record type's
/// key, changes it in memory and writes the whole collection back. Mutations
/// made through one `CollectionStore` are serialized by `write_lock`; writers
/// in other processes sharing the same substrate are not, and the last write
/// wins.
pub struct CollectionStore<S: KeyValueStore> {
    kv: S,
    write_lock: Mutex<()>,
}

impl<S: KeyValueStore> CollectionStore<S> {
    pub fn new(kv: S) -> Self {
        CollectionStore { kv, write_lock: Mutex::new(()) }
    }

    /// The substrate, for callers that persist scalars next to the collections.
    pub fn kv(&self) -> &S {
        &self.kv
    }

    /// Reads the full collection. An absent key is an empty collection. A value
    /// that is not a JSON array is `StoreError::CorruptData`; an array holding an
    /// element that does not fit `T` is `StoreError::InvalidRecord`.
    pub fn load_all<T: Record>(&self) -> StoreResult<Vec<T>> {
        let raw = match self.kv.get(T::STORAGE_KEY)? {
            Some(raw) => raw,
            None => {
                log::debug!("No {} collection stored yet", T::KIND);
                return Ok(Vec::new());
            }
        };

        let values: Vec<serde_json::Value> = serde_json::from_str(&raw).map_err(|e| {
            log::warn!("Stored {} collection under '{}' is not readable: {}", T::KIND, T::STORAGE_KEY, e);
            StoreError::CorruptData { key: T::STORAGE_KEY.to_string(), reason: e.to_string() }
        })?;
        let items = values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<T>(value).map_err(|e| {
                    log::warn!("{} record {} under '{}' is not readable: {}", T::KIND, index, T::STORAGE_KEY, e);
                    StoreError::InvalidRecord {
                        key: T::STORAGE_KEY.to_string(),
                        reason: format!("element {}: {}", index, e),
                    }
                })
            })
            .collect::<StoreResult<Vec<T>>>()?;
        log::debug!("Loaded {} {} record(s)", items.len(), T::KIND);
        Ok(items)
    }

    /// Caller-facing load: any failure reads as an empty collection.
    pub fn load_or_empty<T: Record>(&self) -> Vec<T> {
        match self.load_all::<T>() {
            Ok(items) => items,
            Err(e) => {
                log::error!("Error loading {} collection, treating it as empty: {}", T::KIND, e);
                Vec::new()
            }
        }
    }

    /// Linear scan for the record with `id`.
    pub fn find<T: Record>(&self, id: &str) -> Option<T> {
        self.load_or_empty::<T>().into_iter().find(|item| item.id() == id)
    }

    /// Prepends `item` so the collection stays most-recent-first.
    pub fn insert<T: Record>(&self, item: T) -> bool {
        let id = item.id().to_string();
        report(T::KIND, "insert", &id, self.try_insert(item))
    }

    /// Replaces the first record whose id matches, keeping its position. A
    /// missing id leaves the collection as it was.
    pub fn update<T: Record>(&self, item: T) -> bool {
        let id = item.id().to_string();
        report(T::KIND, "update", &id, self.try_update(item))
    }

    /// Removes every record with `id`. Succeeds when nothing matched.
    pub fn delete<T: Record>(&self, id: &str) -> bool {
        report(T::KIND, "delete", id, self.try_delete::<T>(id))
    }

    pub fn try_insert<T: Record>(&self, item: T) -> StoreResult<()> {
        self.read_modify_write(|items: &mut Vec<T>| {
            items.insert(0, item);
        })
    }

    pub fn try_update<T: Record>(&self, item: T) -> StoreResult<()> {
        self.read_modify_write(|items: &mut Vec<T>| {
            match items.iter_mut().find(|existing| existing.id() == item.id()) {
                Some(slot) => *slot = item,
                None => log::debug!("No {} with id {} to update; collection unchanged", T::KIND, item.id()),
            }
        })
    }

    pub fn try_delete<T: Record>(&self, id: &str) -> StoreResult<()> {
        self.read_modify_write(|items: &mut Vec<T>| {
            let before = items.len();
            items.retain(|item| item.id() != id);
            log::debug!("Removed {} {} record(s) with id {}", before - items.len(), T::KIND, id);
        })
    }

    fn read_modify_write<T, F>(&self, mutate: F) -> StoreResult<()>
    where
        T: Record,
        F: FnOnce(&mut Vec<T>),
    {
        // The guard protects no data, so a poisoned lock is still usable.
        let _guard = self.write_lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut items = match self.load_all::<T>() {
            Ok(items) => items,
            Err(StoreError::CorruptData { key, reason }) => {
                log::warn!("Overwriting unreadable {} collection under '{}' ({})", T::KIND, key, reason);
                Vec::new()
            }
            // InvalidRecord propagates: the readable records next to it must survive.
            Err(e) => return Err(e),
        };

        mutate(&mut items);

        let serialized = serde_json::to_string(&items).map_err(|e| {
            let msg = format!("JSON serialization of {} collection failed: {}", T::KIND, e);
            log::error!("read_modify_write: {}", msg);
            StoreError::Serialization(msg)
        })?;
        self.kv.set(T::STORAGE_KEY, &serialized)
    }
}

fn report(kind: &str, op: &str, id: &str, result: StoreResult<()>) -> bool {
    match result {
        Ok(()) => {
            log::info!("{} {} {}: ok", kind, op, id);
            true
        }
        Err(e) => {
            log::error!("Error during {} {} {}: {}", kind, op, id, e);
            false
        }
    }
}
