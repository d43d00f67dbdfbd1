//! In-memory entity store.

use crate::access::{Record, Value};
use crate::storage::{EntityStore, StorageError, StorageResult};
use dashmap::DashMap;
use log::debug;

#[derive(Debug, Clone)]
struct Collection {
    key_field: String,
    records: Vec<Record>,
}

impl Collection {
    fn position_of(&self, key: &Value) -> Option<usize> {
        self.records.iter().position(|record| {
            record
                .get(&self.key_field)
                .is_some_and(|value| value.loosely_equals(key))
        })
    }

    /// Next integer key: one past the largest key in use, if it fits
    fn next_key(&self) -> Option<i32> {
        self.records
            .iter()
            .filter_map(|record| match record.get(&self.key_field) {
                Some(Value::Int32(n)) => Some(*n),
                _ => None,
            })
            .max()
            .unwrap_or(0)
            .checked_add(1)
    }
}

/// Collections held in memory for the lifetime of the process.
///
/// Writers to the same collection are serialized by the map's shard lock, so
/// key assignment in [`EntityStore::upsert`] cannot hand out duplicates.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: DashMap<String, Collection>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            collections: DashMap::new(),
        }
    }

    /// Create an empty collection; an existing collection is left untouched
    pub fn create_collection(&self, name: impl Into<String>, key_field: impl Into<String>) {
        let key_field = key_field.into();
        self.collections
            .entry(name.into())
            .or_insert_with(|| Collection {
                key_field,
                records: Vec::new(),
            });
    }

    pub fn record_count(&self, name: &str) -> usize {
        self.collections
            .get(name)
            .map(|c| c.records.len())
            .unwrap_or(0)
    }
}

impl EntityStore for MemoryStore {
    fn fetch_all(&self, collection: &str) -> StorageResult<Vec<Record>> {
        let entry = self
            .collections
            .get(collection)
            .ok_or_else(|| StorageError::UnknownCollection(collection.to_string()))?;
        debug!("Fetching all {} ({} records)", collection, entry.records.len());
        Ok(entry.records.clone())
    }

    fn fetch_by_key(&self, collection: &str, key: &Value) -> StorageResult<Option<Record>> {
        let entry = self
            .collections
            .get(collection)
            .ok_or_else(|| StorageError::UnknownCollection(collection.to_string()))?;
        debug!("Fetching {} with key {}", collection, key);
        Ok(entry
            .position_of(key)
            .map(|idx| entry.records[idx].clone()))
    }

    fn upsert(&self, collection: &str, mut record: Record) -> StorageResult<Record> {
        let mut entry = self
            .collections
            .get_mut(collection)
            .ok_or_else(|| StorageError::UnknownCollection(collection.to_string()))?;

        let key_field = entry.key_field.clone();
        let key = match record.get(&key_field) {
            None | Some(Value::Null) | Some(Value::Int32(0)) => {
                let key = entry
                    .next_key()
                    .map(Value::Int32)
                    .ok_or_else(|| StorageError::KeySpaceExhausted {
                        collection: collection.to_string(),
                    })?;
                record.insert(key_field.clone(), key.clone());
                key
            }
            Some(key) => key.clone(),
        };

        debug!("Saving {} with key {}", collection, key);
        let position = entry.position_of(&key);
        match position {
            Some(idx) => entry.records[idx] = record.clone(),
            None => entry.records.push(record.clone()),
        }
        Ok(record)
    }
}
