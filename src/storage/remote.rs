//! Store wrapper that behaves like a remote service.
//!
//! Calls on the remote collections pay the profile's latency and may fail with
//! [`StorageError::Unavailable`]. Other collections are served directly. Call
//! counts cover every collection so callers can check which lookups happened.

use crate::access::{Record, Value};
use crate::config::RemoteProfile;
use crate::storage::{EntityStore, StorageError, StorageResult};
use log::{debug, warn};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

pub struct SimulatedRemoteStore<S> {
    inner: S,
    profile: RemoteProfile,
    rng: Mutex<StdRng>,
    /// Collections behind the simulated link; `None` means all of them
    remote_collections: Option<Vec<String>>,
    fetch_all_calls: AtomicUsize,
    fetch_by_key_calls: AtomicUsize,
}

impl<S: EntityStore> SimulatedRemoteStore<S> {
    pub fn new(inner: S, profile: RemoteProfile) -> Self {
        Self::with_rng(inner, profile, StdRng::from_entropy())
    }

    /// Deterministic failure injection for tests
    pub fn with_seed(inner: S, profile: RemoteProfile, seed: u64) -> Self {
        Self::with_rng(inner, profile, StdRng::seed_from_u64(seed))
    }

    fn with_rng(inner: S, profile: RemoteProfile, rng: StdRng) -> Self {
        Self {
            inner,
            profile,
            rng: Mutex::new(rng),
            remote_collections: None,
            fetch_all_calls: AtomicUsize::new(0),
            fetch_by_key_calls: AtomicUsize::new(0),
        }
    }

    /// Limit the simulated link to the named collections
    pub fn scoped_to<I, T>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.remote_collections = Some(collections.into_iter().map(Into::into).collect());
        self
    }

    pub fn is_remote(&self, collection: &str) -> bool {
        self.remote_collections
            .as_ref()
            .map_or(true, |names| names.iter().any(|name| name == collection))
    }

    pub fn fetch_all_calls(&self) -> usize {
        self.fetch_all_calls.load(Ordering::Relaxed)
    }

    pub fn fetch_by_key_calls(&self) -> usize {
        self.fetch_by_key_calls.load(Ordering::Relaxed)
    }

    fn remote_call(&self, collection: &str, operation: &str) -> StorageResult<()> {
        if !self.is_remote(collection) {
            return Ok(());
        }
        debug!("Remote call: {} on {}", operation, collection);

        let latency = self.profile.latency();
        if !latency.is_zero() {
            thread::sleep(latency);
        }

        let failure_rate = self.profile.failure_rate();
        if failure_rate > 0.0 && self.rng.lock().gen_bool(failure_rate) {
            warn!("Remote call {} on {} failed", operation, collection);
            return Err(StorageError::Unavailable {
                collection: collection.to_string(),
            });
        }

        Ok(())
    }
}

impl<S: EntityStore> EntityStore for SimulatedRemoteStore<S> {
    fn fetch_all(&self, collection: &str) -> StorageResult<Vec<Record>> {
        self.fetch_all_calls.fetch_add(1, Ordering::Relaxed);
        self.remote_call(collection, "fetch_all")?;
        self.inner.fetch_all(collection)
    }

    fn fetch_by_key(&self, collection: &str, key: &Value) -> StorageResult<Option<Record>> {
        self.fetch_by_key_calls.fetch_add(1, Ordering::Relaxed);
        self.remote_call(collection, "fetch_by_key")?;
        self.inner.fetch_by_key(collection, key)
    }

    fn upsert(&self, collection: &str, record: Record) -> StorageResult<Record> {
        self.remote_call(collection, "upsert")?;
        self.inner.upsert(collection, record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::time::{Duration, Instant};

    fn inner_store() -> MemoryStore {
        let store = MemoryStore::new();
        store.create_collection("Brands", "ID");
        store
            .upsert("Brands", Record::new().with("ID", 1).with("Name", "TechGiant"))
            .unwrap();
        store
    }

    #[test]
    fn test_transparent_profile_passes_through() {
        let store = SimulatedRemoteStore::new(inner_store(), RemoteProfile::default());

        assert_eq!(store.fetch_all("Brands").unwrap().len(), 1);
        assert!(store.fetch_by_key("Brands", &Value::Int32(1)).unwrap().is_some());
        assert!(store.fetch_by_key("Brands", &Value::Int32(2)).unwrap().is_none());
        assert_eq!(store.fetch_all_calls(), 1);
        assert_eq!(store.fetch_by_key_calls(), 2);
    }

    #[test]
    fn test_always_failing_profile() {
        let profile = RemoteProfile::new(Duration::ZERO, 1.0);
        let store = SimulatedRemoteStore::with_seed(inner_store(), profile, 7);

        assert_eq!(
            store.fetch_by_key("Brands", &Value::Int32(1)),
            Err(StorageError::Unavailable {
                collection: "Brands".to_string()
            })
        );
        assert_eq!(store.fetch_by_key_calls(), 1);
    }

    #[test]
    fn test_scoped_collections() {
        let store = inner_store();
        store.create_collection("Products", "ID");
        store
            .upsert("Products", Record::new().with("ID", 1).with("BrandID", 1))
            .unwrap();

        let profile = RemoteProfile::new(Duration::ZERO, 1.0);
        let store = SimulatedRemoteStore::with_seed(store, profile, 7).scoped_to(["Brands"]);
        assert!(store.is_remote("Brands"));
        assert!(!store.is_remote("Products"));

        assert_eq!(store.fetch_all("Products").unwrap().len(), 1);
        assert!(store.upsert("Products", Record::new().with("ID", 2)).is_ok());
        assert_eq!(
            store.fetch_by_key("Brands", &Value::Int32(1)),
            Err(StorageError::Unavailable {
                collection: "Brands".to_string()
            })
        );
        assert_eq!(store.fetch_all_calls(), 1);
        assert_eq!(store.fetch_by_key_calls(), 1);
    }

    #[test]
    fn test_latency_is_applied() {
        let profile = RemoteProfile::new(Duration::from_millis(20), 0.0);
        let store = SimulatedRemoteStore::new(inner_store(), profile);

        let started = Instant::now();
        store.fetch_all("Brands").unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
