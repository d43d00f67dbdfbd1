//! Storage collaborator for entity collections.
//!
//! The query engine only sees the [`EntityStore`] trait. Implementations:
//!
//! - **MemoryStore**: In-memory collections seeded at process start
//! - **SimulatedRemoteStore**: Wrapper that models a remote service with
//!   latency and failure injection
//!
//! Reads hand out owned copies, so a request never observes a concurrent
//! write to the backing collection.

pub mod error;
pub mod memory;
pub mod remote;
pub mod seed;

use crate::access::{Record, Value};

pub use error::{StorageError, StorageResult};
pub use memory::MemoryStore;
pub use remote::SimulatedRemoteStore;

/// Capability the query engine needs from entity storage
pub trait EntityStore: Send + Sync {
    /// Full snapshot of a collection in collection order
    fn fetch_all(&self, collection: &str) -> StorageResult<Vec<Record>>;

    /// Single record by key value
    fn fetch_by_key(&self, collection: &str, key: &Value) -> StorageResult<Option<Record>>;

    /// Insert or replace a record, assigning a key when it has none
    fn upsert(&self, collection: &str, record: Record) -> StorageResult<Record>;
}
