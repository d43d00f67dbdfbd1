//! Executor layer for query execution.
//!
//! Queries run as a Volcano-style pipeline: each executor produces records one
//! at a time via `next()`, pulling from its child. A query is assembled from a
//! snapshot scan, a shaping stage (projection plus expansion) and an optional
//! filter stage; `QueryExecutor` picks the stage order from the configuration.

use crate::access::Record;
use crate::error::QueryResult;

pub mod expansion;
pub mod filter;
pub mod projection;
pub mod query;
pub mod scan;

pub use expansion::{expand, ExpandTarget};
pub use filter::FilterExecutor;
pub use projection::{project, ProjectionExecutor, SelectSet};
pub use query::{Query, QueryExecutor};
pub use scan::SnapshotScanExecutor;

/// Trait for all query executors
pub trait Executor {
    /// Get the next record from the executor.
    /// Returns None when there are no more records.
    fn next(&mut self) -> QueryResult<Option<Record>>;
}

/// Drain an executor, stopping at the first error
pub fn collect_all(executor: &mut dyn Executor) -> QueryResult<Vec<Record>> {
    let mut records = Vec::new();
    while let Some(record) = executor.next()? {
        records.push(record);
    }
    Ok(records)
}
