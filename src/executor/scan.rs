//! Snapshot scan executor.
//!
//! Yields the records of an already-fetched collection snapshot in collection
//! order. The snapshot is owned, so the scan is isolated from later writes.

use crate::access::Record;
use crate::error::QueryResult;
use crate::executor::Executor;

pub struct SnapshotScanExecutor {
    records: std::vec::IntoIter<Record>,
}

impl SnapshotScanExecutor {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into_iter(),
        }
    }
}

impl Executor for SnapshotScanExecutor {
    fn next(&mut self) -> QueryResult<Option<Record>> {
        Ok(self.records.next())
    }
}
