//! Filter executor implementation.
//!
//! This executor passes through the records of its child for which the
//! `$filter` predicate evaluates to true. Evaluation errors abort the query;
//! they are never treated as a non-match.

use crate::access::Record;
use crate::error::QueryResult;
use crate::executor::Executor;
use crate::expression::{matches, Expression};

/// Executor that filters records based on an expression
pub struct FilterExecutor<'a> {
    /// Child executor that produces records
    child: Box<dyn Executor + 'a>,
    /// Filter expression that must evaluate to boolean
    predicate: &'a Expression,
}

impl<'a> FilterExecutor<'a> {
    pub fn new(child: Box<dyn Executor + 'a>, predicate: &'a Expression) -> Self {
        Self { child, predicate }
    }
}

impl Executor for FilterExecutor<'_> {
    fn next(&mut self) -> QueryResult<Option<Record>> {
        while let Some(record) = self.child.next()? {
            if matches(self.predicate, &record)? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }
}
