//! Projection executor implementation.
//!
//! This executor shapes each source record from its child into the view that is
//! returned to the caller: the selected fields in schema order, followed by any
//! requested expansions resolved against the source record.

use crate::access::Record;
use crate::catalog::EntityShape;
use crate::error::QueryResult;
use crate::executor::{expand, ExpandTarget, Executor};
use crate::storage::EntityStore;

/// Requested field names; empty means every declared field
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectSet {
    names: Vec<String>,
}

impl SelectSet {
    pub fn all() -> Self {
        Self { names: Vec::new() }
    }

    /// Build from names in request order, dropping duplicates
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::all();
        for name in names {
            let name = name.into();
            if !set.names.contains(&name) {
                set.names.push(name);
            }
        }
        set
    }

    pub fn is_all(&self) -> bool {
        self.names.is_empty()
    }

    pub fn includes(&self, name: &str) -> bool {
        self.is_all() || self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Reduce `record` to the selected declared fields of `shape`.
///
/// Output follows schema order, not request order. Names that are not declared
/// on the shape are ignored, and so are declared fields the record lacks.
pub fn project(record: &Record, shape: &EntityShape, select: &SelectSet) -> Record {
    let mut projected = Record::with_capacity(shape.fields.len());
    for name in shape.field_names() {
        if !select.includes(name) {
            continue;
        }
        if let Some(value) = record.get(name) {
            projected.insert(name, value.clone());
        }
    }
    projected
}

/// Executor that projects and expands child records
pub struct ProjectionExecutor<'a> {
    /// Child executor producing full source records
    child: Box<dyn Executor + 'a>,
    shape: &'a EntityShape,
    select: &'a SelectSet,
    /// Relations to attach to every view
    expansions: Vec<ExpandTarget<'a>>,
    store: &'a dyn EntityStore,
}

impl<'a> ProjectionExecutor<'a> {
    pub fn new(
        child: Box<dyn Executor + 'a>,
        shape: &'a EntityShape,
        select: &'a SelectSet,
        expansions: Vec<ExpandTarget<'a>>,
        store: &'a dyn EntityStore,
    ) -> Self {
        Self {
            child,
            shape,
            select,
            expansions,
            store,
        }
    }
}

impl Executor for ProjectionExecutor<'_> {
    fn next(&mut self) -> QueryResult<Option<Record>> {
        let Some(source) = self.child.next()? else {
            return Ok(None);
        };

        let mut view = project(&source, self.shape, self.select);
        for target in &self.expansions {
            view = expand(view, &source, target, |key| {
                self.store.fetch_by_key(&target.relation.target_set, key)
            })?;
        }

        Ok(Some(view))
    }
}
