//! Query orchestration.
//!
//! Takes one snapshot of the collection and drives it through the shaping and
//! filtering stages in the order selected by [`FilterStage`].

use crate::access::Record;
use crate::catalog::Catalog;
use crate::config::{FilterStage, QueryConfig};
use crate::error::{QueryError, QueryResult};
use crate::executor::{
    collect_all, ExpandTarget, Executor, FilterExecutor, ProjectionExecutor, SelectSet,
    SnapshotScanExecutor,
};
use crate::expression::Expression;
use crate::storage::{EntityStore, StorageError};
use log::{debug, info};

/// Parsed request options for a single collection query
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub select: SelectSet,
    /// Relation names to expand
    pub expand: Vec<String>,
    pub filter: Option<Expression>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, select: SelectSet) -> Self {
        self.select = select;
        self
    }

    pub fn expand<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.expand = relations.into_iter().map(Into::into).collect();
        self
    }

    pub fn filter(mut self, filter: Expression) -> Self {
        self.filter = Some(filter);
        self
    }
}

pub struct QueryExecutor<'a> {
    store: &'a dyn EntityStore,
    catalog: &'a Catalog,
    config: QueryConfig,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(store: &'a dyn EntityStore, catalog: &'a Catalog, config: QueryConfig) -> Self {
        Self {
            store,
            catalog,
            config,
        }
    }

    /// Run `query` against `entity_set` and return the surviving views in
    /// collection order
    pub fn execute(&self, entity_set: &str, query: &Query) -> QueryResult<Vec<Record>> {
        let shape = self
            .catalog
            .get(entity_set)
            .ok_or_else(|| QueryError::UnknownCollection {
                name: entity_set.to_string(),
            })?;
        let expansions = ExpandTarget::resolve(self.catalog, shape, &query.expand)?;

        info!(
            "Query {}: filter={}, select={:?}, expand={:?}, stage={}",
            entity_set,
            query
                .filter
                .as_ref()
                .map_or_else(|| "none".to_string(), |f| f.to_string()),
            query.select.names(),
            query.expand,
            self.config.filter_stage
        );

        let snapshot = self.store.fetch_all(entity_set).map_err(|e| match e {
            StorageError::UnknownCollection(name) => QueryError::UnknownCollection { name },
            other => QueryError::Storage(other),
        })?;
        let scanned = snapshot.len();

        let scan: Box<dyn Executor + '_> = Box::new(SnapshotScanExecutor::new(snapshot));
        let mut pipeline: Box<dyn Executor + '_> = match (self.config.filter_stage, &query.filter)
        {
            (_, None) => Box::new(ProjectionExecutor::new(
                scan,
                shape,
                &query.select,
                expansions,
                self.store,
            )),
            (FilterStage::AfterShaping, Some(predicate)) => Box::new(FilterExecutor::new(
                Box::new(ProjectionExecutor::new(
                    scan,
                    shape,
                    &query.select,
                    expansions,
                    self.store,
                )),
                predicate,
            )),
            (FilterStage::BeforeShaping, Some(predicate)) => Box::new(ProjectionExecutor::new(
                Box::new(FilterExecutor::new(scan, predicate)),
                shape,
                &query.select,
                expansions,
                self.store,
            )),
        };

        let results = collect_all(pipeline.as_mut())?;
        debug!(
            "Query {}: {} scanned, {} returned",
            entity_set,
            scanned,
            results.len()
        );
        Ok(results)
    }
}
