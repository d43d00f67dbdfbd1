//! Query service: the entry point shared by the HTTP layer and library users.
//!
//! Parses raw `$filter`/`$select`/`$expand` strings, runs the query executor and
//! handles entity creation.

use crate::access::Record;
use crate::catalog::{Catalog, EntityShape};
use crate::config::QueryConfig;
use crate::error::{QueryError, QueryResult};
use crate::executor::{Query, QueryExecutor};
use crate::odata::{parse_expand, parse_filter, parse_select};
use crate::storage::EntityStore;
use log::info;
use std::sync::Arc;

#[derive(Clone)]
pub struct QueryService {
    catalog: Arc<Catalog>,
    store: Arc<dyn EntityStore>,
    config: QueryConfig,
}

impl QueryService {
    pub fn new(catalog: Arc<Catalog>, store: Arc<dyn EntityStore>, config: QueryConfig) -> Self {
        Self {
            catalog,
            store,
            config,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Run a query; `expand` resolves every relation declared on the collection
    pub fn run_query(
        &self,
        collection: &str,
        filter: Option<&str>,
        select: Option<&str>,
        expand: bool,
    ) -> QueryResult<Vec<Record>> {
        let shape = self.shape(collection)?;
        let relations: Vec<String> = if expand {
            shape.relations.iter().map(|r| r.name.clone()).collect()
        } else {
            Vec::new()
        };
        self.execute(collection, filter, select, relations)
    }

    /// Run a query with a raw `$expand` list; unknown relation names are ignored
    pub fn run_query_with_expand(
        &self,
        collection: &str,
        filter: Option<&str>,
        select: Option<&str>,
        expand: Option<&str>,
    ) -> QueryResult<Vec<Record>> {
        self.shape(collection)?;
        self.execute(collection, filter, select, parse_expand(expand))
    }

    /// Coerce a JSON object into the collection's shape and store it
    pub fn create_entity(
        &self,
        collection: &str,
        body: &serde_json::Map<String, serde_json::Value>,
    ) -> QueryResult<Record> {
        let shape = self.shape(collection)?;
        let record = shape.record_from_json(body)?;
        let stored = self.store.upsert(collection, record)?;
        info!("Created {} in {}", stored, collection);
        Ok(stored)
    }

    fn shape(&self, collection: &str) -> QueryResult<&EntityShape> {
        self.catalog
            .get(collection)
            .ok_or_else(|| QueryError::UnknownCollection {
                name: collection.to_string(),
            })
    }

    fn execute(
        &self,
        collection: &str,
        filter: Option<&str>,
        select: Option<&str>,
        relations: Vec<String>,
    ) -> QueryResult<Vec<Record>> {
        let mut query = Query::new().select(parse_select(select)).expand(relations);
        if let Some(raw) = filter.filter(|raw| !raw.trim().is_empty()) {
            query = query.filter(parse_filter(raw)?);
        }

        QueryExecutor::new(self.store.as_ref(), &self.catalog, self.config)
            .execute(collection, &query)
    }
}
