//! Relation expansion.
//!
//! Attaches a related record to an already-projected view. The foreign key is
//! read from the full source record, so expansion works even when `$select`
//! dropped the key field from the view.

use crate::access::{Record, Value};
use crate::catalog::{Catalog, EntityShape, RelationInfo};
use crate::error::{QueryError, QueryResult};
use crate::executor::{project, SelectSet};
use crate::storage::StorageResult;
use log::{debug, warn};

/// A relation together with the shape of the records it points at
#[derive(Debug, Clone, Copy)]
pub struct ExpandTarget<'a> {
    pub relation: &'a RelationInfo,
    pub shape: &'a EntityShape,
}

impl<'a> ExpandTarget<'a> {
    /// Resolve requested relation names against `shape`.
    ///
    /// Names that are not relations of `shape` are skipped. A relation whose
    /// target set is missing from the catalog is an error.
    pub fn resolve<S: AsRef<str>>(
        catalog: &'a Catalog,
        shape: &'a EntityShape,
        names: &[S],
    ) -> QueryResult<Vec<ExpandTarget<'a>>> {
        let mut targets = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let Some(relation) = shape.get_relation(name) else {
                warn!("Ignoring unknown relation {} on {}", name, shape.type_name);
                continue;
            };
            let target_shape =
                catalog
                    .get(&relation.target_set)
                    .ok_or_else(|| QueryError::UnknownCollection {
                        name: relation.target_set.clone(),
                    })?;
            targets.push(ExpandTarget {
                relation,
                shape: target_shape,
            });
        }
        Ok(targets)
    }

    /// Every relation declared on `shape`
    pub fn resolve_all(
        catalog: &'a Catalog,
        shape: &'a EntityShape,
    ) -> QueryResult<Vec<ExpandTarget<'a>>> {
        let names: Vec<&str> = shape.relations.iter().map(|r| r.name.as_str()).collect();
        Self::resolve(catalog, shape, &names)
    }
}

/// Attach the record related to `source` through `target` onto `view`.
///
/// `lookup` receives the foreign key value. A miss, or a null/absent foreign
/// key, leaves the view without the relation field. Lookup failures propagate.
pub fn expand<F>(
    mut view: Record,
    source: &Record,
    target: &ExpandTarget<'_>,
    lookup: F,
) -> QueryResult<Record>
where
    F: FnOnce(&Value) -> StorageResult<Option<Record>>,
{
    let relation = target.relation;
    let key = match source.get(&relation.foreign_key) {
        None | Some(Value::Null) => return Ok(view),
        Some(key) => key,
    };

    match lookup(key)? {
        Some(related) => {
            let related_view = project(&related, target.shape, &SelectSet::all());
            view.insert(relation.name.clone(), related_view);
        }
        None => debug!(
            "No {} with {} {} for relation {}",
            relation.target_set, relation.target_key, key, relation.name
        ),
    }

    Ok(view)
}
