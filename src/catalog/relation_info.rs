//! Relation descriptors between entity sets.

/// Static description of how to resolve one related entity.
///
/// The foreign key is read from the source record and matched against
/// `target_key` in the `target_set` collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationInfo {
    pub name: String,
    pub foreign_key: String,
    pub target_set: String,
    pub target_key: String,
}

impl RelationInfo {
    pub fn new(
        name: impl Into<String>,
        foreign_key: impl Into<String>,
        target_set: impl Into<String>,
        target_key: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            foreign_key: foreign_key.into(),
            target_set: target_set.into(),
            target_key: target_key.into(),
        }
    }
}
