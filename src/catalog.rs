//! Static catalog of entity shapes.
//!
//! Shapes declare field order, key field and relation descriptors. The query
//! engine reads them for projection and expansion; the metadata documents are
//! rendered from the same definitions.

pub mod entity_info;
pub mod metadata;
pub mod relation_info;

use crate::access::DataType;

pub use entity_info::{EntityShape, FieldInfo};
pub use relation_info::RelationInfo;

pub const PRODUCTS_SET: &str = "Products";
pub const BRANDS_SET: &str = "Brands";

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    shapes: Vec<EntityShape>,
}

impl Catalog {
    pub fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    /// Catalog for the Products/Brands demo service
    pub fn demo() -> Self {
        let mut catalog = Catalog::new();
        catalog.register(
            EntityShape::new("Product", PRODUCTS_SET, "ID")
                .field("Name", DataType::String)
                .field("Description", DataType::String)
                .field("Price", DataType::Double)
                .field("BrandID", DataType::Int32)
                .relation(RelationInfo::new("Brand", "BrandID", BRANDS_SET, "ID")),
        );
        catalog.register(
            EntityShape::new("Brand", BRANDS_SET, "ID")
                .field("Name", DataType::String)
                .field("Country", DataType::String),
        );
        catalog
    }

    /// Register a shape, replacing any previous shape for the same entity set
    pub fn register(&mut self, shape: EntityShape) {
        match self
            .shapes
            .iter_mut()
            .find(|s| s.entity_set == shape.entity_set)
        {
            Some(existing) => *existing = shape,
            None => self.shapes.push(shape),
        }
    }

    pub fn get(&self, entity_set: &str) -> Option<&EntityShape> {
        self.shapes.iter().find(|s| s.entity_set == entity_set)
    }

    /// Shapes in registration order
    pub fn shapes(&self) -> impl Iterator<Item = &EntityShape> {
        self.shapes.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_catalog() {
        let catalog = Catalog::demo();

        let products = catalog.get(PRODUCTS_SET).unwrap();
        let names: Vec<&str> = products.field_names().collect();
        assert_eq!(names, vec!["ID", "Name", "Description", "Price", "BrandID"]);

        let relation = products.get_relation("Brand").unwrap();
        assert_eq!(relation.foreign_key, "BrandID");
        assert_eq!(relation.target_set, BRANDS_SET);

        assert!(catalog.get(BRANDS_SET).unwrap().relations.is_empty());
        assert!(catalog.get("Orders").is_none());
    }

    #[test]
    fn test_register_replaces() {
        let mut catalog = Catalog::demo();
        catalog.register(EntityShape::new("Brand", BRANDS_SET, "ID"));

        assert_eq!(catalog.shapes().count(), 2);
        assert_eq!(catalog.get(BRANDS_SET).unwrap().fields.len(), 1);
    }
}
