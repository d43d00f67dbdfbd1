//! Entity shape and field metadata.

use crate::access::{DataType, Record, Value};
use crate::catalog::RelationInfo;
use crate::error::{QueryError, QueryResult};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub field_name: String,
    pub field_type: DataType,
    pub nullable: bool,
}

impl FieldInfo {
    pub fn new(field_name: impl Into<String>, field_type: DataType) -> Self {
        Self {
            field_name: field_name.into(),
            field_type,
            nullable: true,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }
}

/// Declared shape of the records in one entity set.
///
/// Field order here is the canonical schema order used for projection.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityShape {
    pub type_name: String,
    pub entity_set: String,
    pub key_field: String,
    pub fields: Vec<FieldInfo>,
    pub relations: Vec<RelationInfo>,
}

impl EntityShape {
    /// The key field is declared first, as a non-nullable Int32
    pub fn new(
        type_name: impl Into<String>,
        entity_set: impl Into<String>,
        key_field: impl Into<String>,
    ) -> Self {
        let key_field = key_field.into();
        Self {
            type_name: type_name.into(),
            entity_set: entity_set.into(),
            fields: vec![FieldInfo::new(key_field.clone(), DataType::Int32).not_null()],
            key_field,
            relations: Vec::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, field_type: DataType) -> Self {
        self.fields.push(FieldInfo::new(name, field_type));
        self
    }

    pub fn relation(mut self, relation: RelationInfo) -> Self {
        self.relations.push(relation);
        self
    }

    pub fn get_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| f.field_name == name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.get_field(name).is_some()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.field_name.as_str())
    }

    pub fn get_relation(&self, name: &str) -> Option<&RelationInfo> {
        self.relations.iter().find(|r| r.name == name)
    }

    /// Build a record of this shape from a JSON object body.
    ///
    /// Missing fields become null (the key is left for the store to assign);
    /// unknown fields are rejected.
    pub fn record_from_json(
        &self,
        object: &serde_json::Map<String, serde_json::Value>,
    ) -> QueryResult<Record> {
        if let Some(name) = object.keys().find(|name| !self.has_field(name)) {
            return Err(QueryError::InvalidEntity {
                message: format!("{} has no field {}", self.type_name, name),
            });
        }

        let mut record = Record::with_capacity(self.fields.len());
        for field in &self.fields {
            let value = match object.get(&field.field_name) {
                None | Some(serde_json::Value::Null) => Value::Null,
                Some(json) => coerce_json(field, json)?,
            };
            if value.is_null() && !field.nullable && field.field_name != self.key_field {
                return Err(QueryError::InvalidEntity {
                    message: format!("{} must not be null", field.field_name),
                });
            }
            record.insert(field.field_name.clone(), value);
        }
        Ok(record)
    }
}

fn coerce_json(field: &FieldInfo, json: &serde_json::Value) -> QueryResult<Value> {
    let value = match (field.field_type, json) {
        (DataType::Boolean, serde_json::Value::Bool(b)) => Some(Value::Boolean(*b)),
        (DataType::Int32, serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(Value::Int32),
        (DataType::Double, serde_json::Value::Number(n)) => n.as_f64().map(Value::Double),
        (DataType::String, serde_json::Value::String(s)) => Some(Value::String(s.clone())),
        _ => None,
    };

    value.ok_or_else(|| QueryError::InvalidEntity {
        message: format!(
            "{} expects {}, got {}",
            field.field_name, field.field_type, json
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_shape() -> EntityShape {
        EntityShape::new("Product", "Products", "ID")
            .field("Name", DataType::String)
            .field("Price", DataType::Double)
            .field("BrandID", DataType::Int32)
    }

    #[test]
    fn test_key_declared_first() {
        let shape = product_shape();
        let names: Vec<&str> = shape.field_names().collect();
        assert_eq!(names, vec!["ID", "Name", "Price", "BrandID"]);
        assert!(!shape.get_field("ID").unwrap().nullable);
    }

    #[test]
    fn test_record_from_json() {
        let shape = product_shape();
        let body = json!({"Name": "New Laptop", "Price": 1500, "BrandID": 1});
        let record = shape.record_from_json(body.as_object().unwrap()).unwrap();

        assert_eq!(record.get("ID"), Some(&Value::Null));
        assert_eq!(record.get("Name"), Some(&Value::from("New Laptop")));
        assert_eq!(record.get("Price"), Some(&Value::Double(1500.0)));
        assert_eq!(record.get("BrandID"), Some(&Value::Int32(1)));
    }

    #[test]
    fn test_record_from_json_rejects_bad_input() {
        let shape = product_shape();

        let body = json!({"Name": "x", "Colour": "red"});
        assert!(matches!(
            shape.record_from_json(body.as_object().unwrap()),
            Err(QueryError::InvalidEntity { .. })
        ));

        let body = json!({"Name": 5});
        assert!(matches!(
            shape.record_from_json(body.as_object().unwrap()),
            Err(QueryError::InvalidEntity { .. })
        ));

        let body = json!({"BrandID": 1.5});
        assert!(matches!(
            shape.record_from_json(body.as_object().unwrap()),
            Err(QueryError::InvalidEntity { .. })
        ));
    }
}
