//! Ordered field/value container.

use crate::access::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A single entity as an ordered list of named fields.
///
/// Field names are case-sensitive and unique; inserting an existing name
/// replaces its value in place, so the field keeps its position.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set a field, keeping its position if it already exists
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Builder-style variant of [`Record::insert`]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in record order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        write!(f, "}}")
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_preserves_order() {
        let record = Record::new()
            .with("ID", 1)
            .with("Name", "Mouse")
            .with("Price", 15.0);

        let names: Vec<&str> = record.names().collect();
        assert_eq!(names, vec!["ID", "Name", "Price"]);
        assert_eq!(record.get("Price"), Some(&Value::Double(15.0)));
        assert_eq!(record.get("price"), None);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut record = Record::new().with("ID", 1).with("Name", "a");
        record.insert("ID", 9);

        assert_eq!(record.len(), 2);
        assert_eq!(record.names().next(), Some("ID"));
        assert_eq!(record.get("ID"), Some(&Value::Int32(9)));
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let brand = Record::new().with("ID", 3).with("Name", "SpeedyMouse");
        let record = Record::new()
            .with("Name", "Mouse Optical")
            .with("Brand", brand);

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"Name":"Mouse Optical","Brand":{"ID":3,"Name":"SpeedyMouse"}}"#
        );
    }

    #[test]
    fn test_display() {
        let record = Record::new().with("ID", 1).with("Name", "x");
        assert_eq!(record.to_string(), "{ID: 1, Name: 'x'}");
    }
}
