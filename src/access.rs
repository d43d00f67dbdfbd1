//! Access layer for entity values.
//!
//! This module provides the in-memory representation the query engine works on:
//!
//! - **Value**: Tagged union of the field types an entity can hold
//! - **DataType**: Declared type of a schema field
//! - **Record**: Ordered field/value container for a single entity
//!
//! Coercion helpers on `Value` (numeric promotion, loose equality) are shared by
//! the evaluator, the projection engine and the expansion resolver.

pub mod record;
pub mod value;

pub use record::Record;
pub use value::{DataType, Value};
