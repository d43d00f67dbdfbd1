//! Error types for query execution.

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that terminate a query request.
///
/// None of these are downgraded to "no match" by the executor; they propagate
/// to the caller, which picks an external representation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    /// The filter string could not be parsed into an expression tree
    #[error("Malformed filter: {message}")]
    MalformedFilter { message: String },

    /// A referenced field is absent from the record's current view
    #[error("Unknown field: {name}")]
    UnknownField { name: String },

    /// An operator was applied to operand types it does not accept
    #[error("Type mismatch for operator {operator}: left={left}, right={right}")]
    TypeMismatch {
        operator: String,
        left: String,
        right: String,
    },

    #[error("Unknown collection: {name}")]
    UnknownCollection { name: String },

    /// A submitted entity body does not fit its shape
    #[error("Invalid entity: {message}")]
    InvalidEntity { message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl QueryError {
    pub fn malformed(message: impl Into<String>) -> Self {
        QueryError::MalformedFilter {
            message: message.into(),
        }
    }

    pub fn unknown_field(name: impl Into<String>) -> Self {
        QueryError::UnknownField { name: name.into() }
    }

    pub fn type_mismatch(
        operator: impl Into<String>,
        left: impl Into<String>,
        right: impl Into<String>,
    ) -> Self {
        QueryError::TypeMismatch {
            operator: operator.into(),
            left: left.into(),
            right: right.into(),
        }
    }

    /// Stable kind name, used as the error code in response documents
    pub fn kind(&self) -> &'static str {
        match self {
            QueryError::MalformedFilter { .. } => "MalformedFilter",
            QueryError::UnknownField { .. } => "UnknownField",
            QueryError::TypeMismatch { .. } => "TypeMismatch",
            QueryError::UnknownCollection { .. } => "UnknownCollection",
            QueryError::InvalidEntity { .. } => "InvalidEntity",
            QueryError::Storage(StorageError::KeySpaceExhausted { .. }) => "KeySpaceExhausted",
            QueryError::Storage(_) => "StorageUnavailable",
        }
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QueryError::malformed("Unexpected end of input");
        assert_eq!(err.to_string(), "Malformed filter: Unexpected end of input");

        let err = QueryError::unknown_field("Price");
        assert_eq!(err.to_string(), "Unknown field: Price");

        let err = QueryError::type_mismatch("gt", "String", "String");
        assert_eq!(
            err.to_string(),
            "Type mismatch for operator gt: left=String, right=String"
        );

        let err = QueryError::from(StorageError::Unavailable {
            collection: "Brands".to_string(),
        });
        assert_eq!(
            err.to_string(),
            "Storage error: Remote collection Brands is unavailable"
        );
    }

    #[test]
    fn test_error_kind() {
        assert_eq!(QueryError::malformed("x").kind(), "MalformedFilter");
        assert_eq!(QueryError::unknown_field("x").kind(), "UnknownField");
        assert_eq!(
            QueryError::type_mismatch("and", "Int32", "Boolean").kind(),
            "TypeMismatch"
        );
        assert_eq!(
            QueryError::from(StorageError::Unavailable {
                collection: "Brands".to_string()
            })
            .kind(),
            "StorageUnavailable"
        );
        assert_eq!(
            QueryError::from(StorageError::KeySpaceExhausted {
                collection: "Brands".to_string()
            })
            .kind(),
            "KeySpaceExhausted"
        );
    }
}
