use std::error::Error;
use std::fmt;

use super::table::{FieldIndex, RowIndex};

/// Errors reported by a `Table` implementation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// No field with this name
    FieldNotFound(String),
    /// Field index outside of the table's field list
    InvalidField(FieldIndex),
    /// Row index beyond the allocated rows
    RowOutOfRange(RowIndex),
    /// Value or bound does not match the field's type
    TypeMismatch(String),
    /// General errors with custom message
    Other(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::FieldNotFound(name) => write!(f, "Field not found: {}", name),
            TableError::InvalidField(field) => write!(f, "Invalid field index: {}", field),
            TableError::RowOutOfRange(row) => write!(f, "Row out of range: {}", row),
            TableError::TypeMismatch(msg) => write!(f, "Type mismatch: {}", msg),
            TableError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl Error for TableError {}

/// Errors raised while building or running a table filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    /// The filter references a field the table does not have
    FieldNotExistent(String),
    /// The field exists but its type cannot be searched by value ranges
    FieldInvalidType(String),
    /// A textual bound could not be decoded for the field's type
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
    /// Failure reported by the table
    Table(TableError),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::FieldNotExistent(name) => write!(f, "Filter field does not exist: {}", name),
            FilterError::FieldInvalidType(msg) => write!(f, "Filter field has invalid type: {}", msg),
            FilterError::InvalidValue { field, value, reason } => {
                write!(f, "Invalid value '{}' for field {}: {}", value, field, reason)
            }
            FilterError::Table(err) => write!(f, "Table error: {}", err),
        }
    }
}

impl Error for FilterError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            FilterError::Table(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TableError> for FilterError {
    fn from(error: TableError) -> Self {
        match error {
            TableError::FieldNotFound(name) => FilterError::FieldNotExistent(name),
            other => FilterError::Table(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_maps_to_not_existent() {
        let err: FilterError = TableError::FieldNotFound("age".to_string()).into();
        assert_eq!(err, FilterError::FieldNotExistent("age".to_string()));
        assert!(err.source().is_none());
    }

    #[test]
    fn other_table_errors_propagate_unchanged() {
        let err: FilterError = TableError::RowOutOfRange(12).into();
        assert_eq!(err, FilterError::Table(TableError::RowOutOfRange(12)));
        assert_eq!(err.to_string(), "Table error: Row out of range: 12");
        assert!(err.source().is_some());
    }
}
