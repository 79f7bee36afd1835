use thiserror::Error;

/// Errors raised by the dataset model itself.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("attribute name must not be empty")]
    EmptyAttributeName,
    #[error("relation name must not be empty")]
    EmptyRelationName,
    #[error("attribute {name} is {kind}, expected a string attribute")]
    NotStringAttribute { name: String, kind: &'static str },
    #[error("row width mismatch: expected {expected}, got {actual}")]
    RowWidthMismatch { expected: usize, actual: usize },
    #[error("column index {index} is out of range for {width} columns")]
    ColumnOutOfRange { index: usize, width: usize },
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// A field accessor could not produce a value for an entity.
#[derive(Debug, Clone, Error)]
#[error("cannot read field {field}: {message}")]
pub struct FieldAccessError {
    pub field: String,
    pub message: String,
}

impl FieldAccessError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}
