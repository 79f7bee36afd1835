//! Error types for ARFF output.

use thiserror::Error;

/// Errors that can occur when writing ARFF files.
#[derive(Debug, Error)]
pub enum ArffError {
    /// Relation name is empty.
    #[error("relation name must not be empty")]
    InvalidRelationName { name: String },

    /// Attribute name is empty.
    #[error("attribute name must not be empty (column {index})")]
    InvalidAttributeName { index: usize },

    /// Attribute name used twice.
    #[error("duplicate attribute name: {name}")]
    DuplicateAttribute { name: String },

    /// Nominal domain lists the same label twice.
    #[error("nominal attribute {attribute} has duplicate label {label}")]
    DuplicateNominalLabel { attribute: String, label: String },

    /// Encoded nominal or string cell does not point into the attribute's values.
    #[error("row {row}: value {value} is not a valid index for attribute {attribute}")]
    IndexOutOfRange {
        row: usize,
        attribute: String,
        value: f64,
    },

    /// Date cell holds a value outside the representable range.
    #[error("row {row}: {value} is not a valid timestamp for attribute {attribute}")]
    InvalidDate {
        row: usize,
        attribute: String,
        value: f64,
    },

    /// Row length mismatch.
    #[error("row length mismatch: expected {expected}, got {actual}")]
    RowLengthMismatch { expected: usize, actual: usize },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for ARFF operations.
pub type Result<T> = std::result::Result<T, ArffError>;

impl ArffError {
    pub fn duplicate_attribute(name: impl Into<String>) -> Self {
        Self::DuplicateAttribute { name: name.into() }
    }

    pub fn duplicate_nominal_label(attribute: impl Into<String>, label: impl Into<String>) -> Self {
        Self::DuplicateNominalLabel {
            attribute: attribute.into(),
            label: label.into(),
        }
    }
}
