//! Error types for dataset builds.

use entityset_model::{FieldAccessError, ModelError};
use thiserror::Error;

/// Errors raised by a query collaborator.
#[derive(Debug, Error)]
pub enum QueryError {
    /// No collaborator was supplied but the build needs one.
    #[error("no query executor configured to run `{query}`")]
    Unavailable { query: String },

    /// The collaborator does not know the entity type.
    #[error("unknown entity type {entity} in `{query}`")]
    UnknownEntity { entity: String, query: String },

    /// The collaborator failed while executing the query.
    #[error("query `{query}` failed: {message}")]
    Failed { query: String, message: String },
}

/// Failure computing a single cell.
#[derive(Debug, Error)]
pub enum CellError {
    #[error(transparent)]
    Access(#[from] FieldAccessError),

    #[error("entity type has no field named {field}")]
    UnknownField { field: String },

    #[error("callback failed: {0:#}")]
    Callback(anyhow::Error),

    #[error("expected a {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl CellError {
    /// True when the field itself could not be read.
    pub fn is_field_access(&self) -> bool {
        matches!(self, CellError::Access(_) | CellError::UnknownField { .. })
    }
}

/// Errors that abort a dataset build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(
        "{type_name} is not a persistent entity; enable treat_base_class_as_non_entity to export it"
    )]
    NotEntity { type_name: String },

    #[error("callback registered for {target} must be {expected}, found {found}")]
    CallbackKind {
        target: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("duplicate column name {name}")]
    DuplicateColumn { name: String },

    #[error("domain callback for field {field} failed: {error:#}")]
    DomainCallback { field: String, error: anyhow::Error },

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("header has {attributes} attributes but {sources} column sources")]
    HeaderMismatch { attributes: usize, sources: usize },

    /// A fan-out or direct source field could not be read and the cell
    /// failure policy asks to propagate.
    #[error("row {row}, column {column}: missing field {field}: {message}")]
    MissingField {
        row: usize,
        column: String,
        field: String,
        message: String,
    },

    #[error("row {row}, column {column}: {source}")]
    Cell {
        row: usize,
        column: String,
        #[source]
        source: CellError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T> = std::result::Result<T, BuildError>;
