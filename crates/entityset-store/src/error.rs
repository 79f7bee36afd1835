//! Error types for store loading.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid store document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("entity type {name} is defined twice")]
    DuplicateType { name: String },

    #[error("record {type_name}#{key} is defined twice")]
    DuplicateKey { type_name: String, key: String },

    #[error("reference {reference} must have the form Type#key")]
    MalformedReference { reference: String },

    #[error("{type_name}.{field} references {reference}, which does not exist")]
    UnresolvedReference {
        type_name: String,
        field: String,
        reference: String,
    },

    #[error("{type_name}.{field}: {value} is not a valid timestamp")]
    InvalidTimestamp {
        type_name: String,
        field: String,
        value: String,
    },

    #[error("{type_name}.{field}: unsupported value {value}")]
    UnsupportedValue {
        type_name: String,
        field: String,
        value: String,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;
