//! Data model shared by the entityset crates: raw entity values, entity type
//! descriptors, dataset attributes and materialized datasets.

pub mod attribute;
pub mod dataset;
pub mod entity;
pub mod error;
pub mod value;

pub use attribute::{Attribute, AttributeKind};
pub use dataset::{Dataset, Instance};
pub use entity::{
    Accessor, EntityType, FieldDescriptor, FieldMapping, FieldType, SERIAL_VERSION_FIELD,
};
pub use error::{FieldAccessError, ModelError, Result};
pub use value::{Record, TIMESTAMP_FORMAT, Value};
