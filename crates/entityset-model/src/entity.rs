//! Entity type descriptors.
//!
//! An [`EntityType`] is an explicit table of [`FieldDescriptor`]s built once by
//! the caller: name, declared type, persistence mapping and an accessor closure
//! per field. The engine never inspects entity values any other way.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::FieldAccessError;
use crate::value::{Record, Value};

/// Field name reserved for serialization version markers; never exported.
pub const SERIAL_VERSION_FIELD: &str = "serialVersionUID";

/// Declared type of an entity field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Integer,
    Float,
    Boolean,
    Timestamp,
    /// A single referenced entity type, by simple name.
    Entity(String),
    /// A collection of the named entity type.
    Collection(String),
    /// Anything else, by type name.
    Other(String),
}

impl FieldType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Integer | FieldType::Float)
    }

    pub fn is_text(&self) -> bool {
        matches!(self, FieldType::Text)
    }

    /// Name of the entity type this field points at, if any.
    pub fn referenced_type(&self) -> Option<&str> {
        match self {
            FieldType::Entity(name) | FieldType::Collection(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Text => f.write_str("text"),
            FieldType::Integer => f.write_str("integer"),
            FieldType::Float => f.write_str("float"),
            FieldType::Boolean => f.write_str("boolean"),
            FieldType::Timestamp => f.write_str("timestamp"),
            FieldType::Entity(name) => f.write_str(name),
            FieldType::Collection(name) => write!(f, "collection<{name}>"),
            FieldType::Other(name) => f.write_str(name),
        }
    }
}

/// Persistence mapping carried by a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldMapping {
    /// No persistence mapping; the field is not part of the dataset.
    #[default]
    Unmapped,
    /// A simple column.
    Column,
    /// A temporal (date/time) column.
    Temporal,
    ManyToOne,
    OneToMany,
    OneToOne,
    ManyToMany,
}

impl FieldMapping {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldMapping::Unmapped => "unmapped",
            FieldMapping::Column => "column",
            FieldMapping::Temporal => "temporal",
            FieldMapping::ManyToOne => "many-to-one",
            FieldMapping::OneToMany => "one-to-many",
            FieldMapping::OneToOne => "one-to-one",
            FieldMapping::ManyToMany => "many-to-many",
        }
    }
}

impl fmt::Display for FieldMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reads one field of an entity.
pub type Accessor<E> = dyn Fn(&E) -> Result<Value, FieldAccessError> + Send + Sync;

/// One declared field of an entity type.
pub struct FieldDescriptor<E> {
    name: String,
    field_type: FieldType,
    mapping: FieldMapping,
    column_name: Option<String>,
    accessor: Arc<Accessor<E>>,
}

impl<E> FieldDescriptor<E> {
    pub fn new<F>(
        name: impl Into<String>,
        field_type: FieldType,
        mapping: FieldMapping,
        accessor: F,
    ) -> Self
    where
        F: Fn(&E) -> Result<Value, FieldAccessError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            field_type,
            mapping,
            column_name: None,
            accessor: Arc::new(accessor),
        }
    }

    /// A simple column whose accessor cannot fail.
    pub fn column<F>(name: impl Into<String>, field_type: FieldType, read: F) -> Self
    where
        E: 'static,
        F: Fn(&E) -> Value + Send + Sync + 'static,
    {
        Self::new(name, field_type, FieldMapping::Column, move |entity: &E| {
            Ok(read(entity))
        })
    }

    /// A many-to-one reference to `referenced_type`.
    pub fn many_to_one<F>(
        name: impl Into<String>,
        referenced_type: impl Into<String>,
        read: F,
    ) -> Self
    where
        E: 'static,
        F: Fn(&E) -> Value + Send + Sync + 'static,
    {
        Self::new(
            name,
            FieldType::Entity(referenced_type.into()),
            FieldMapping::ManyToOne,
            move |entity: &E| Ok(read(entity)),
        )
    }

    /// Overrides the dataset column name (an empty name keeps the field name).
    #[must_use]
    pub fn with_column_name(mut self, column_name: impl Into<String>) -> Self {
        self.column_name = Some(column_name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn mapping(&self) -> FieldMapping {
        self.mapping
    }

    /// Column name in the dataset: the explicit column name, else the field name.
    pub fn attribute_name(&self) -> &str {
        match self.column_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.name,
        }
    }

    pub fn read(&self, entity: &E) -> Result<Value, FieldAccessError> {
        (self.accessor)(entity)
    }
}

impl FieldDescriptor<Record> {
    /// A field read from a [`Record`] by name.
    pub fn record(name: impl Into<String>, field_type: FieldType, mapping: FieldMapping) -> Self {
        let name = name.into();
        let key = name.clone();
        Self::new(name, field_type, mapping, move |record: &Record| {
            Ok(record.get(&key))
        })
    }
}

impl<E> Clone for FieldDescriptor<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            field_type: self.field_type.clone(),
            mapping: self.mapping,
            column_name: self.column_name.clone(),
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<E> fmt::Debug for FieldDescriptor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("field_type", &self.field_type)
            .field("mapping", &self.mapping)
            .field("column_name", &self.column_name)
            .finish_non_exhaustive()
    }
}

/// The subject type of a dataset: its name, whether it is a persistent
/// entity, and its declared fields in declaration order.
pub struct EntityType<E> {
    name: String,
    persistent: bool,
    fields: Vec<FieldDescriptor<E>>,
}

impl<E> EntityType<E> {
    /// A persistent entity type with no fields yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            persistent: true,
            fields: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor<E>) -> Self {
        self.fields.push(field);
        self
    }

    pub fn push_field(&mut self, field: FieldDescriptor<E>) {
        self.fields.push(field);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Simple name of the type (path qualifiers stripped), used as relation name.
    pub fn simple_name(&self) -> &str {
        let after_path = self.name.rsplit("::").next().unwrap_or(&self.name);
        after_path.rsplit('.').next().unwrap_or(after_path)
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    pub fn fields(&self) -> &[FieldDescriptor<E>] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor<E>> {
        self.fields.iter().find(|field| field.name == name)
    }
}

impl<E> Clone for EntityType<E> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            persistent: self.persistent,
            fields: self.fields.clone(),
        }
    }
}

impl<E> fmt::Debug for EntityType<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityType")
            .field("name", &self.name)
            .field("persistent", &self.persistent)
            .field("fields", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_name_strips_qualifiers() {
        let rust_path: EntityType<Record> = EntityType::new("crate::model::Person");
        assert_eq!(rust_path.simple_name(), "Person");
        let dotted: EntityType<Record> = EntityType::new("org.example.Post");
        assert_eq!(dotted.simple_name(), "Post");
    }

    #[test]
    fn blank_column_name_falls_back_to_field_name() {
        let field = FieldDescriptor::record("age", FieldType::Integer, FieldMapping::Column)
            .with_column_name("  ");
        assert_eq!(field.attribute_name(), "age");
        let renamed = field.with_column_name("AGE_YEARS");
        assert_eq!(renamed.attribute_name(), "AGE_YEARS");
    }

    #[test]
    fn record_accessor_reads_named_field() {
        let field = FieldDescriptor::record("name", FieldType::Text, FieldMapping::Column);
        let record = Record::new("Person").with_field("name", "Alice");
        assert_eq!(field.read(&record).unwrap(), Value::from("Alice"));
    }
}
