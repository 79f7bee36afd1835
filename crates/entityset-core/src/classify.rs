//! Field classification: which declared fields become columns, of what
//! kind, and where every column's values come from.

use std::collections::HashSet;
use std::fmt;

use entityset_model::{
    AttributeKind, EntityType, FieldDescriptor, FieldMapping, FieldType, SERIAL_VERSION_FIELD,
    Value,
};
use tracing::{debug, info, warn};

use crate::callback::Callback;
use crate::error::{BuildError, Result};
use crate::registry::{BuildSpec, ExtraAttribute};

/// How a reference column encodes its values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceEncoding {
    /// Index into the domain resolved from the referenced entity set.
    Nominal,
    /// Number produced by the field's numeric callback.
    Numeric,
}

/// Where a column's values come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSource {
    /// A simple or temporal field read directly.
    Field { field: String },
    /// A many-to-one field.
    Reference {
        field: String,
        referenced_type: String,
        encoding: ReferenceEncoding,
    },
    /// A registered extra attribute.
    Extra { name: String },
    /// One synthetic column of a fan-out set.
    FanOut { source_field: String, attribute: String },
}

impl ColumnSource {
    /// Short label used in plan listings.
    pub fn describe(&self) -> String {
        match self {
            ColumnSource::Field { field } => format!("field {field}"),
            ColumnSource::Reference {
                field,
                referenced_type,
                encoding: ReferenceEncoding::Nominal,
            } => format!("reference {field} -> {referenced_type}"),
            ColumnSource::Reference {
                field,
                referenced_type,
                encoding: ReferenceEncoding::Numeric,
            } => format!("reference {field} -> {referenced_type} (numeric callback)"),
            ColumnSource::Extra { name } => format!("extra {name}"),
            ColumnSource::FanOut {
                source_field,
                attribute,
            } => format!("fan-out {source_field}.{attribute}"),
        }
    }
}

/// Why a field produced no column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    SerialVersion,
    IgnoredType,
    IgnoredName,
    Unmapped,
    /// The mapping cannot hold the declared type (a boolean column, a
    /// temporal text field, a many-to-one field that names no entity).
    UnsupportedType,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::SerialVersion => "serialization marker",
            IgnoreReason::IgnoredType => "ignored type",
            IgnoreReason::IgnoredName => "ignored name",
            IgnoreReason::Unmapped => "no mapping",
            IgnoreReason::UnsupportedType => "unsupported type",
        }
    }
}

/// Outcome of classifying one declared field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldClass {
    Ignored(IgnoreReason),
    Direct(AttributeKind),
    Reference(ReferenceEncoding),
    /// Taken over by a fan-out set; produces no direct column.
    FanOutSource,
    /// One-to-many, one-to-one and many-to-many relations.
    Unsupported(FieldMapping),
}

impl fmt::Display for FieldClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldClass::Ignored(reason) => write!(f, "ignored ({})", reason.as_str()),
            FieldClass::Direct(kind) => write!(f, "direct {kind}"),
            FieldClass::Reference(ReferenceEncoding::Nominal) => f.write_str("reference"),
            FieldClass::Reference(ReferenceEncoding::Numeric) => {
                f.write_str("reference (numeric)")
            }
            FieldClass::FanOutSource => f.write_str("fan-out source"),
            FieldClass::Unsupported(mapping) => write!(f, "unsupported {mapping} relation"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldClassification {
    pub field: String,
    pub class: FieldClass,
}

/// A column before reference domains are resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedColumn {
    pub name: String,
    pub kind: AttributeKind,
    pub source: ColumnSource,
}

/// Ordered columns of a dataset plus the classification of every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnPlan {
    pub relation: String,
    pub columns: Vec<PlannedColumn>,
    pub fields: Vec<FieldClassification>,
}

impl ColumnPlan {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn classification(&self, field: &str) -> Option<&FieldClass> {
        self.fields
            .iter()
            .find(|entry| entry.field == field)
            .map(|entry| &entry.class)
    }
}

/// Decides the column set of an entity type under a [`BuildSpec`].
pub struct FieldClassifier<'a, E> {
    spec: &'a BuildSpec<E>,
}

impl<'a, E> FieldClassifier<'a, E> {
    pub fn new(spec: &'a BuildSpec<E>) -> Self {
        Self { spec }
    }

    /// Classifies every field of `entity_type` and lays out the columns:
    /// direct and reference fields in declaration order, then extra
    /// attributes, then fan-out columns.
    pub fn classify(&self, entity_type: &EntityType<E>) -> Result<ColumnPlan> {
        if !entity_type.is_persistent() && !self.spec.options().treat_base_class_as_non_entity {
            return Err(BuildError::NotEntity {
                type_name: entity_type.name().to_string(),
            });
        }

        let mut columns = Vec::new();
        let mut fields = Vec::with_capacity(entity_type.fields().len());
        for field in entity_type.fields() {
            let class = self.classify_field(field);
            match &class {
                FieldClass::Direct(kind) => columns.push(PlannedColumn {
                    name: field.attribute_name().to_string(),
                    kind: *kind,
                    source: ColumnSource::Field {
                        field: field.name().to_string(),
                    },
                }),
                FieldClass::Reference(encoding) => columns.push(PlannedColumn {
                    name: field.attribute_name().to_string(),
                    kind: match encoding {
                        ReferenceEncoding::Nominal => AttributeKind::Nominal,
                        ReferenceEncoding::Numeric => AttributeKind::Numeric,
                    },
                    source: ColumnSource::Reference {
                        field: field.name().to_string(),
                        referenced_type: field
                            .field_type()
                            .referenced_type()
                            .unwrap_or_default()
                            .to_string(),
                        encoding: *encoding,
                    },
                }),
                FieldClass::Unsupported(mapping) => {
                    info!(field = field.name(), %mapping, "relation kind not supported, field skipped");
                }
                FieldClass::Ignored(IgnoreReason::UnsupportedType) => {
                    warn!(
                        field = field.name(),
                        field_type = %field.field_type(),
                        mapping = %field.mapping(),
                        "field type not supported by its mapping, field skipped"
                    );
                }
                FieldClass::Ignored(reason) => {
                    debug!(field = field.name(), reason = reason.as_str(), "field ignored");
                }
                FieldClass::FanOutSource => {
                    debug!(field = field.name(), "field handed to fan-out set");
                }
            }
            fields.push(FieldClassification {
                field: field.name().to_string(),
                class,
            });
        }

        for extra in self.spec.extras() {
            columns.push(PlannedColumn {
                name: extra.name.clone(),
                kind: extra_kind(extra),
                source: ColumnSource::Extra {
                    name: extra.name.clone(),
                },
            });
        }

        for set in self.spec.fan_outs() {
            for attribute in set.attribute_names() {
                columns.push(PlannedColumn {
                    name: attribute.to_string(),
                    kind: AttributeKind::String,
                    source: ColumnSource::FanOut {
                        source_field: set.source_field.clone(),
                        attribute: attribute.to_string(),
                    },
                });
            }
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(BuildError::DuplicateColumn {
                    name: column.name.clone(),
                });
            }
        }

        let plan = ColumnPlan {
            relation: entity_type.simple_name().to_string(),
            columns,
            fields,
        };
        debug!(relation = %plan.relation, columns = ?plan.column_names(), "column plan ready");
        Ok(plan)
    }

    /// Classification of a single field.
    pub fn classify_field(&self, field: &FieldDescriptor<E>) -> FieldClass {
        let options = self.spec.options();
        if field.name() == SERIAL_VERSION_FIELD {
            return FieldClass::Ignored(IgnoreReason::SerialVersion);
        }
        if options.ignores_type(field.field_type()) {
            return FieldClass::Ignored(IgnoreReason::IgnoredType);
        }
        if options.ignores_name(field.name()) {
            return FieldClass::Ignored(IgnoreReason::IgnoredName);
        }

        match field.mapping() {
            FieldMapping::Unmapped => FieldClass::Ignored(IgnoreReason::Unmapped),
            FieldMapping::Column => match field.field_type() {
                FieldType::Integer | FieldType::Float => FieldClass::Direct(AttributeKind::Numeric),
                FieldType::Text => FieldClass::Direct(AttributeKind::String),
                _ => FieldClass::Ignored(IgnoreReason::UnsupportedType),
            },
            FieldMapping::Temporal => match field.field_type() {
                FieldType::Timestamp => FieldClass::Direct(AttributeKind::Date),
                _ => FieldClass::Ignored(IgnoreReason::UnsupportedType),
            },
            FieldMapping::ManyToOne => {
                if self.spec.has_fan_out(field.name()) {
                    return FieldClass::FanOutSource;
                }
                if !matches!(field.field_type(), FieldType::Entity(_)) {
                    return FieldClass::Ignored(IgnoreReason::UnsupportedType);
                }
                let numeric = self
                    .spec
                    .callback_for_field(field.name(), field.field_type())
                    .is_some_and(Callback::is_numeric);
                if numeric {
                    FieldClass::Reference(ReferenceEncoding::Numeric)
                } else {
                    FieldClass::Reference(ReferenceEncoding::Nominal)
                }
            }
            mapping @ (FieldMapping::OneToMany | FieldMapping::OneToOne | FieldMapping::ManyToMany) => {
                FieldClass::Unsupported(mapping)
            }
        }
    }
}

/// Column kind of an extra attribute. A numeric callback makes the column
/// numeric whatever the default; otherwise the default value decides.
pub(crate) fn extra_kind<E>(extra: &ExtraAttribute<E>) -> AttributeKind {
    if extra.callback.as_ref().is_some_and(Callback::is_numeric) {
        return AttributeKind::Numeric;
    }
    match &extra.default {
        None | Some(Value::Null) => AttributeKind::Numeric,
        Some(value) if value.is_numeric() => AttributeKind::Numeric,
        Some(_) => AttributeKind::String,
    }
}

#[cfg(test)]
mod tests {
    use entityset_model::Record;

    use super::*;
    use crate::options::BuildOptions;

    fn person() -> EntityType<Record> {
        EntityType::new("Person")
            .with_field(FieldDescriptor::record(
                SERIAL_VERSION_FIELD,
                FieldType::Integer,
                FieldMapping::Column,
            ))
            .with_field(FieldDescriptor::record("name", FieldType::Text, FieldMapping::Column))
            .with_field(FieldDescriptor::record("age", FieldType::Integer, FieldMapping::Column))
            .with_field(FieldDescriptor::record("active", FieldType::Boolean, FieldMapping::Column))
            .with_field(FieldDescriptor::record(
                "country",
                FieldType::Entity("Country".into()),
                FieldMapping::ManyToOne,
            ))
            .with_field(FieldDescriptor::record(
                "posts",
                FieldType::Collection("Post".into()),
                FieldMapping::OneToMany,
            ))
            .with_field(FieldDescriptor::record("note", FieldType::Text, FieldMapping::Unmapped))
    }

    #[test]
    fn classifies_fields_in_declaration_order() {
        let spec = BuildSpec::default();
        let plan = FieldClassifier::new(&spec).classify(&person()).unwrap();
        assert_eq!(plan.relation, "Person");
        assert_eq!(plan.column_names(), ["name", "age", "country"]);
        assert_eq!(
            plan.classification(SERIAL_VERSION_FIELD),
            Some(&FieldClass::Ignored(IgnoreReason::SerialVersion))
        );
        assert_eq!(
            plan.classification("active"),
            Some(&FieldClass::Ignored(IgnoreReason::UnsupportedType))
        );
        assert_eq!(
            plan.classification("posts"),
            Some(&FieldClass::Unsupported(FieldMapping::OneToMany))
        );
        assert_eq!(
            plan.classification("note"),
            Some(&FieldClass::Ignored(IgnoreReason::Unmapped))
        );
    }

    #[test]
    fn ignore_options_drop_fields() {
        let spec = BuildSpec::new(
            BuildOptions::new()
                .ignore_type(FieldType::Integer)
                .ignore_name("name"),
        );
        let plan = FieldClassifier::new(&spec).classify(&person()).unwrap();
        assert_eq!(plan.column_names(), ["country"]);
    }

    #[test]
    fn extra_kind_prefers_numeric_callbacks() {
        let mut spec: BuildSpec<Record> = BuildSpec::default();
        spec.register_extra("plain", None, None)
            .register_extra("label", Some(Value::from("unknown")), None)
            .register_extra("score", Some(Value::from(1.5)), None)
            .register_extra(
                "flag",
                Some(Value::from(true)),
                Some(Callback::numeric(|_, _, _| Ok(Some(1.0)))),
            )
            .register_extra("flag_text", Some(Value::from(false)), None)
            .register_extra(
                "rank",
                Some(Value::from("x")),
                Some(Callback::numeric(|_, _, _| Ok(Some(42.0)))),
            );
        let kinds: Vec<AttributeKind> = spec.extras().iter().map(extra_kind).collect();
        assert_eq!(
            kinds,
            [
                AttributeKind::Numeric,
                AttributeKind::String,
                AttributeKind::Numeric,
                AttributeKind::Numeric,
                AttributeKind::String,
                AttributeKind::Numeric,
            ]
        );
    }

    #[test]
    fn non_entity_types_need_the_option() {
        let spec = BuildSpec::default();
        let base = person().with_persistent(false);
        assert!(matches!(
            FieldClassifier::new(&spec).classify(&base),
            Err(BuildError::NotEntity { .. })
        ));

        let spec = BuildSpec::new(BuildOptions::new().with_non_entity(true));
        assert!(FieldClassifier::new(&spec).classify(&base).is_ok());
    }

    #[test]
    fn duplicate_column_names_are_rejected() {
        let mut spec: BuildSpec<Record> = BuildSpec::default();
        spec.register_extra("age", None, None);
        let error = FieldClassifier::new(&spec).classify(&person()).unwrap_err();
        assert!(matches!(error, BuildError::DuplicateColumn { name } if name == "age"));
    }
}
