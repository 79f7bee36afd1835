//! JSON store documents.
//!
//! A document declares entity types and lists records:
//!
//! ```json
//! {
//!   "types": [
//!     {
//!       "name": "Person",
//!       "fields": [
//!         { "name": "name", "type": "text" },
//!         { "name": "country", "type": { "entity": "Country" }, "mapping": "many_to_one" }
//!       ]
//!     }
//!   ],
//!   "records": [
//!     { "type": "Country", "key": "BR", "label": "Brazil" },
//!     { "type": "Person", "key": "1", "fields": { "name": "Alice", "country": { "$ref": "Country#BR" } } }
//!   ]
//! }
//! ```
//!
//! Reference targets are embedded one level deep: a referenced record keeps
//! its scalar fields, and its own references become key-only stubs.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use entityset_model::{
    EntityType, FieldDescriptor, FieldMapping, FieldType, Record, TIMESTAMP_FORMAT, Value,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Object key marking a reference to another record.
pub const REFERENCE_KEY: &str = "$ref";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreDocument {
    #[serde(default)]
    pub types: Vec<TypeDef>,
    #[serde(default)]
    pub records: Vec<RecordDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDef {
    pub name: String,
    #[serde(default = "default_persistent")]
    pub persistent: bool,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

fn default_persistent() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Defaults to a plain column, or many-to-one for entity-typed fields.
    #[serde(default)]
    pub mapping: Option<FieldMapping>,
    /// Column name override for the exported attribute.
    #[serde(default)]
    pub column: Option<String>,
}

impl FieldDef {
    pub fn effective_mapping(&self) -> FieldMapping {
        self.mapping.unwrap_or(match self.field_type {
            FieldType::Entity(_) => FieldMapping::ManyToOne,
            FieldType::Collection(_) => FieldMapping::OneToMany,
            _ => FieldMapping::Column,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordDef {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl TypeDef {
    /// Entity type descriptor reading [`Record`] fields by name.
    pub fn to_entity_type(&self) -> EntityType<Record> {
        let mut entity_type = EntityType::new(&self.name).with_persistent(self.persistent);
        for field in &self.fields {
            let mut descriptor = FieldDescriptor::record(
                &field.name,
                field.field_type.clone(),
                field.effective_mapping(),
            );
            if let Some(column) = &field.column {
                descriptor = descriptor.with_column_name(column);
            }
            entity_type.push_field(descriptor);
        }
        entity_type
    }
}

struct PendingReference {
    record: usize,
    field: String,
    target: usize,
}

/// Converts record definitions into records with references resolved.
pub(crate) fn resolve_records(types: &[TypeDef], defs: &[RecordDef]) -> Result<Vec<Record>> {
    let declared: HashMap<(&str, &str), &FieldType> = types
        .iter()
        .flat_map(|def| {
            def.fields
                .iter()
                .map(move |field| ((def.name.as_str(), field.name.as_str()), &field.field_type))
        })
        .collect();

    let mut index = HashMap::new();
    for (position, def) in defs.iter().enumerate() {
        if let Some(key) = &def.key
            && index
                .insert((def.type_name.as_str(), key.as_str()), position)
                .is_some()
        {
            return Err(StoreError::DuplicateKey {
                type_name: def.type_name.clone(),
                key: key.clone(),
            });
        }
    }

    let mut records = Vec::with_capacity(defs.len());
    let mut pending = Vec::new();
    for (position, def) in defs.iter().enumerate() {
        let mut record = Record::new(&def.type_name);
        record.key.clone_from(&def.key);
        record.label.clone_from(&def.label);
        for (name, raw) in &def.fields {
            if let Some(reference) = reference_target(raw) {
                let target = lookup(&index, reference).ok_or_else(|| {
                    StoreError::UnresolvedReference {
                        type_name: def.type_name.clone(),
                        field: name.clone(),
                        reference: reference.to_string(),
                    }
                })??;
                pending.push(PendingReference {
                    record: position,
                    field: name.clone(),
                    target,
                });
                record.set(name.as_str(), Value::Null);
                continue;
            }
            let declared_type = declared.get(&(def.type_name.as_str(), name.as_str())).copied();
            let value = convert_value(&def.type_name, name, raw, declared_type)?;
            record.set(name.as_str(), value);
        }
        records.push(record);
    }

    for reference in &pending {
        let placeholder = stub(&records[reference.target]);
        records[reference.record].set(reference.field.as_str(), placeholder);
    }
    let shallow = records.clone();
    for reference in &pending {
        let target = shallow[reference.target].clone();
        records[reference.record].set(reference.field.as_str(), target);
    }
    Ok(records)
}

fn reference_target(raw: &serde_json::Value) -> Option<&str> {
    let object = raw.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.get(REFERENCE_KEY)?.as_str()
}

/// Looks up `Type#key`. The outer `Option` is `None` when the target does
/// not exist; the inner result fails for malformed references.
fn lookup(index: &HashMap<(&str, &str), usize>, reference: &str) -> Option<Result<usize>> {
    let Some((type_name, key)) = reference.split_once('#') else {
        return Some(Err(StoreError::MalformedReference {
            reference: reference.to_string(),
        }));
    };
    if type_name.is_empty() || key.is_empty() {
        return Some(Err(StoreError::MalformedReference {
            reference: reference.to_string(),
        }));
    }
    index.get(&(type_name, key)).copied().map(Ok)
}

fn stub(record: &Record) -> Record {
    let mut stub = Record::new(&record.type_name);
    stub.key.clone_from(&record.key);
    stub.label.clone_from(&record.label);
    stub
}

fn convert_value(
    type_name: &str,
    field: &str,
    raw: &serde_json::Value,
    declared: Option<&FieldType>,
) -> Result<Value> {
    let unsupported = || StoreError::UnsupportedValue {
        type_name: type_name.to_string(),
        field: field.to_string(),
        value: raw.to_string(),
    };
    let value = match raw {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(flag) => Value::Bool(*flag),
        serde_json::Value::Number(number) => match number.as_i64() {
            Some(integer) if declared != Some(&FieldType::Float) => Value::Integer(integer),
            _ => Value::Float(number.as_f64().ok_or_else(unsupported)?),
        },
        serde_json::Value::String(text) if declared == Some(&FieldType::Timestamp) => {
            Value::Timestamp(parse_timestamp(text).ok_or_else(|| {
                StoreError::InvalidTimestamp {
                    type_name: type_name.to_string(),
                    field: field.to_string(),
                    value: text.clone(),
                }
            })?)
        }
        serde_json::Value::String(text) => Value::Text(text.clone()),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => return Err(unsupported()),
    };
    Ok(value)
}

/// Parses RFC 3339, ISO local date-time, or a bare date (midnight).
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.naive_utc());
    }
    for format in [TIMESTAMP_FORMAT, "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_def(type_name: &str, key: &str, fields: serde_json::Value) -> RecordDef {
        RecordDef {
            type_name: type_name.to_string(),
            key: Some(key.to_string()),
            label: None,
            fields: serde_json::from_value(fields).unwrap(),
        }
    }

    #[test]
    fn parses_timestamp_variants() {
        let midnight = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-01-02"), Some(midnight));
        assert_eq!(parse_timestamp("2024-01-02T00:00:00"), Some(midnight));
        assert_eq!(parse_timestamp("2024-01-02T02:00:00+02:00"), Some(midnight));
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[test]
    fn entity_fields_default_to_many_to_one() {
        let field: FieldDef =
            serde_json::from_str(r#"{"name":"country","type":{"entity":"Country"}}"#).unwrap();
        assert_eq!(field.effective_mapping(), FieldMapping::ManyToOne);
        let field: FieldDef = serde_json::from_str(r#"{"name":"age","type":"integer"}"#).unwrap();
        assert_eq!(field.effective_mapping(), FieldMapping::Column);
    }

    #[test]
    fn nested_references_become_stubs() {
        let defs = vec![
            record_def("Person", "1", serde_json::json!({"name": "Alice"})),
            record_def("City", "rio", serde_json::json!({"mayor": {"$ref": "Person#1"}})),
            record_def("Address", "a", serde_json::json!({"city": {"$ref": "City#rio"}})),
        ];
        let records = resolve_records(&[], &defs).unwrap();
        let city = records[2].get("city");
        let city = city.as_record().unwrap();
        assert_eq!(city.key.as_deref(), Some("rio"));
        let mayor = city.get("mayor");
        let mayor = mayor.as_record().unwrap();
        assert_eq!(mayor.key.as_deref(), Some("1"));
        assert!(mayor.fields.is_empty());
    }

    #[test]
    fn rejects_malformed_and_missing_references() {
        let malformed = vec![record_def("A", "1", serde_json::json!({"b": {"$ref": "B"}}))];
        assert!(matches!(
            resolve_records(&[], &malformed),
            Err(StoreError::MalformedReference { .. })
        ));

        let missing = vec![record_def("A", "1", serde_json::json!({"b": {"$ref": "B#9"}}))];
        assert!(matches!(
            resolve_records(&[], &missing),
            Err(StoreError::UnresolvedReference { .. })
        ));
    }

    #[test]
    fn declared_timestamps_are_parsed() {
        let types = vec![TypeDef {
            name: "Event".to_string(),
            persistent: true,
            fields: vec![FieldDef {
                name: "at".to_string(),
                field_type: FieldType::Timestamp,
                mapping: None,
                column: None,
            }],
        }];
        let good = vec![record_def("Event", "1", serde_json::json!({"at": "2024-01-02"}))];
        let records = resolve_records(&types, &good).unwrap();
        assert!(matches!(records[0].get("at"), Value::Timestamp(_)));

        let bad = vec![record_def("Event", "2", serde_json::json!({"at": "soon"}))];
        assert!(matches!(
            resolve_records(&types, &bad),
            Err(StoreError::InvalidTimestamp { .. })
        ));
    }
}
