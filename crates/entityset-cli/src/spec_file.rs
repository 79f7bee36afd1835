//! TOML build spec files.
//!
//! ```toml
//! [options]
//! ignore_fields_by_name = ["password"]
//! dedupe_domains = true
//!
//! [[extra]]
//! name = "cohort"
//! default = "2024"
//!
//! [missing]
//! age = -1
//!
//! [[label]]
//! type = "Country"
//! field = "code"
//!
//! [[fan_out]]
//! source = "address"
//! attribute = "city"
//! field = "city"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use entityset_core::{BuildOptions, BuildSpec, Callback};
use entityset_model::{FieldType, Record, Value};
use entityset_store::parse_timestamp;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpecFile {
    #[serde(default)]
    pub options: BuildOptions,
    #[serde(default)]
    pub extra: Vec<ExtraDef>,
    /// Field or attribute name to sentinel value.
    #[serde(default)]
    pub missing: BTreeMap<String, toml::Value>,
    #[serde(default)]
    pub label: Vec<LabelDef>,
    #[serde(default)]
    pub fan_out: Vec<FanOutDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtraDef {
    pub name: String,
    #[serde(default)]
    pub default: Option<toml::Value>,
}

/// Renders references of `type` with the value of `field` of the referenced record.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LabelDef {
    #[serde(rename = "type")]
    pub type_name: String,
    pub field: String,
}

/// Synthetic column `attribute` read from `field` of the record referenced
/// by `source`. Without `field` the source value itself is used.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FanOutDef {
    pub source: String,
    pub attribute: String,
    #[serde(default)]
    pub field: Option<String>,
}

impl SpecFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read build spec: {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse build spec: {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Registers everything the file declares on a fresh [`BuildSpec`].
    pub fn to_build_spec(&self) -> Result<BuildSpec<Record>> {
        let mut spec = BuildSpec::new(self.options.clone());
        for extra in &self.extra {
            let default = extra
                .default
                .as_ref()
                .map(|value| convert(&extra.name, value))
                .transpose()?;
            spec.register_extra(&extra.name, default, None);
        }
        for (name, sentinel) in &self.missing {
            spec.register_missing_value(name, convert(name, sentinel)?);
        }
        for label in &self.label {
            spec.register_type_callback(
                FieldType::Entity(label.type_name.clone()),
                label_callback(label.field.clone()),
            );
        }
        for fan_out in &self.fan_out {
            spec.register_fan_out(
                &fan_out.source,
                &fan_out.attribute,
                fan_out_callback(fan_out.field.clone()),
            );
        }
        Ok(spec)
    }
}

fn label_callback(field: String) -> Callback<Record> {
    Callback::textual(move |_entity: Option<&Record>, _name: &str, value: &Value| {
        Ok(value.as_record().and_then(|record| text_of(&record.get(&field))))
    })
}

fn fan_out_callback(field: Option<String>) -> Callback<Record> {
    Callback::fan_out(
        move |_entity: &Record, _attribute: &str, _source: &str, value: &Value| {
            let Some(field) = &field else {
                return Ok(text_of(value));
            };
            Ok(value.as_record().and_then(|record| text_of(&record.get(field))))
        },
    )
}

fn text_of(value: &Value) -> Option<String> {
    (!value.is_null()).then(|| value.to_string())
}

fn convert(name: &str, value: &toml::Value) -> Result<Value> {
    let converted = match value {
        toml::Value::String(text) => Value::Text(text.clone()),
        toml::Value::Integer(integer) => Value::Integer(*integer),
        toml::Value::Float(float) => Value::Float(*float),
        toml::Value::Boolean(flag) => Value::Bool(*flag),
        toml::Value::Datetime(datetime) => {
            let text = datetime.to_string();
            match parse_timestamp(&text) {
                Some(timestamp) => Value::Timestamp(timestamp),
                None => bail!("{name}: unsupported datetime {text}"),
            }
        }
        toml::Value::Array(_) | toml::Value::Table(_) => {
            bail!("{name}: expected a scalar value, found {}", value.type_str())
        }
    };
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use entityset_core::CellFailurePolicy;

    #[test]
    fn empty_file_uses_defaults() {
        let file = SpecFile::from_toml_str("").unwrap();
        assert_eq!(file.options, BuildOptions::default());
        let spec = file.to_build_spec().unwrap();
        assert!(spec.extras().is_empty());
        assert!(spec.fan_outs().is_empty());
    }

    #[test]
    fn parses_every_section() {
        let file = SpecFile::from_toml_str(
            r#"
            [options]
            ignore_fields_by_name = ["secret"]
            ignore_fields_of_type = ["boolean"]
            cell_failure = "propagate"

            [[extra]]
            name = "cohort"
            default = "2024"

            [[extra]]
            name = "weight"

            [missing]
            age = -1
            joined = 2024-01-02

            [[label]]
            type = "Country"
            field = "code"

            [[fan_out]]
            source = "address"
            attribute = "city"
            field = "city"
            "#,
        )
        .unwrap();

        assert!(file.options.ignores_name("secret"));
        assert!(file.options.ignores_type(&FieldType::Boolean));
        assert_eq!(file.options.cell_failure, CellFailurePolicy::Propagate);

        let spec = file.to_build_spec().unwrap();
        let names: Vec<_> = spec.extras().iter().map(|extra| extra.name.as_str()).collect();
        assert_eq!(names, vec!["cohort", "weight"]);
        assert_eq!(spec.extra("cohort").unwrap().default, Some(Value::from("2024")));
        assert!(spec.is_missing_value("age", &Value::Integer(-1)));
        assert!(matches!(spec.missing_value("joined"), Some(Value::Timestamp(_))));
        assert!(spec
            .callback_for_field("country", &FieldType::Entity("Country".to_string()))
            .is_some());
        assert!(spec.has_fan_out("address"));
    }

    #[test]
    fn label_callback_reads_the_referenced_field() {
        let callback = label_callback("code".to_string());
        let brazil = Value::from(Record::new("Country").with_field("code", "BR"));
        let output = callback.call(None, "country", &brazil).unwrap();
        assert_eq!(output, entityset_core::CallbackOutput::Text("BR".to_string()));
    }

    #[test]
    fn fan_out_without_field_uses_the_source_value() {
        let callback = fan_out_callback(None);
        let owner = Record::new("Person");
        let city = callback
            .call_fan_out(&owner, "city", "city", &Value::from("Rio"))
            .unwrap();
        assert_eq!(city.as_deref(), Some("Rio"));
    }

    #[test]
    fn rejects_unknown_keys_and_nested_values() {
        assert!(SpecFile::from_toml_str("[bogus]\nx = 1").is_err());
        let file = SpecFile::from_toml_str("[missing]\nage = [1, 2]").unwrap();
        assert!(file.to_build_spec().is_err());
    }
}
