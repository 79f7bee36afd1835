//! Row materialization: one encoded instance per entity.

use entityset_model::{Attribute, AttributeKind, EntityType, FieldDescriptor, Instance, Value};
use tracing::{debug, info, info_span, warn};

use crate::assemble::Header;
use crate::callback::CallbackOutput;
use crate::classify::{ColumnSource, ReferenceEncoding};
use crate::error::{BuildError, CellError, Result};
use crate::options::CellFailurePolicy;
use crate::registry::BuildSpec;

/// Outcome of a single cell.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Cell {
    Value(f64),
    Missing,
}

type CellResult = std::result::Result<Cell, CellError>;

/// Encodes entities into rows against a resolved [`Header`].
///
/// String columns grow their value pools as rows are encoded, so the header
/// is borrowed mutably for the whole run.
pub struct InstanceMaterializer<'a, E> {
    entity_type: &'a EntityType<E>,
    spec: &'a BuildSpec<E>,
}

impl<'a, E> InstanceMaterializer<'a, E> {
    pub fn new(entity_type: &'a EntityType<E>, spec: &'a BuildSpec<E>) -> Self {
        Self { entity_type, spec }
    }

    /// One row per entity, in entity order.
    pub fn materialize(&self, entities: &[E], header: &mut Header) -> Result<Vec<Instance>> {
        let _span = info_span!(
            "materialize",
            relation = %header.relation,
            entities = entities.len()
        )
        .entered();

        if header.sources.len() != header.attributes.len() {
            return Err(BuildError::HeaderMismatch {
                attributes: header.attributes.len(),
                sources: header.sources.len(),
            });
        }

        let mut rows = Vec::with_capacity(entities.len());
        for (row, entity) in entities.iter().enumerate() {
            rows.push(self.materialize_row(row, entity, header)?);
        }
        let missing: usize = rows.iter().map(|row| row.missing().len()).sum();
        info!(rows = rows.len(), missing_cells = missing, "rows materialized");
        Ok(rows)
    }

    fn materialize_row(&self, row: usize, entity: &E, header: &mut Header) -> Result<Instance> {
        let mut instance = Instance::zeroed(header.attributes.len());
        let mut missing = Vec::new();

        let columns = header.attributes.iter_mut().zip(&header.sources);
        for (column, (attribute, source)) in columns.enumerate() {
            let cell = match self.cell(entity, source, attribute) {
                Ok(cell) => cell,
                Err(error) => self.on_failure(row, attribute.name(), source, error)?,
            };
            match cell {
                Cell::Value(value) => instance.set_value(column, value)?,
                Cell::Missing => missing.push(column),
            }
        }

        for column in missing {
            instance.set_missing(column)?;
        }
        Ok(instance)
    }

    fn on_failure(
        &self,
        row: usize,
        column: &str,
        source: &ColumnSource,
        error: CellError,
    ) -> Result<Cell> {
        match self.spec.options().cell_failure {
            CellFailurePolicy::MarkMissing => {
                warn!(row, column, %error, "cell could not be computed, marked missing");
                Ok(Cell::Missing)
            }
            CellFailurePolicy::LeaveZero => {
                warn!(row, column, %error, "cell could not be computed, left at zero");
                Ok(Cell::Value(0.0))
            }
            CellFailurePolicy::Propagate if error.is_field_access() => {
                Err(BuildError::MissingField {
                    row,
                    column: column.to_string(),
                    field: source_field(source).to_string(),
                    message: error.to_string(),
                })
            }
            CellFailurePolicy::Propagate => Err(BuildError::Cell {
                row,
                column: column.to_string(),
                source: error,
            }),
        }
    }

    fn cell(&self, entity: &E, source: &ColumnSource, attribute: &mut Attribute) -> CellResult {
        match source {
            ColumnSource::Field { field } => {
                let raw = self.field(field)?.read(entity)?;
                self.direct_cell(field, &raw, attribute)
            }
            ColumnSource::Reference {
                field, encoding, ..
            } => self.reference_cell(entity, field, *encoding, attribute),
            ColumnSource::Extra { name } => self.extra_cell(entity, name, attribute),
            ColumnSource::FanOut {
                source_field,
                attribute: name,
            } => self.fan_out_cell(entity, source_field, name, attribute),
        }
    }

    fn field(&self, name: &str) -> std::result::Result<&'a FieldDescriptor<E>, CellError> {
        self.entity_type
            .field(name)
            .ok_or_else(|| CellError::UnknownField {
                field: name.to_string(),
            })
    }

    fn null_cell(&self) -> Cell {
        if self.spec.options().null_values_are_missing {
            Cell::Missing
        } else {
            Cell::Value(0.0)
        }
    }

    fn direct_cell(&self, field: &str, raw: &Value, attribute: &mut Attribute) -> CellResult {
        if self.spec.is_missing_value(field, raw) {
            return Ok(Cell::Missing);
        }
        if raw.is_null() {
            return Ok(self.null_cell());
        }
        match attribute.kind() {
            AttributeKind::String => add_string(attribute, &raw.to_string()),
            AttributeKind::Nominal => Ok(encode_label(attribute, &raw.to_string())),
            AttributeKind::Numeric => raw.as_f64().map(Cell::Value).ok_or(CellError::TypeMismatch {
                expected: "numeric",
                found: raw.kind_name(),
            }),
            AttributeKind::Date => match raw {
                Value::Timestamp(timestamp) => {
                    Ok(Cell::Value(timestamp.and_utc().timestamp_millis() as f64))
                }
                other => Err(CellError::TypeMismatch {
                    expected: "timestamp",
                    found: other.kind_name(),
                }),
            },
        }
    }

    fn reference_cell(
        &self,
        entity: &E,
        field: &str,
        encoding: ReferenceEncoding,
        attribute: &mut Attribute,
    ) -> CellResult {
        let descriptor = self.field(field)?;
        let raw = descriptor.read(entity)?;
        if self.spec.is_missing_value(field, &raw) {
            return Ok(Cell::Missing);
        }
        if raw.is_null() {
            return Ok(self.null_cell());
        }

        let output = match &raw {
            Value::Text(label) => CallbackOutput::Text(label.clone()),
            _ => match self.spec.callback_for_field(field, descriptor.field_type()) {
                Some(callback) => callback
                    .call(Some(entity), field, &raw)
                    .map_err(CellError::Callback)?,
                None => CallbackOutput::Text(raw.to_string()),
            },
        };

        match (output, encoding) {
            (CallbackOutput::Nothing, _) => Ok(self.null_cell()),
            (CallbackOutput::Number(number), _) => Ok(Cell::Value(number)),
            (CallbackOutput::Text(label), ReferenceEncoding::Nominal) => {
                Ok(encode_label(attribute, &label))
            }
            (CallbackOutput::Text(label), ReferenceEncoding::Numeric) => parse_number(&label),
        }
    }

    fn extra_cell(&self, entity: &E, name: &str, attribute: &mut Attribute) -> CellResult {
        let extra = self.spec.extra(name).ok_or_else(|| CellError::UnknownField {
            field: name.to_string(),
        })?;
        if extra
            .default
            .as_ref()
            .is_some_and(|default| self.spec.is_missing_value(name, default))
        {
            return Ok(Cell::Missing);
        }

        let raw = extra.default.clone().unwrap_or_default();
        let output = match &extra.callback {
            Some(callback) => callback
                .call(Some(entity), name, &raw)
                .map_err(CellError::Callback)?,
            None => match raw {
                Value::Null => CallbackOutput::Nothing,
                Value::Text(text) => CallbackOutput::Text(text),
                other => match other.as_f64() {
                    Some(number) => CallbackOutput::Number(number),
                    None => CallbackOutput::Text(other.to_string()),
                },
            },
        };

        match output {
            CallbackOutput::Nothing => Ok(self.null_cell()),
            CallbackOutput::Number(number) => Ok(Cell::Value(number)),
            CallbackOutput::Text(text) => match attribute.kind() {
                AttributeKind::String => add_string(attribute, &text),
                AttributeKind::Nominal => Ok(encode_label(attribute, &text)),
                AttributeKind::Numeric | AttributeKind::Date => parse_number(&text),
            },
        }
    }

    fn fan_out_cell(
        &self,
        entity: &E,
        source_field: &str,
        name: &str,
        attribute: &mut Attribute,
    ) -> CellResult {
        let raw = self.field(source_field)?.read(entity)?;
        let callback = self
            .spec
            .fan_out(source_field)
            .and_then(|set| set.callback(name))
            .ok_or_else(|| CellError::UnknownField {
                field: name.to_string(),
            })?;

        match callback
            .call_fan_out(entity, name, source_field, &raw)
            .map_err(CellError::Callback)?
        {
            None => Ok(self.null_cell()),
            Some(text) if self.spec.is_missing_value(name, &Value::from(text.as_str())) => {
                Ok(Cell::Missing)
            }
            Some(text) => add_string(attribute, &text),
        }
    }
}

fn source_field(source: &ColumnSource) -> &str {
    match source {
        ColumnSource::Field { field } | ColumnSource::Reference { field, .. } => field,
        ColumnSource::Extra { name } => name,
        ColumnSource::FanOut { source_field, .. } => source_field,
    }
}

fn add_string(attribute: &mut Attribute, text: &str) -> CellResult {
    Ok(Cell::Value(attribute.add_string_value(text)? as f64))
}

/// Position of `label` in a resolved domain; labels outside the domain are
/// missing.
fn encode_label(attribute: &Attribute, label: &str) -> Cell {
    match attribute.index_of_value(label) {
        Some(index) => Cell::Value(index as f64),
        None => {
            debug!(column = attribute.name(), label, "value not in domain, marked missing");
            Cell::Missing
        }
    }
}

fn parse_number(text: &str) -> CellResult {
    text.trim()
        .parse::<f64>()
        .map(Cell::Value)
        .map_err(|_| CellError::TypeMismatch {
            expected: "numeric",
            found: "text",
        })
}
