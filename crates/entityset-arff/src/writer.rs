//! ARFF file writer.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::DateTime;
use entityset_model::{Attribute, AttributeKind, Dataset, Instance};

use crate::error::{ArffError, Result};
use crate::options::ArffWriterOptions;
use crate::quote::quote;

/// ARFF file writer.
///
/// Writes the dense ARFF text format read by Weka.
pub struct ArffWriter<W: Write> {
    writer: BufWriter<W>,
    options: ArffWriterOptions,
}

impl<W: Write> ArffWriter<W> {
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, ArffWriterOptions::default())
    }

    pub fn with_options(writer: W, options: ArffWriterOptions) -> Self {
        Self {
            writer: BufWriter::new(writer),
            options,
        }
    }

    /// Writes the header and every row of `dataset`.
    pub fn write_dataset(mut self, dataset: &Dataset) -> Result<()> {
        validate_dataset(dataset)?;

        for comment in &self.options.comments {
            writeln!(self.writer, "% {comment}")?;
        }
        writeln!(self.writer, "@relation {}", quote(dataset.relation()))?;
        writeln!(self.writer)?;
        for attribute in dataset.attributes() {
            let line = self.attribute_line(attribute);
            writeln!(self.writer, "{line}")?;
        }
        writeln!(self.writer)?;
        writeln!(self.writer, "@data")?;

        for (row, instance) in dataset.instances().iter().enumerate() {
            let line = self.data_line(row, instance, dataset.attributes())?;
            writeln!(self.writer, "{line}")?;
        }

        self.writer.flush()?;
        Ok(())
    }

    fn attribute_line(&self, attribute: &Attribute) -> String {
        let name = quote(attribute.name());
        match attribute.kind() {
            AttributeKind::Numeric => format!("@attribute {name} numeric"),
            AttributeKind::String => format!("@attribute {name} string"),
            AttributeKind::Date => format!(
                "@attribute {name} date {}",
                quote(&self.options.date_pattern)
            ),
            AttributeKind::Nominal => {
                let labels: Vec<_> = attribute.values().iter().map(|label| quote(label)).collect();
                format!("@attribute {name} {{{}}}", labels.join(","))
            }
        }
    }

    fn data_line(&self, row: usize, instance: &Instance, attributes: &[Attribute]) -> Result<String> {
        if instance.width() != attributes.len() {
            return Err(ArffError::RowLengthMismatch {
                expected: attributes.len(),
                actual: instance.width(),
            });
        }
        let mut line = String::new();
        for (column, attribute) in attributes.iter().enumerate() {
            if column > 0 {
                line.push(',');
            }
            match instance.value(column) {
                None => line.push('?'),
                Some(value) => self.push_cell(&mut line, row, attribute, value)?,
            }
        }
        Ok(line)
    }

    fn push_cell(&self, line: &mut String, row: usize, attribute: &Attribute, value: f64) -> Result<()> {
        match attribute.kind() {
            AttributeKind::Numeric if value.is_finite() => {
                let _ = write!(line, "{value}");
            }
            AttributeKind::Numeric => line.push('?'),
            AttributeKind::Nominal | AttributeKind::String => {
                let label = label_at(attribute, value).ok_or_else(|| ArffError::IndexOutOfRange {
                    row,
                    attribute: attribute.name().to_string(),
                    value,
                })?;
                line.push_str(&quote(label));
            }
            AttributeKind::Date => {
                let timestamp = DateTime::from_timestamp_millis(value as i64)
                    .filter(|_| value.is_finite())
                    .ok_or_else(|| ArffError::InvalidDate {
                        row,
                        attribute: attribute.name().to_string(),
                        value,
                    })?;
                let formatted = timestamp
                    .naive_utc()
                    .format(&self.options.date_format)
                    .to_string();
                line.push_str(&quote(&formatted));
            }
        }
        Ok(())
    }
}

impl ArffWriter<File> {
    /// Create an ARFF file for writing.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(file))
    }

    pub fn create_with_options(path: &Path, options: ArffWriterOptions) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::with_options(file, options))
    }
}

/// Write a dataset to an ARFF file.
pub fn write_arff(path: &Path, dataset: &Dataset) -> Result<()> {
    ArffWriter::create(path)?.write_dataset(dataset)
}

/// Write a dataset to an ARFF file with options.
pub fn write_arff_with_options(
    path: &Path,
    dataset: &Dataset,
    options: &ArffWriterOptions,
) -> Result<()> {
    ArffWriter::create_with_options(path, options.clone())?.write_dataset(dataset)
}

/// Render a dataset as ARFF text.
pub fn to_arff_string(dataset: &Dataset) -> Result<String> {
    to_arff_string_with_options(dataset, &ArffWriterOptions::default())
}

pub fn to_arff_string_with_options(dataset: &Dataset, options: &ArffWriterOptions) -> Result<String> {
    let mut buffer = Vec::new();
    ArffWriter::with_options(&mut buffer, options.clone()).write_dataset(dataset)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

fn label_at(attribute: &Attribute, value: f64) -> Option<&str> {
    if value < 0.0 || value.fract() != 0.0 {
        return None;
    }
    attribute.value(value as usize)
}

/// Validate a dataset before writing.
fn validate_dataset(dataset: &Dataset) -> Result<()> {
    if dataset.relation().trim().is_empty() {
        return Err(ArffError::InvalidRelationName {
            name: dataset.relation().to_string(),
        });
    }

    let mut seen = HashSet::new();
    for (index, attribute) in dataset.attributes().iter().enumerate() {
        if attribute.name().trim().is_empty() {
            return Err(ArffError::InvalidAttributeName { index });
        }
        if !seen.insert(attribute.name()) {
            return Err(ArffError::duplicate_attribute(attribute.name()));
        }
        if attribute.is_nominal() {
            let mut labels = HashSet::new();
            for label in attribute.values() {
                if !labels.insert(label.as_str()) {
                    return Err(ArffError::duplicate_nominal_label(attribute.name(), label));
                }
            }
        }
    }

    for instance in dataset.instances() {
        if instance.width() != dataset.num_attributes() {
            return Err(ArffError::RowLengthMismatch {
                expected: dataset.num_attributes(),
                actual: instance.width(),
            });
        }
    }
    Ok(())
}
