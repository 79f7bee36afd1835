//! Materialized datasets: a header of attributes and rows of encoded values.

use std::collections::{BTreeSet, HashSet};

use crate::attribute::Attribute;
use crate::error::{ModelError, Result};

/// One encoded row. Every slot holds a number: the value itself for numeric
/// and date columns, a domain or pool index for nominal and string columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    values: Vec<f64>,
    missing: BTreeSet<usize>,
}

impl Instance {
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            missing: BTreeSet::new(),
        }
    }

    /// A row of `width` zeroes with no missing cells.
    pub fn zeroed(width: usize) -> Self {
        Self::new(vec![0.0; width])
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Encoded value at `index`, or `None` when the cell is missing.
    pub fn value(&self, index: usize) -> Option<f64> {
        if self.missing.contains(&index) {
            return None;
        }
        self.values.get(index).copied()
    }

    /// Encoded slot at `index` regardless of the missing flag.
    pub fn raw_value(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied()
    }

    pub fn set_value(&mut self, index: usize, value: f64) -> Result<()> {
        let width = self.values.len();
        let slot = self
            .values
            .get_mut(index)
            .ok_or(ModelError::ColumnOutOfRange { index, width })?;
        *slot = value;
        Ok(())
    }

    pub fn set_missing(&mut self, index: usize) -> Result<()> {
        if index >= self.values.len() {
            return Err(ModelError::ColumnOutOfRange {
                index,
                width: self.values.len(),
            });
        }
        self.missing.insert(index);
        Ok(())
    }

    pub fn is_missing(&self, index: usize) -> bool {
        self.missing.contains(&index)
    }

    pub fn missing(&self) -> &BTreeSet<usize> {
        &self.missing
    }

    pub fn has_missing(&self) -> bool {
        !self.missing.is_empty()
    }
}

/// A named relation: ordered attributes and rows whose width matches them.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    relation: String,
    attributes: Vec<Attribute>,
    instances: Vec<Instance>,
}

impl Dataset {
    /// An empty dataset. Fails on an empty relation name or an empty
    /// attribute name.
    pub fn new(relation: impl Into<String>, attributes: Vec<Attribute>) -> Result<Self> {
        let relation = relation.into();
        if relation.trim().is_empty() {
            return Err(ModelError::EmptyRelationName);
        }
        if attributes.iter().any(|attribute| attribute.name().trim().is_empty()) {
            return Err(ModelError::EmptyAttributeName);
        }
        Ok(Self {
            relation,
            attributes,
            instances: Vec::new(),
        })
    }

    /// Appends a row; its width must equal the attribute count.
    pub fn add_instance(&mut self, instance: Instance) -> Result<()> {
        if instance.width() != self.attributes.len() {
            return Err(ModelError::RowWidthMismatch {
                expected: self.attributes.len(),
                actual: instance.width(),
            });
        }
        self.instances.push(instance);
        Ok(())
    }

    pub fn relation(&self) -> &str {
        &self.relation
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn attribute(&self, index: usize) -> Option<&Attribute> {
        self.attributes.get(index)
    }

    pub fn attribute_by_name(&self, name: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|attribute| attribute.name() == name)
    }

    pub fn attribute_index(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|attribute| attribute.name() == name)
    }

    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    pub fn instance(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    pub fn num_attributes(&self) -> usize {
        self.attributes.len()
    }

    pub fn num_instances(&self) -> usize {
        self.instances.len()
    }

    /// Decoded label of a nominal or string cell; `None` when missing, out of
    /// range, or the column holds plain numbers.
    pub fn label(&self, row: usize, column: usize) -> Option<&str> {
        let attribute = self.attributes.get(column)?;
        if !(attribute.is_nominal() || attribute.is_string()) {
            return None;
        }
        let encoded = self.instances.get(row)?.value(column)?;
        if encoded < 0.0 || encoded.fract() != 0.0 {
            return None;
        }
        attribute.value(encoded as usize)
    }

    /// Number of missing cells per column.
    pub fn missing_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.attributes.len()];
        for instance in &self.instances {
            for index in instance.missing() {
                if let Some(count) = counts.get_mut(*index) {
                    *count += 1;
                }
            }
        }
        counts
    }

    /// Names that occur more than once in the header.
    pub fn duplicate_attribute_names(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        for attribute in &self.attributes {
            if !seen.insert(attribute.name()) && !duplicates.contains(&attribute.name()) {
                duplicates.push(attribute.name());
            }
        }
        duplicates
    }
}
