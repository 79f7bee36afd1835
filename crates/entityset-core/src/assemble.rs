//! Dataset header and final assembly.

use entityset_model::{Attribute, Dataset, Instance};

use crate::classify::{ColumnSource, FieldClassification};
use crate::error::Result;

/// Resolved dataset header: attributes with their domains, the source of
/// every column, and the classification of every declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub relation: String,
    pub attributes: Vec<Attribute>,
    pub sources: Vec<ColumnSource>,
    pub fields: Vec<FieldClassification>,
}

impl Header {
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    pub fn attribute_names(&self) -> Vec<&str> {
        self.attributes.iter().map(Attribute::name).collect()
    }

    pub fn column(&self, index: usize) -> Option<(&Attribute, &ColumnSource)> {
        Some((self.attributes.get(index)?, self.sources.get(index)?))
    }
}

/// Combines a header and rows into a dataset. Every row must be as wide as
/// the header.
pub fn assemble(
    relation: impl Into<String>,
    attributes: Vec<Attribute>,
    rows: Vec<Instance>,
) -> Result<Dataset> {
    let mut dataset = Dataset::new(relation, attributes)?;
    for row in rows {
        dataset.add_instance(row)?;
    }
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use entityset_model::ModelError;

    use super::*;
    use crate::error::BuildError;

    #[test]
    fn rejects_short_rows() {
        let error = assemble(
            "Person",
            vec![Attribute::numeric("age"), Attribute::numeric("height")],
            vec![Instance::zeroed(2), Instance::zeroed(1)],
        )
        .unwrap_err();
        assert!(matches!(
            error,
            BuildError::Model(ModelError::RowWidthMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn keeps_row_order() {
        let dataset = assemble(
            "Person",
            vec![Attribute::numeric("age")],
            vec![Instance::new(vec![30.0]), Instance::new(vec![41.0])],
        )
        .unwrap();
        assert_eq!(dataset.relation(), "Person");
        assert_eq!(dataset.instance(1).and_then(|row| row.value(0)), Some(41.0));
    }
}
