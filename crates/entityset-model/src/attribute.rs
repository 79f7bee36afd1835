//! Dataset columns.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Kind of a dataset column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeKind {
    /// Plain numeric values.
    Numeric,
    /// Categorical with a fixed, ordered domain; cells hold domain indices.
    Nominal,
    /// Free strings pooled per column; cells hold pool indices.
    String,
    /// Timestamps; cells hold epoch milliseconds (UTC).
    Date,
}

impl AttributeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeKind::Numeric => "numeric",
            AttributeKind::Nominal => "nominal",
            AttributeKind::String => "string",
            AttributeKind::Date => "date",
        }
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed column of a dataset.
///
/// Nominal columns carry their domain from construction on. String columns
/// start empty and grow through [`Attribute::add_string_value`] while rows are
/// materialized.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    name: String,
    kind: AttributeKind,
    values: Vec<String>,
    pool: HashMap<String, usize>,
}

impl Attribute {
    fn with_kind(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            values: Vec::new(),
            pool: HashMap::new(),
        }
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::with_kind(name, AttributeKind::Numeric)
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::with_kind(name, AttributeKind::String)
    }

    pub fn date(name: impl Into<String>) -> Self {
        Self::with_kind(name, AttributeKind::Date)
    }

    /// A nominal column over `domain`; domain order is the encoding order.
    pub fn nominal(name: impl Into<String>, domain: Vec<String>) -> Self {
        Self {
            values: domain,
            ..Self::with_kind(name, AttributeKind::Nominal)
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == AttributeKind::Numeric
    }

    pub fn is_nominal(&self) -> bool {
        self.kind == AttributeKind::Nominal
    }

    pub fn is_string(&self) -> bool {
        self.kind == AttributeKind::String
    }

    pub fn is_date(&self) -> bool {
        self.kind == AttributeKind::Date
    }

    /// Domain of a nominal column, or the string pool of a string column.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn num_values(&self) -> usize {
        self.values.len()
    }

    pub fn value(&self, index: usize) -> Option<&str> {
        self.values.get(index).map(String::as_str)
    }

    /// Position of `value` in the domain or pool; the first match wins.
    pub fn index_of_value(&self, value: &str) -> Option<usize> {
        match self.kind {
            AttributeKind::String => self.pool.get(value).copied(),
            _ => self.values.iter().position(|candidate| candidate == value),
        }
    }

    /// Adds `value` to the string pool and returns its index. A value already
    /// in the pool keeps its first index.
    pub fn add_string_value(&mut self, value: &str) -> Result<usize> {
        if self.kind != AttributeKind::String {
            return Err(ModelError::NotStringAttribute {
                name: self.name.clone(),
                kind: self.kind.as_str(),
            });
        }
        if let Some(index) = self.pool.get(value) {
            return Ok(*index);
        }
        let index = self.values.len();
        self.values.push(value.to_string());
        self.pool.insert(value.to_string(), index);
        Ok(index)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_pool_reuses_indices() {
        let mut attribute = Attribute::string("name");
        assert_eq!(attribute.add_string_value("Alice").unwrap(), 0);
        assert_eq!(attribute.add_string_value("Bob").unwrap(), 1);
        assert_eq!(attribute.add_string_value("Alice").unwrap(), 0);
        assert_eq!(attribute.values(), ["Alice", "Bob"]);
    }

    #[test]
    fn only_string_columns_accept_new_values() {
        let mut attribute = Attribute::nominal("country", vec!["BR".into()]);
        let error = attribute.add_string_value("PT").unwrap_err();
        assert!(matches!(error, ModelError::NotStringAttribute { .. }));
    }

    #[test]
    fn nominal_lookup_returns_first_match() {
        let attribute = Attribute::nominal(
            "country",
            vec!["BR".into(), "PT".into(), "BR".into()],
        );
        assert_eq!(attribute.index_of_value("BR"), Some(0));
        assert_eq!(attribute.index_of_value("PT"), Some(1));
        assert_eq!(attribute.index_of_value("AR"), None);
    }
}
