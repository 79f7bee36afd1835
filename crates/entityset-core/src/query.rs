//! Query collaborator seam.

use std::fmt;

use entityset_model::Value;

use crate::error::QueryError;

/// A select-all query over one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    entity_name: String,
}

impl Query {
    pub fn select_all(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: entity_name.into(),
        }
    }

    pub fn entity_name(&self) -> &str {
        &self.entity_name
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SELECT E FROM {} E", self.entity_name)
    }
}

/// Runs queries against the persistence layer.
///
/// Subject entities come back typed; referenced entities come back as
/// values so one executor can serve every referenced type.
pub trait QueryExecutor<E> {
    /// All entities of the queried (subject) type, in store order.
    fn select_entities(&self, query: &Query) -> Result<Vec<E>, QueryError>;

    /// All entities of a referenced type, in store order.
    fn select_references(&self, query: &Query) -> Result<Vec<Value>, QueryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_select_all() {
        assert_eq!(
            Query::select_all("Country").to_string(),
            "SELECT E FROM Country E"
        );
    }
}
