//! Configuration options for dataset builds.

use std::collections::BTreeSet;

use entityset_model::FieldType;
use serde::{Deserialize, Serialize};

/// What happens when a single cell cannot be computed (field accessor
/// failure, callback failure, value of the wrong type).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellFailurePolicy {
    /// Flag the cell missing and log a warning.
    #[default]
    MarkMissing,
    /// Leave the cell at zero without a missing flag and log a warning.
    ///
    /// A zeroed cell cannot be told apart from a real zero afterwards.
    LeaveZero,
    /// Abort the build.
    Propagate,
}

/// Options controlling field classification and missing-value handling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildOptions {
    /// Fields whose declared type is listed here never become columns.
    pub ignore_fields_of_type: BTreeSet<FieldType>,

    /// Fields whose name is listed here never become columns.
    pub ignore_fields_by_name: BTreeSet<String>,

    /// Export types that are not persistent entities instead of rejecting them.
    pub treat_base_class_as_non_entity: bool,

    /// A null value marks its cell missing. When false the cell is encoded as
    /// zero without a missing flag.
    pub null_values_are_missing: bool,

    /// Drop repeated labels from reference domains (first occurrence wins).
    /// Off by default: the domain mirrors the query result one to one.
    pub dedupe_domains: bool,

    pub cell_failure: CellFailurePolicy,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            ignore_fields_of_type: BTreeSet::new(),
            ignore_fields_by_name: BTreeSet::new(),
            treat_base_class_as_non_entity: false,
            null_values_are_missing: true,
            dedupe_domains: false,
            cell_failure: CellFailurePolicy::default(),
        }
    }
}

impl BuildOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn ignore_type(mut self, field_type: FieldType) -> Self {
        self.ignore_fields_of_type.insert(field_type);
        self
    }

    #[must_use]
    pub fn ignore_name(mut self, name: impl Into<String>) -> Self {
        self.ignore_fields_by_name.insert(name.into());
        self
    }

    #[must_use]
    pub fn with_non_entity(mut self, enable: bool) -> Self {
        self.treat_base_class_as_non_entity = enable;
        self
    }

    #[must_use]
    pub fn with_null_values_missing(mut self, enable: bool) -> Self {
        self.null_values_are_missing = enable;
        self
    }

    #[must_use]
    pub fn with_dedupe_domains(mut self, enable: bool) -> Self {
        self.dedupe_domains = enable;
        self
    }

    #[must_use]
    pub fn with_cell_failure(mut self, policy: CellFailurePolicy) -> Self {
        self.cell_failure = policy;
        self
    }

    pub fn ignores_type(&self, field_type: &FieldType) -> bool {
        self.ignore_fields_of_type.contains(field_type)
    }

    pub fn ignores_name(&self, name: &str) -> bool {
        self.ignore_fields_by_name.contains(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nulls_are_missing_by_default() {
        let options = BuildOptions::default();
        assert!(options.null_values_are_missing);
        assert!(!options.treat_base_class_as_non_entity);
        assert!(!options.dedupe_domains);
        assert_eq!(options.cell_failure, CellFailurePolicy::MarkMissing);
    }

    #[test]
    fn ignore_sets_accumulate() {
        let options = BuildOptions::new()
            .ignore_type(FieldType::Boolean)
            .ignore_name("password");
        assert!(options.ignores_type(&FieldType::Boolean));
        assert!(!options.ignores_type(&FieldType::Text));
        assert!(options.ignores_name("password"));
    }
}
