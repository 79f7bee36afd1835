use std::path::PathBuf;

use entityset_model::AttributeKind;

#[derive(Debug)]
pub struct ExportResult {
    pub relation: String,
    /// `None` when the dataset went to stdout.
    pub output: Option<PathBuf>,
    pub instances: usize,
    pub columns: Vec<ColumnSummary>,
}

#[derive(Debug)]
pub struct ColumnSummary {
    pub name: String,
    pub kind: AttributeKind,
    /// Categories of nominal columns, pooled values of string columns.
    pub values: Option<usize>,
    pub missing: usize,
}
