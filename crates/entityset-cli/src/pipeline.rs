//! Store loading, spec assembly, dataset export and plan inspection.

use std::io;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use tracing::{info, info_span};

use entityset_arff::{ArffWriter, ArffWriterOptions, write_arff_with_options};
use entityset_core::{BuildSpec, DatasetBuilder, FieldClass};
use entityset_model::{AttributeKind, Dataset, EntityType, Record};
use entityset_store::MemoryStore;

use crate::spec_file::SpecFile;

/// Command-line switches layered over the build spec file options.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecOverrides {
    pub dedupe_domains: bool,
    pub keep_nulls: bool,
    pub non_entity: bool,
}

/// One output column as planned for an entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnReport {
    pub name: String,
    pub kind: AttributeKind,
    pub source: String,
    /// Number of categories for nominal columns.
    pub domain_size: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlanReport {
    pub relation: String,
    pub columns: Vec<ColumnReport>,
    /// Fields that produce no column of their own, with the reason.
    pub skipped: Vec<(String, String)>,
}

pub fn load_store(path: &Path) -> Result<MemoryStore> {
    MemoryStore::load(path).with_context(|| format!("Failed to load store: {}", path.display()))
}

pub fn load_build_spec(path: Option<&Path>, overrides: SpecOverrides) -> Result<BuildSpec<Record>> {
    let file = match path {
        Some(path) => SpecFile::load(path)?,
        None => SpecFile::default(),
    };
    let mut spec = file.to_build_spec()?;
    let options = spec.options_mut();
    if overrides.dedupe_domains {
        options.dedupe_domains = true;
    }
    if overrides.keep_nulls {
        options.null_values_are_missing = false;
    }
    if overrides.non_entity {
        options.treat_base_class_as_non_entity = true;
    }
    Ok(spec)
}

pub fn find_entity_type<'a>(store: &'a MemoryStore, name: &str) -> Result<&'a EntityType<Record>> {
    store.entity_type(name).ok_or_else(|| {
        let known: Vec<_> = store.entity_types().iter().map(EntityType::name).collect();
        anyhow!(
            "unknown entity type {name} (declared: {})",
            if known.is_empty() {
                "none".to_string()
            } else {
                known.join(", ")
            }
        )
    })
}

/// Builds the dataset of every stored entity of `entity_type`.
pub fn build_dataset(
    store: &MemoryStore,
    entity_type: &EntityType<Record>,
    spec: &BuildSpec<Record>,
) -> Result<Dataset> {
    let span = info_span!("export", entity = entity_type.name());
    let _guard = span.enter();
    let dataset = DatasetBuilder::new(entity_type, spec)
        .with_executor(store)
        .build()
        .with_context(|| format!("Failed to build dataset for {}", entity_type.name()))?;
    info!(
        relation = dataset.relation(),
        attributes = dataset.num_attributes(),
        instances = dataset.num_instances(),
        "dataset built"
    );
    Ok(dataset)
}

/// Classifies fields and resolves reference domains without loading rows.
pub fn inspect_plan(
    store: &MemoryStore,
    entity_type: &EntityType<Record>,
    spec: &BuildSpec<Record>,
) -> Result<PlanReport> {
    let header = DatasetBuilder::new(entity_type, spec)
        .with_executor(store)
        .build_header()
        .with_context(|| format!("Failed to plan columns for {}", entity_type.name()))?;

    let columns = header
        .attributes
        .iter()
        .zip(&header.sources)
        .map(|(attribute, source)| ColumnReport {
            name: attribute.name().to_string(),
            kind: attribute.kind(),
            source: source.describe(),
            domain_size: attribute.is_nominal().then_some(attribute.num_values()),
        })
        .collect();
    let skipped = header
        .fields
        .iter()
        .filter(|field| !matches!(field.class, FieldClass::Direct(_) | FieldClass::Reference(_)))
        .map(|field| (field.field.clone(), field.class.to_string()))
        .collect();
    Ok(PlanReport {
        relation: header.relation,
        columns,
        skipped,
    })
}

/// Writes `dataset` as ARFF to `output`, or to stdout when no path is given.
pub fn write_dataset(dataset: &Dataset, output: Option<&Path>, options: &ArffWriterOptions) -> Result<()> {
    match output {
        Some(path) => write_arff_with_options(path, dataset, options)
            .with_context(|| format!("Failed to write ARFF: {}", path.display())),
        None => ArffWriter::with_options(io::stdout().lock(), options.clone())
            .write_dataset(dataset)
            .context("Failed to write ARFF to stdout"),
    }
}
