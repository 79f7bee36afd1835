use anyhow::{Result, bail};
use comfy_table::{Cell, CellAlignment, Table};
use tracing::{info, info_span};

use entityset_arff::ArffWriterOptions;
use entityset_cli::pipeline::{
    SpecOverrides, build_dataset, find_entity_type, inspect_plan, load_build_spec, load_store,
    write_dataset,
};

use crate::cli::{EntityArgs, ExportArgs, InspectArgs, TypesArgs};
use crate::summary::{apply_table_style, header_cell, print_plan};
use crate::types::{ColumnSummary, ExportResult};

pub fn run_export(args: &ExportArgs) -> Result<ExportResult> {
    let span = info_span!("export", store = %args.entity.store.display(), entity = %args.entity.entity);
    let _guard = span.enter();

    let store = load_store(&args.entity.store)?;
    let entity_type = find_entity_type(&store, &args.entity.entity)?;
    let spec = load_build_spec(args.entity.spec.as_deref(), overrides(&args.entity))?;
    let dataset = build_dataset(&store, entity_type, &spec)?;

    let mut options = ArffWriterOptions::new().with_comment(format!(
        "{} exported from {}",
        dataset.relation(),
        args.entity.store.display()
    ));
    if let Some(format) = &args.date_format {
        let [pattern, strftime] = format.as_slice() else {
            bail!("--date-format takes a pattern and a strftime format");
        };
        options = options.with_date_format(pattern, strftime);
    }
    write_dataset(&dataset, args.output.as_deref(), &options)?;
    info!(instances = dataset.num_instances(), "export finished");

    let missing = dataset.missing_counts();
    let columns = dataset
        .attributes()
        .iter()
        .zip(missing)
        .map(|(attribute, missing)| ColumnSummary {
            name: attribute.name().to_string(),
            kind: attribute.kind(),
            values: (attribute.is_nominal() || attribute.is_string())
                .then_some(attribute.num_values()),
            missing,
        })
        .collect();
    Ok(ExportResult {
        relation: dataset.relation().to_string(),
        output: args.output.clone(),
        instances: dataset.num_instances(),
        columns,
    })
}

pub fn run_inspect(args: &InspectArgs) -> Result<()> {
    let span = info_span!("inspect", store = %args.entity.store.display(), entity = %args.entity.entity);
    let _guard = span.enter();

    let store = load_store(&args.entity.store)?;
    let entity_type = find_entity_type(&store, &args.entity.entity)?;
    let spec = load_build_spec(args.entity.spec.as_deref(), overrides(&args.entity))?;
    let report = inspect_plan(&store, entity_type, &spec)?;
    print_plan(&report);
    Ok(())
}

pub fn run_types(args: &TypesArgs) -> Result<()> {
    let store = load_store(&args.store)?;
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Type"),
        header_cell("Fields"),
        header_cell("Records"),
    ]);
    apply_table_style(&mut table);
    for name in store.type_names() {
        let fields = store
            .entity_type(name)
            .map_or_else(|| "-".to_string(), |entity_type| entity_type.fields().len().to_string());
        table.add_row(vec![
            Cell::new(name),
            Cell::new(fields).set_alignment(CellAlignment::Right),
            Cell::new(store.count(name)).set_alignment(CellAlignment::Right),
        ]);
    }
    println!("{table}");
    Ok(())
}

fn overrides(args: &EntityArgs) -> SpecOverrides {
    SpecOverrides {
        dedupe_domains: args.dedupe_domains,
        keep_nulls: args.keep_nulls,
        non_entity: args.non_entity,
    }
}
