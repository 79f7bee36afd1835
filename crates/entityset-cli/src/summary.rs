use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use entityset_cli::pipeline::PlanReport;
use entityset_model::AttributeKind;

use crate::types::ExportResult;

/// Export summary, written to stderr so stdout can carry the dataset.
pub fn print_export_summary(result: &ExportResult) {
    match &result.output {
        Some(path) => eprintln!("Relation: {} -> {}", result.relation, path.display()),
        None => eprintln!("Relation: {} -> stdout", result.relation),
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Attribute"),
        header_cell("Kind"),
        header_cell("Values"),
        header_cell("Missing"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    let mut total_missing = 0usize;
    for column in &result.columns {
        total_missing += column.missing;
        table.add_row(vec![
            Cell::new(&column.name),
            kind_cell(column.kind),
            column.values.map_or_else(|| dim_cell("-"), Cell::new),
            missing_cell(column.missing),
        ]);
    }
    table.add_row(vec![
        Cell::new("TOTAL")
            .fg(Color::Cyan)
            .add_attribute(Attribute::Bold),
        dim_cell(format!("{} rows", result.instances)),
        dim_cell("-"),
        missing_cell(total_missing).add_attribute(Attribute::Bold),
    ]);
    eprintln!("{table}");
}

pub fn print_plan(report: &PlanReport) {
    println!("Relation: {}", report.relation);
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Attribute"),
        header_cell("Kind"),
        header_cell("Source"),
        header_cell("Domain"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 4, CellAlignment::Right);
    for (index, column) in report.columns.iter().enumerate() {
        table.add_row(vec![
            Cell::new(index),
            Cell::new(&column.name),
            kind_cell(column.kind),
            Cell::new(&column.source),
            column.domain_size.map_or_else(|| dim_cell("-"), Cell::new),
        ]);
    }
    println!("{table}");

    if report.skipped.is_empty() {
        return;
    }
    let mut skipped = Table::new();
    skipped.set_header(vec![header_cell("Field"), header_cell("Reason")]);
    apply_table_style(&mut skipped);
    for (field, reason) in &report.skipped {
        skipped.add_row(vec![Cell::new(field), dim_cell(reason)]);
    }
    println!("{skipped}");
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn kind_cell(kind: AttributeKind) -> Cell {
    let color = match kind {
        AttributeKind::Numeric => Color::Green,
        AttributeKind::Nominal => Color::Blue,
        AttributeKind::String => Color::Magenta,
        AttributeKind::Date => Color::Yellow,
    };
    Cell::new(kind).fg(color)
}

fn missing_cell(count: usize) -> Cell {
    if count == 0 {
        dim_cell(count)
    } else {
        Cell::new(count).fg(Color::Yellow)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
