//! Store to ARFF through build spec files.

use std::fs;
use std::path::{Path, PathBuf};

use entityset_arff::ArffWriterOptions;
use entityset_cli::pipeline::{
    SpecOverrides, build_dataset, find_entity_type, inspect_plan, load_build_spec, load_store,
    write_dataset,
};
use entityset_model::AttributeKind;

const STORE: &str = r#"{
  "types": [
    {
      "name": "Person",
      "fields": [
        { "name": "name", "type": "text" },
        { "name": "age", "type": "integer" },
        { "name": "password", "type": "text" },
        { "name": "country", "type": { "entity": "Country" } },
        { "name": "address", "type": { "entity": "Address" } }
      ]
    }
  ],
  "records": [
    { "type": "Country", "key": "BR", "label": "Brazil", "fields": { "code": "BR" } },
    { "type": "Country", "key": "NZ", "label": "New Zealand", "fields": { "code": "NZ" } },
    { "type": "Address", "key": "a1", "fields": { "city": "Rio" } },
    { "type": "Address", "key": "a2", "fields": { "city": "Auckland" } },
    {
      "type": "Person",
      "key": "1",
      "fields": {
        "name": "Alice", "age": 30, "password": "hunter2",
        "country": { "$ref": "Country#BR" }, "address": { "$ref": "Address#a1" }
      }
    },
    {
      "type": "Person",
      "key": "2",
      "fields": {
        "name": "Bob", "age": -1, "password": "swordfish",
        "country": { "$ref": "Country#NZ" }, "address": { "$ref": "Address#a2" }
      }
    }
  ]
}"#;

const SPEC: &str = r#"
[options]
ignore_fields_by_name = ["password"]

[[extra]]
name = "cohort"
default = "2024"

[missing]
age = -1

[[label]]
type = "Country"
field = "code"

[[fan_out]]
source = "address"
attribute = "city"
field = "city"
"#;

struct Fixture {
    dir: tempfile::TempDir,
    store: PathBuf,
    spec: PathBuf,
}

fn fixture() -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let store = dir.path().join("store.json");
    let spec = dir.path().join("spec.toml");
    fs::write(&store, STORE).unwrap();
    fs::write(&spec, SPEC).unwrap();
    Fixture {
        dir,
        store,
        spec,
    }
}

fn export_to(fixture: &Fixture, spec: Option<&Path>, output: &Path) -> String {
    let store = load_store(&fixture.store).unwrap();
    let person = find_entity_type(&store, "Person").unwrap();
    let spec = load_build_spec(spec, SpecOverrides::default()).unwrap();
    let dataset = build_dataset(&store, person, &spec).unwrap();
    write_dataset(&dataset, Some(output), &ArffWriterOptions::new()).unwrap();
    fs::read_to_string(output).unwrap()
}

#[test]
fn exports_with_a_spec_file() {
    let fixture = fixture();
    let output = fixture.dir.path().join("person.arff");
    let text = export_to(&fixture, Some(&fixture.spec), &output);
    insta::assert_snapshot!(text.trim_end(), @r"
    @relation Person

    @attribute name string
    @attribute age numeric
    @attribute country {BR,NZ}
    @attribute cohort string
    @attribute city string

    @data
    Alice,30,BR,2024,Rio
    Bob,?,NZ,2024,Auckland
    ");
}

#[test]
fn exports_without_a_spec_file() {
    let fixture = fixture();
    let output = fixture.dir.path().join("plain.arff");
    let text = export_to(&fixture, None, &output);
    assert!(text.contains("@attribute password string\n"));
    assert!(text.contains("@attribute country {Brazil,'New Zealand'}\n"));
    assert!(text.contains("@attribute address {Address#a1,Address#a2}\n"));
    assert!(text.contains("Bob,-1,swordfish,'New Zealand',Address#a2\n"));
}

#[test]
fn inspection_lists_columns_and_skipped_fields() {
    let fixture = fixture();
    let store = load_store(&fixture.store).unwrap();
    let person = find_entity_type(&store, "Person").unwrap();
    let spec = load_build_spec(Some(&fixture.spec), SpecOverrides::default()).unwrap();

    let report = inspect_plan(&store, person, &spec).unwrap();

    assert_eq!(report.relation, "Person");
    let columns: Vec<_> = report
        .columns
        .iter()
        .map(|column| (column.name.as_str(), column.kind, column.domain_size))
        .collect();
    assert_eq!(
        columns,
        vec![
            ("name", AttributeKind::String, None),
            ("age", AttributeKind::Numeric, None),
            ("country", AttributeKind::Nominal, Some(2)),
            ("cohort", AttributeKind::String, None),
            ("city", AttributeKind::String, None),
        ]
    );
    assert_eq!(report.columns[4].source, "fan-out address.city");
    assert_eq!(
        report.skipped,
        vec![
            ("password".to_string(), "ignored (ignored name)".to_string()),
            ("address".to_string(), "fan-out source".to_string()),
        ]
    );
}

#[test]
fn overrides_apply_on_top_of_the_file() {
    let fixture = fixture();
    let overrides = SpecOverrides {
        dedupe_domains: true,
        keep_nulls: true,
        non_entity: false,
    };
    let spec = load_build_spec(Some(&fixture.spec), overrides).unwrap();
    assert!(spec.options().dedupe_domains);
    assert!(!spec.options().null_values_are_missing);
    assert!(spec.options().ignores_name("password"));
}

#[test]
fn unknown_entities_name_the_declared_types() {
    let fixture = fixture();
    let store = load_store(&fixture.store).unwrap();
    let error = find_entity_type(&store, "Invoice").unwrap_err();
    assert!(error.to_string().contains("Invoice"));
    assert!(error.to_string().contains("Person"));
}

#[test]
fn unreadable_spec_files_carry_the_path() {
    let fixture = fixture();
    let missing = fixture.dir.path().join("absent.toml");
    let error = load_build_spec(Some(&missing), SpecOverrides::default()).unwrap_err();
    assert!(format!("{error:#}").contains("absent.toml"));
}
