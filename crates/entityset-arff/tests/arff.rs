//! Integration tests for ARFF output.

use std::fs;

use proptest::prelude::*;

use entityset_arff::{ArffWriterOptions, quote::quote, to_arff_string, write_arff_with_options};
use entityset_model::{Attribute, Dataset, Instance};

fn people() -> Dataset {
    let mut name = Attribute::string("name");
    name.add_string_value("Alice").unwrap();
    name.add_string_value("Bob Smith").unwrap();
    let mut dataset = Dataset::new(
        "Person",
        vec![
            name,
            Attribute::numeric("age"),
            Attribute::nominal("country", vec!["Brazil".into(), "New Zealand".into()]),
            Attribute::date("born"),
        ],
    )
    .unwrap();

    dataset
        .add_instance(Instance::new(vec![0.0, 30.0, 0.0, 1_704_153_600_000.0]))
        .unwrap();
    let mut second = Instance::new(vec![1.0, 41.5, 1.0, 0.0]);
    second.set_missing(3).unwrap();
    dataset.add_instance(second).unwrap();
    let mut third = Instance::zeroed(4);
    for column in 0..4 {
        third.set_missing(column).unwrap();
    }
    dataset.add_instance(third).unwrap();
    dataset
}

#[test]
fn writes_header_and_rows() {
    let text = to_arff_string(&people()).unwrap();
    insta::assert_snapshot!(text.trim_end(), @r"
    @relation Person

    @attribute name string
    @attribute age numeric
    @attribute country {Brazil,'New Zealand'}
    @attribute born date 'yyyy-MM-dd\'T\'HH:mm:ss'

    @data
    Alice,30,Brazil,2024-01-02T00:00:00
    'Bob Smith',41.5,'New Zealand',?
    ?,?,?,?
    ");
}

#[test]
fn writes_files_with_custom_date_format() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("people.arff");
    let options = ArffWriterOptions::new()
        .with_comment("people export")
        .with_date_format("yyyy-MM-dd", "%Y-%m-%d");

    write_arff_with_options(&path, &people(), &options).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("% people export\n"));
    assert!(text.contains("@attribute born date yyyy-MM-dd\n"));
    assert!(text.contains("Alice,30,Brazil,2024-01-02\n"));
}

#[test]
fn duplicate_attribute_names_are_rejected() {
    let dataset = Dataset::new(
        "Person",
        vec![Attribute::numeric("age"), Attribute::numeric("age")],
    )
    .unwrap();
    assert!(to_arff_string(&dataset).is_err());
}

proptest! {
    #[test]
    fn quoted_tokens_are_wrapped_or_untouched(value in "[a-zA-Z0-9 ,'{}%?_-]{0,12}") {
        let quoted = quote(&value);
        if quoted == value.as_str() {
            prop_assert!(!value.is_empty());
            prop_assert!(!value.contains([' ', ',', '\'', '{', '}', '%']), "unquoted value {:?} contains a special character", value);
            prop_assert!(value != "?");
        } else {
            prop_assert!(quoted.starts_with('\'') && quoted.ends_with('\''));
            prop_assert!(quoted.len() >= value.len() + 2);
        }
    }
}
