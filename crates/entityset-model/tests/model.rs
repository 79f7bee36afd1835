//! Tests for entityset-model types.

use proptest::prelude::*;

use entityset_model::{
    Attribute, Dataset, EntityType, FieldDescriptor, FieldMapping, FieldType, Instance, Record,
    Value,
};

#[test]
fn value_serializes_with_kind_tags() {
    let value = Value::from(Record::new("Country").with_key("BR").with_field("code", "BR"));
    let json = serde_json::to_value(&value).expect("serialize value");
    assert_eq!(json["kind"], "reference");
    assert_eq!(json["value"]["type_name"], "Country");

    let round: Value = serde_json::from_value(json).expect("deserialize value");
    assert_eq!(round, value);
}

#[test]
fn field_type_names_use_snake_case() {
    let json = serde_json::to_string(&FieldType::Entity("Country".into())).unwrap();
    assert_eq!(json, r#"{"entity":"Country"}"#);
    let mapping: FieldMapping = serde_json::from_str(r#""many_to_one""#).unwrap();
    assert_eq!(mapping, FieldMapping::ManyToOne);
}

#[test]
fn entity_type_keeps_declaration_order() {
    let person = EntityType::new("Person")
        .with_field(FieldDescriptor::record("name", FieldType::Text, FieldMapping::Column))
        .with_field(FieldDescriptor::record("age", FieldType::Integer, FieldMapping::Column))
        .with_field(FieldDescriptor::record(
            "country",
            FieldType::Entity("Country".into()),
            FieldMapping::ManyToOne,
        ));

    let names: Vec<&str> = person.fields().iter().map(FieldDescriptor::name).collect();
    assert_eq!(names, ["name", "age", "country"]);
    assert_eq!(
        person.field("country").unwrap().field_type().referenced_type(),
        Some("Country")
    );
    assert!(person.field("missing").is_none());
}

#[test]
fn missing_counts_follow_flags() {
    let mut dataset = Dataset::new(
        "Person",
        vec![Attribute::numeric("age"), Attribute::numeric("height")],
    )
    .unwrap();
    let mut first = Instance::zeroed(2);
    first.set_missing(1).unwrap();
    let mut second = Instance::zeroed(2);
    second.set_missing(1).unwrap();
    second.set_missing(0).unwrap();
    dataset.add_instance(first).unwrap();
    dataset.add_instance(second).unwrap();

    assert_eq!(dataset.missing_counts(), vec![1, 2]);
}

#[test]
fn duplicate_attribute_names_are_reported_once() {
    let dataset = Dataset::new(
        "Person",
        vec![
            Attribute::numeric("age"),
            Attribute::numeric("age"),
            Attribute::numeric("age"),
            Attribute::string("name"),
        ],
    )
    .unwrap();
    assert_eq!(dataset.duplicate_attribute_names(), ["age"]);
}

proptest! {
    #[test]
    fn string_pool_addition_is_idempotent(values in prop::collection::vec("[a-z]{0,4}", 1..40)) {
        let mut attribute = Attribute::string("s");
        let first: Vec<usize> = values
            .iter()
            .map(|value| attribute.add_string_value(value).unwrap())
            .collect();
        let second: Vec<usize> = values
            .iter()
            .map(|value| attribute.add_string_value(value).unwrap())
            .collect();
        prop_assert_eq!(&first, &second);

        for (value, index) in values.iter().zip(first) {
            prop_assert_eq!(attribute.value(index), Some(value.as_str()));
        }
        let mut distinct = values.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(attribute.num_values(), distinct.len());
    }
}
