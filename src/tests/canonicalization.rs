//! Tag resolution and string conversion against the fixture schema

use super::helpers::*;
use crate::{
    config::ValidatorConfig,
    error::HedError,
    issues::ErrorCode,
    schema::HedSchema,
    strings::{convert_hed_string, TagForm},
    validation::{validate_hed_string, HedValidator},
};
use test_log::test;

const DUPLICATE_SCHEMA: &str = r#"{
    "version": "dup",
    "tags": [
        {"name": "Event", "children": [{"name": "Marker"}]},
        {"name": "Item", "children": [{"name": "Marker"}, {"name": "Tool"}]}
    ]
}"#;

#[test]
fn test_every_node_round_trips() {
    let schema = test_schema();
    let mut checked = 0;
    for &idx in schema.nodes() {
        let entry = schema.entry(idx);
        if entry.is_placeholder() {
            continue;
        }
        let long = entry.long_name.as_str();

        let (from_long, issues) = schema.convert_to_long(long);
        assert!(issues.is_empty(), "{long}: {issues:?}");
        assert_eq!(from_long, long);

        let (from_short, issues) = schema.convert_to_long(&entry.name);
        assert!(issues.is_empty(), "{}: {issues:?}", entry.name);
        assert_eq!(from_short, long);

        let (short, issues) = schema.convert_to_short(long);
        assert!(issues.is_empty());
        assert_eq!(short, entry.name);
        checked += 1;
    }
    assert!(checked > 20);
}

#[test]
fn test_partial_paths_resolve() {
    let schema = test_schema();
    for written in ["Furnishing/Chair", "Object/Furnishing/Chair", "chair", "CHAIR"] {
        let (long, issues) = schema.convert_to_long(written);
        assert!(issues.is_empty(), "{written}");
        assert!(long.eq_ignore_ascii_case("Item/Object/Furnishing/Chair"));
    }
}

#[test]
fn test_values_and_extensions_are_kept() {
    let schema = test_schema();
    let (long, _) = schema.convert_to_long("Duration/3 ms");
    assert_eq!(long, "Property/Temporal-property/Duration/3 ms");
    let (long, _) = schema.convert_to_long("Chair/Rocking");
    assert_eq!(long, "Item/Object/Furnishing/Chair/Rocking");
    // A value may repeat a schema term.
    let (long, issues) = schema.convert_to_long("Label/Event");
    assert!(issues.is_empty());
    assert_eq!(long, "Property/Informational-property/Label/Event");
}

#[test]
fn test_convert_whole_strings() {
    let schema = test_schema();
    let (long, issues) = convert_hed_string(
        &schema,
        "Sensory-event, (Chair, Move), Duration/2 s",
        TagForm::Long,
    );
    assert!(issues.is_empty());
    assert_eq!(
        long,
        "Event/Sensory-event, (Item/Object/Furnishing/Chair, Action/Move), \
         Property/Temporal-property/Duration/2 s"
    );

    let (short, issues) = convert_hed_string(&schema, &long, TagForm::Short);
    assert!(issues.is_empty());
    assert_eq!(short, "Sensory-event, (Chair, Move), Duration/2 s");
}

#[test]
fn test_conversion_keeps_unknown_tags() {
    let schema = test_schema();
    let (converted, issues) = convert_hed_string(&schema, "Blorp, Chair", TagForm::Long);
    assert_eq!(converted, "Blorp, Item/Object/Furnishing/Chair");
    assert_eq!(codes(&issues), vec![ErrorCode::NoValidTagFound]);
}

#[test]
fn test_duplicate_schema_refuses_to_resolve() {
    let schema = HedSchema::from_json_str(DUPLICATE_SCHEMA).unwrap();
    assert!(schema.has_duplicate_tags());
    let duplicates = schema.find_duplicate_tags();
    assert_eq!(
        duplicates.get("marker"),
        Some(&vec!["Event/Marker".to_string(), "Item/Marker".to_string()])
    );

    // Even names that are unambiguous are not resolved.
    let (converted, issues) = convert_hed_string(&schema, "Tool", TagForm::Long);
    assert_eq!(converted, "Tool");
    assert_eq!(codes(&issues), vec![ErrorCode::SchemaDuplicateNode]);

    assert_eq!(
        codes(&validate_hed_string(&schema, "Tool")),
        vec![ErrorCode::SchemaDuplicateNode]
    );
    assert!(matches!(
        HedValidator::new(&schema, ValidatorConfig::default()),
        Err(HedError::DuplicateTags { .. })
    ));
}
