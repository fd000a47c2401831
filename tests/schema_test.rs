//! Schema loading, the shared registry and schema-level checks.

mod common;

use common::*;
use hed_core::{
    issues::ErrorCode,
    schema::{check_compliance, load_schema, SCHEMAS},
    HedError, HedSchema, HedValidator,
};
use tempfile::TempDir;
use test_log::test;

#[test]
fn test_fixture_schemas_are_compliant() {
    let schema = test_schema();
    assert!(check_compliance(&schema).is_empty());
    assert!(!schema.has_duplicate_tags());

    let schema = load_schema(data_path("required_schema.toml")).unwrap();
    assert!(check_compliance(&schema).is_empty());
}

#[test]
fn test_registry_shares_loaded_schemas() {
    init_logging();
    let loaded = SCHEMAS.load_file(data_path("test_schema.json")).unwrap();
    let shared = SCHEMAS.get("8.3.0-test").unwrap();
    assert_eq!(loaded.version(), shared.version());
    assert!(SCHEMAS.versions().contains(&"8.3.0-test".to_string()));

    let validator = HedValidator::new(&shared, Default::default()).unwrap();
    assert!(validator.validate_string("Sensory-event").is_empty());
}

#[test]
fn test_compliance_reports_naming_problems() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        &temp_dir,
        "bad.json",
        r##"{
            "version": "bad",
            "tags": [
                {"name": "Event", "children": [{"name": "Marker"}, {"name": "lower"}]},
                {"name": "Item", "description": "Has a <tag>", "children": [
                    {"name": "Marker"},
                    {"name": "Size", "children": [{"name": "#", "unit_classes": ["volume"]}]}
                ]}
            ]
        }"##,
    );
    let schema = load_schema(&path).unwrap();
    let codes = check_compliance(&schema)
        .into_iter()
        .map(|issue| issue.code)
        .collect::<Vec<_>>();
    assert_eq!(
        codes,
        vec![
            ErrorCode::SchemaDuplicateNode,
            ErrorCode::SchemaInvalidCapitalization,
            ErrorCode::SchemaInvalidCharactersInDesc,
            ErrorCode::SchemaInvalidCharactersInDesc,
            ErrorCode::SchemaUnknownUnitClass,
        ]
    );
}

#[test]
fn test_load_failures() {
    let temp_dir = TempDir::new().unwrap();
    assert!(matches!(
        load_schema(temp_dir.path().join("missing.json")),
        Err(HedError::NotFound(_))
    ));

    let path = write_file(&temp_dir, "broken.json", "{\"version\": ");
    assert!(matches!(load_schema(&path), Err(HedError::Serialization(_))));

    let siblings = r#"{"version": "x", "tags": [{"name": "Event"}, {"name": "event"}]}"#;
    assert!(matches!(
        HedSchema::from_json_str(siblings),
        Err(HedError::SchemaLoad(_))
    ));
}
