//! Whole-annotation validation through the public API.

mod common;

use common::*;
use hed_core::{
    config::{ColumnPrefix, ConfigProvider, HedConfig, TomlConfigProvider, ValidatorConfig},
    issues::{has_errors, ErrorCode, IssueContext},
    schema::load_schema,
    strings::{convert_hed_string, TagForm},
    validate_hed_string, HedValidator,
};
use tempfile::TempDir;
use test_log::test;

#[test]
fn test_every_problem_is_reported() {
    let schema = test_schema();
    let hed = "Sensory-event,, Blorp, (Onset, Label), Move/Fast ~ Duration/3 fortnight";
    let issues = validate_hed_string(&schema, hed);
    let codes = issues.iter().map(|i| i.code.clone()).collect::<Vec<_>>();
    assert_eq!(
        codes,
        vec![
            ErrorCode::TagEmpty,
            ErrorCode::TildesUnsupported,
            ErrorCode::NoValidTagFound,
            ErrorCode::TagExtensionInvalid,
            ErrorCode::UnitsInvalid,
            ErrorCode::TagRequiresChild,
        ]
    );
    assert!(has_errors(&issues));

    let blorp = issues
        .iter()
        .find(|i| i.code == ErrorCode::NoValidTagFound)
        .unwrap();
    match &blorp.context {
        IssueContext::Span { span, text } => {
            assert_eq!(text, "Blorp");
            assert_eq!(span.slice(hed), "Blorp");
        }
        other => panic!("unexpected context {other:?}"),
    }
}

#[test]
fn test_toml_schema_with_required_terms() {
    init_logging();
    let schema = load_schema(data_path("required_schema.toml")).unwrap();
    assert_eq!(schema.version(), "8.3.0-required");

    let issues = validate_hed_string(&schema, "Label/Go");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, ErrorCode::RequiredPrefixMissing);
    assert!(!has_errors(&issues));

    assert!(validate_hed_string(&schema, "Sensory-event, Label/Go").is_empty());
    assert!(validate_hed_string(&schema, "Event/Agent-action, Duration/2 s").is_empty());
}

#[test]
fn test_required_terms_span_a_row() {
    init_logging();
    let schema = load_schema(data_path("required_schema.toml")).unwrap();
    let validator = HedValidator::new(&schema, ValidatorConfig::default()).unwrap();

    // Neither cell has an Event on its own; the row does.
    let prefixes = vec![ColumnPrefix {
        column: 1,
        prefix: "Label/".to_string(),
    }];
    assert!(validator
        .validate_row(1, &["Sensory-event", "Go"], &prefixes)
        .is_empty());

    let issues = validator.validate_row(2, &["", "Go"], &prefixes);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, ErrorCode::RequiredPrefixMissing);
    assert_eq!(
        issues[0].context,
        IssueContext::RowColumn {
            row: Some(2),
            column: None,
            span: None,
        }
    );
    assert!(issues[0].message.starts_with("Issue in row 2: "));
}

#[test]
fn test_config_file_drives_the_validator() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_file(
        &temp_dir,
        "hed.toml",
        &format!(
            "schema = {:?}\n\n[validation]\ncheck_for_warnings = false\n\n\
             [[column_prefixes]]\ncolumn = 0\nprefix = \"Label/\"\n",
            data_path("test_schema.json")
        ),
    );
    let config: HedConfig = TomlConfigProvider::new(path).load().unwrap();
    let schema = load_schema(config.schema.as_ref().unwrap()).unwrap();
    let validator = HedValidator::new(&schema, config.validation).unwrap();

    assert!(validator
        .validate_row(1, &["Go", "chair"], &config.column_prefixes)
        .is_empty());
    assert_eq!(
        validator
            .validate_row(1, &["Go", "Move/Fast"], &config.column_prefixes)
            .len(),
        1
    );
}

#[test]
fn test_long_short_round_trip_preserves_layout() {
    let schema = test_schema();
    let written = "Sensory-event,(Chair,  (Move)) ,Duration/3 ms";
    let (long, issues) = convert_hed_string(&schema, written, TagForm::Long);
    assert!(issues.is_empty());
    assert_eq!(
        long,
        "Event/Sensory-event,(Item/Object/Furnishing/Chair,  (Action/Move)) ,\
         Property/Temporal-property/Duration/3 ms"
    );
    let (short, _) = convert_hed_string(&schema, &long, TagForm::Short);
    assert_eq!(short, written);
}

#[test]
fn test_tsv_issues_keep_row_and_column() {
    let schema = test_schema();
    let validator = HedValidator::new(&schema, ValidatorConfig::default()).unwrap();
    let prefixes = vec![ColumnPrefix {
        column: 2,
        prefix: "Label/".to_string(),
    }];
    let tsv = "onset\tHED\ttrial_type\n\
               1.0\tSensory-event\tGo\n\
               2.0\tSensory-event, Blorp\tn/a\n\
               3.0\tn/a\tn/a\n";

    let issues = validator.validate_tsv(tsv, &prefixes);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].code, ErrorCode::NoValidTagFound);
    match &issues[0].context {
        IssueContext::RowColumn {
            row: Some(3),
            column: Some(1),
            span: Some(span),
        } => assert_eq!(span.slice("Sensory-event, Blorp"), "Blorp"),
        other => panic!("unexpected context {other:?}"),
    }
    assert!(issues[0].message.starts_with("Issue in row 3, column 1: "));

    assert!(validator.validate_tsv("", &prefixes).is_empty());
}
