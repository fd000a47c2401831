//! Schema-build checks: problems in the schema itself rather than in annotations.

use super::HedSchema;
use crate::issues::{format_issue, ErrorCode, Issue, IssueParams};

const ALLOWED_TAG_PUNCTUATION: &[char] = &['-', '_'];
const ALLOWED_DESC_PUNCTUATION: &[char] = &[
    '-', '_', ':', ';', ',', '.', '/', '(', ')', '+', ' ', '^', '\'',
];

fn tag_char_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALLOWED_TAG_PUNCTUATION.contains(&c)
}

fn desc_char_allowed(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALLOWED_DESC_PUNCTUATION.contains(&c)
}

/// Run every schema-level check. Duplicate terms come first, then per-node issues in
/// declaration order.
pub fn check_compliance(schema: &HedSchema) -> Vec<Issue> {
    let mut issues = schema.duplicate_issues();

    for idx in schema.nodes() {
        let entry = schema.entry(*idx);
        if entry.is_placeholder() {
            for unit_class in entry.unit_classes.iter() {
                if schema.unit_class(unit_class).is_none() {
                    issues.push(format_issue(
                        ErrorCode::SchemaUnknownUnitClass,
                        &IssueParams::new()
                            .with("tag", &entry.long_name)
                            .with("unit_class", unit_class),
                    ));
                }
            }
            continue;
        }

        for (index, c) in entry.name.char_indices() {
            if !tag_char_allowed(c) {
                issues.push(format_issue(
                    ErrorCode::SchemaInvalidCharactersInTag,
                    &IssueParams::new()
                        .with("tag", &entry.long_name)
                        .with("character", c)
                        .with("index", index),
                ));
            }
        }

        if let Some(first) = entry.name.chars().next() {
            if first.is_alphabetic() && !first.is_uppercase() {
                issues.push(format_issue(
                    ErrorCode::SchemaInvalidCapitalization,
                    &IssueParams::new().with("tag", &entry.long_name),
                ));
            }
        }

        if let Some(description) = entry.description.as_ref() {
            for (index, c) in description.char_indices() {
                if !desc_char_allowed(c) {
                    issues.push(format_issue(
                        ErrorCode::SchemaInvalidCharactersInDesc,
                        &IssueParams::new()
                            .with("tag", &entry.long_name)
                            .with("character", c)
                            .with("index", index),
                    ));
                }
            }
        }

        for unit_class in entry.unit_classes.iter() {
            if schema.unit_class(unit_class).is_none() {
                issues.push(format_issue(
                    ErrorCode::SchemaUnknownUnitClass,
                    &IssueParams::new()
                        .with("tag", &entry.long_name)
                        .with("unit_class", unit_class),
                ));
            }
        }
    }

    tracing::debug!(
        "[check_compliance] schema {}: {} issues",
        schema.version(),
        issues.len()
    );
    issues
}
