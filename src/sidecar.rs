//! HED annotations in BIDS JSON sidecars.
//!
//! A sidecar maps column names to column descriptions. A description with a `HED` key is either
//! a value column (`"HED": "Label/#"`, one `#` standing for the cell value) or a categorical
//! column (`"HED": {"go": "...", "stop": "..."}`, no `#` at all).

use serde_json::{Map, Value};

use crate::{
    config::ValidatorConfig,
    definitions::{DefinitionDict, DefinitionTags},
    error::HedError,
    issues::{format_issue, ErrorCode, Issue, IssueParams},
    schema::HedSchema,
    span::Span,
    strings::HedString,
    validation::HedValidator,
};

pub const HED_KEY: &str = "HED";

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Placeholders outside definition groups. Definitions may declare their own `#` in any
/// column. A group is a definition only when one of its tags resolves to the schema's
/// `Definition` node.
fn pound_sign_count(schema: &HedSchema, hed: &str) -> usize {
    let special = DefinitionTags::from_schema(schema);
    let (parsed, _) = HedString::parse(hed).canonicalize(schema);
    let definitions = parsed
        .top_level_groups()
        .filter(|group| {
            group
                .tags()
                .any(|tag| tag.entry().is_some_and(|idx| special.is_definition(idx)))
        })
        .map(|group| group.span)
        .collect::<Vec<Span>>();
    hed.char_indices()
        .filter(|(index, c)| {
            *c == '#'
                && !definitions
                    .iter()
                    .any(|span| span.contains(&Span::new(*index, index + 1)))
        })
        .count()
}

/// One HED string from a sidecar together with the key it was found under
/// (`column` or `column.category`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidecarEntry {
    pub key: String,
    pub hed: String,
    pub is_value_column: bool,
}

/// Pull the HED strings out of a sidecar, reporting entries of the wrong shape.
pub fn extract_hed_strings(
    schema: &HedSchema,
    sidecar: &Map<String, Value>,
) -> (Vec<SidecarEntry>, Vec<Issue>) {
    let mut entries = Vec::new();
    let mut issues = Vec::new();
    for (column, description) in sidecar.iter() {
        let Some(hed) = description.as_object().and_then(|d| d.get(HED_KEY)) else {
            continue;
        };
        match hed {
            Value::String(hed) => {
                if hed.trim().is_empty() {
                    issues.push(blank(column));
                    continue;
                }
                let count = pound_sign_count(schema, hed);
                if count != 1 {
                    issues.push(
                        format_issue(
                            ErrorCode::SidecarInvalidPoundSignsValue,
                            &IssueParams::new().with("pound_sign_count", count),
                        )
                        .for_sidecar_key(column),
                    );
                    continue;
                }
                entries.push(SidecarEntry {
                    key: column.clone(),
                    hed: hed.clone(),
                    is_value_column: true,
                });
            }
            Value::Object(categories) => {
                for (category, hed) in categories.iter() {
                    let key = format!("{column}.{category}");
                    let Value::String(hed) = hed else {
                        issues.push(wrong_type("string", hed, &key));
                        continue;
                    };
                    if hed.trim().is_empty() {
                        issues.push(blank(&key));
                        continue;
                    }
                    let count = pound_sign_count(schema, hed);
                    if count != 0 {
                        issues.push(
                            format_issue(
                                ErrorCode::SidecarInvalidPoundSignsCategory,
                                &IssueParams::new().with("pound_sign_count", count),
                            )
                            .for_sidecar_key(key),
                        );
                        continue;
                    }
                    entries.push(SidecarEntry {
                        key,
                        hed: hed.clone(),
                        is_value_column: false,
                    });
                }
            }
            other => issues.push(wrong_type("string or object", other, column)),
        }
    }
    (entries, issues)
}

fn blank(key: &str) -> Issue {
    format_issue(
        ErrorCode::SidecarBlankHedString,
        &IssueParams::new().with("key", key),
    )
    .for_sidecar_key(key)
}

fn wrong_type(expected: &str, given: &Value, key: &str) -> Issue {
    format_issue(
        ErrorCode::SidecarWrongDataType,
        &IssueParams::new()
            .with("expected_type", expected)
            .with("given_type", type_name(given)),
    )
    .for_sidecar_key(key)
}

/// Validate every HED string in a sidecar. Definitions are gathered from the whole sidecar
/// before any string is checked, and placeholders are allowed. Malformed JSON is an error;
/// everything else is reported as issues.
pub fn validate_sidecar(
    validator: &HedValidator<'_>,
    json: &str,
) -> Result<Vec<Issue>, HedError> {
    let value: Value = serde_json::from_str(json)?;
    let sidecar = match value {
        Value::Object(sidecar) => sidecar,
        other => {
            return Err(HedError::Serialization(format!(
                "sidecar must be a JSON object, found {}",
                type_name(&other)
            )))
        }
    };

    let schema = validator.schema();
    let (entries, mut issues) = extract_hed_strings(schema, &sidecar);
    let keyed = entries
        .iter()
        .map(|entry| (entry.key.as_str(), entry.hed.as_str()))
        .collect::<Vec<_>>();
    let (definitions, definition_issues) = DefinitionDict::gather_keyed(schema, &keyed);
    // Structure problems are reported again when each string is validated below.
    issues.extend(definition_issues.into_iter().filter(|issue| {
        matches!(
            issue.code,
            ErrorCode::DefinitionDuplicate | ErrorCode::DefinitionTagInSchema
        )
    }));

    let config = ValidatorConfig {
        allow_placeholders: true,
        ..validator.config()
    };
    let definitions = match validator.definitions() {
        Some(external) => external,
        None => &definitions,
    };
    let fragment_validator = HedValidator::new(schema, config)?.with_definitions(definitions);
    for entry in entries.iter() {
        issues.extend(
            fragment_validator
                .validate_fragment(&entry.hed)
                .into_iter()
                .map(|issue| issue.for_sidecar_key(&entry.key)),
        );
    }
    tracing::debug!(
        "[validate_sidecar] {} HED strings, {} definitions, {} issues",
        entries.len(),
        definitions.len(),
        issues.len()
    );
    Ok(issues)
}
