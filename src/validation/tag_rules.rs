//! Checks on individual resolved tags: required children, extensions, values and units,
//! capitalization, and top-level group placement.

use petgraph::graph::NodeIndex;

use crate::{
    definitions::DefinitionTags,
    issues::{format_issue, ErrorCode, Issue, IssueParams},
    schema::{HedSchema, TagAttribute, UnitClass, ValueClass},
    strings::{HedGroup, HedString},
    tags::HedTag,
};

struct TagContext<'v> {
    schema: &'v HedSchema,
    special: DefinitionTags,
    source: &'v str,
}

/// Run every tag-level rule over the tags of a canonicalized string. Unresolved tags were
/// already reported by the resolver and are skipped.
pub fn check_tags(
    schema: &HedSchema,
    parsed: &HedString<'_>,
    allow_placeholders: bool,
) -> Vec<Issue> {
    let context = TagContext {
        schema,
        special: DefinitionTags::from_schema(schema),
        source: parsed.source(),
    };
    let mut issues = Vec::new();
    walk(&context, parsed.root(), 0, allow_placeholders, &mut issues);
    issues
}

fn walk(
    context: &TagContext<'_>,
    group: &HedGroup<'_>,
    depth: usize,
    placeholders_ok: bool,
    issues: &mut Vec<Issue>,
) {
    // Placeholders are part of a definition's contents.
    let placeholders_ok = placeholders_ok
        || (depth == 1
            && group.tags().any(|tag| {
                tag.entry()
                    .is_some_and(|idx| context.special.is_definition(idx))
            }));
    for tag in group.tags() {
        if tag.is_resolved() {
            check_tag(context, tag, depth == 1, placeholders_ok, issues);
        }
    }
    for child in group.groups() {
        walk(context, child, depth + 1, placeholders_ok, issues);
    }
}

fn check_tag(
    context: &TagContext<'_>,
    tag: &HedTag<'_>,
    in_top_level_group: bool,
    placeholders_ok: bool,
    issues: &mut Vec<Issue>,
) {
    let Some(idx) = tag.entry() else {
        return;
    };
    let schema = context.schema;
    let entry = schema.entry(idx);
    let mut push = |code: ErrorCode, params: IssueParams| {
        issues.push(format_issue(code, &params).with_span(tag.span(), context.source));
    };

    if !is_capitalized(tag.org_base_tag()) {
        push(
            ErrorCode::CapitalizationWarning,
            IssueParams::new().with("tag", tag.org_tag()),
        );
    }

    let extension = tag.extension();
    let is_definition = context.special.is_definition(idx);
    if extension.is_empty() {
        if entry.has_attribute(TagAttribute::RequireChild) {
            push(
                ErrorCode::TagRequiresChild,
                IssueParams::new().with("tag", tag.org_tag()),
            );
        }
    } else if extension.contains('#') && !placeholders_ok && !is_definition {
        push(
            ErrorCode::PlaceholderInvalid,
            IssueParams::new().with("tag", tag.org_tag()),
        );
    } else if let Some(value_node) = schema.takes_value_child(idx) {
        if !is_definition {
            check_value(schema, value_node, tag, extension, &mut push);
        }
    } else if schema.extension_allowed(idx) {
        push(
            ErrorCode::TagExtended,
            IssueParams::new()
                .with("tag", tag.org_tag())
                .with("extension", extension),
        );
    } else {
        push(
            ErrorCode::TagExtensionInvalid,
            IssueParams::new()
                .with("tag", tag.org_tag())
                .with("extension", extension),
        );
    }

    if entry.has_attribute(TagAttribute::TopLevelTagGroup)
        && !in_top_level_group
        && !is_definition
    {
        push(
            ErrorCode::TagGroupError,
            IssueParams::new().with("tag", tag.org_tag()),
        );
    }
}

fn check_value<F>(
    schema: &HedSchema,
    value_node: NodeIndex,
    tag: &HedTag<'_>,
    value: &str,
    push: &mut F,
) where
    F: FnMut(ErrorCode, IssueParams),
{
    let placeholder = schema.entry(value_node);
    let unit_classes = placeholder
        .unit_classes
        .iter()
        .filter_map(|name| schema.unit_class(name))
        .collect::<Vec<&UnitClass>>();
    let value_classes = if placeholder.value_classes.is_empty() {
        if unit_classes.is_empty() {
            vec![ValueClass::Text]
        } else {
            vec![ValueClass::Numeric]
        }
    } else {
        placeholder.value_classes.clone()
    };
    let value_ok = |v: &str| v == "#" || value_classes.iter().any(|class| class.validate(v));
    let invalid_value = |v: &str| {
        IssueParams::new()
            .with("tag", tag.org_tag())
            .with("value", v)
    };

    if unit_classes.is_empty() {
        if !value_ok(value.trim()) {
            push(ErrorCode::ValueInvalid, invalid_value(value));
        }
        return;
    }

    if let Some(stripped) = unit_classes.iter().find_map(|class| class.strip_units(value)) {
        if !value_ok(stripped) {
            push(ErrorCode::ValueInvalid, invalid_value(stripped));
        }
        return;
    }

    if value_ok(value.trim()) {
        if let Some(default_unit) = unit_classes.iter().find_map(|class| class.default_units()) {
            push(
                ErrorCode::UnitClassDefaultUsed,
                IssueParams::new()
                    .with("tag", tag.org_tag())
                    .with("default_unit", default_unit),
            );
        }
        return;
    }

    let units = unit_classes
        .iter()
        .flat_map(|class| class.units().iter().map(|unit| unit.name.as_str()))
        .collect::<Vec<&str>>()
        .join(",");
    push(
        ErrorCode::UnitsInvalid,
        IssueParams::new()
            .with("tag", tag.org_tag())
            .with("units", units),
    );
}

/// Every written node name starts with a capital letter, or is written in a mixed-case or
/// hyphenated style that is left alone.
fn is_capitalized(base: &str) -> bool {
    base.split('/').all(|segment| {
        let segment = segment.trim();
        let Some(first) = segment.chars().next() else {
            return true;
        };
        segment.chars().any(|c| c.is_ascii_uppercase() || c == '-') || !first.is_lowercase()
    })
}
