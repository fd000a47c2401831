//! Rules that look at more than one tag: repeats within a group, unique and required schema
//! terms across a whole annotation.

use std::collections::BTreeSet;

use crate::{
    issues::{format_issue, ErrorCode, Issue, IssueParams},
    schema::{HedSchema, TagAttribute},
    strings::{HedGroup, HedString},
    tags::HedTag,
};

/// Whether `tag` is the schema term `prefix` or one of its descendants.
fn has_prefix(tag: &HedTag<'_>, prefix: &str) -> bool {
    let long = tag.long_tag();
    long.len() >= prefix.len()
        && long.is_char_boundary(prefix.len())
        && long[..prefix.len()].eq_ignore_ascii_case(prefix)
        && (long.len() == prefix.len() || long.as_bytes()[prefix.len()] == b'/')
}

/// Report every tag written again at the same level of the same group.
pub fn check_repeated_tags(parsed: &HedString<'_>) -> Vec<Issue> {
    let mut issues = Vec::new();
    for group in parsed.root().all_groups() {
        check_group_repeats(group, parsed.source(), &mut issues);
    }
    issues.sort_by_key(|issue| issue.span().map(|span| span.start));
    issues
}

fn check_group_repeats(group: &HedGroup<'_>, source: &str, issues: &mut Vec<Issue>) {
    let mut seen = BTreeSet::new();
    for tag in group.tags() {
        if !seen.insert(tag.lowered_long()) {
            issues.push(
                format_issue(
                    ErrorCode::TagDuplicated,
                    &IssueParams::new().with("tag", tag.org_tag()),
                )
                .with_span(tag.span(), source),
            );
        }
    }
}

/// Schema terms marked unique may be used at most once per annotation.
pub fn check_unique_tags(schema: &HedSchema, tags: &[&HedTag<'_>]) -> Vec<Issue> {
    schema
        .tags_with_attribute(TagAttribute::Unique)
        .into_iter()
        .filter_map(|idx| {
            let prefix = &schema.entry(idx).long_name;
            let count = tags.iter().filter(|tag| has_prefix(tag, prefix)).count();
            (count > 1).then(|| {
                format_issue(
                    ErrorCode::TagNotUnique,
                    &IssueParams::new().with("tag_prefix", prefix),
                )
            })
        })
        .collect()
}

/// Schema terms marked required must appear somewhere in the annotation.
pub fn check_required_tags(schema: &HedSchema, tags: &[&HedTag<'_>]) -> Vec<Issue> {
    schema
        .tags_with_attribute(TagAttribute::Required)
        .into_iter()
        .filter_map(|idx| {
            let prefix = &schema.entry(idx).long_name;
            (!tags.iter().any(|tag| has_prefix(tag, prefix))).then(|| {
                format_issue(
                    ErrorCode::RequiredPrefixMissing,
                    &IssueParams::new().with("tag_prefix", prefix),
                )
            })
        })
        .collect()
}
