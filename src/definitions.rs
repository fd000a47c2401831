//! Definitions: named tag groups declared with `Definition/Name` and referenced with
//! `Def/Name` or expanded in place as `(Def-expand/Name, (contents))`.
//!
//! A definition is a top-level group holding exactly one `Definition/Name` tag (or
//! `Definition/Name/#` when it takes a value) and at most one inner group, its contents. A
//! [`DefinitionDict`] is gathered once from a set of annotation strings and is read-only
//! afterwards; validation then checks every `Def` and `Def-expand` against it.

use petgraph::graph::NodeIndex;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{
    issues::{format_issue, ErrorCode, Issue, IssueParams},
    schema::HedSchema,
    span::Span,
    strings::{HedGroup, HedString},
    tags::HedTag,
};

pub const DEFINITION_TAG: &str = "Definition";
pub const DEF_TAG: &str = "Def";
pub const DEF_EXPAND_TAG: &str = "Def-expand";

/// Schema nodes of the three definition-related terms, when the schema has them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefinitionTags {
    definition: Option<NodeIndex>,
    def: Option<NodeIndex>,
    def_expand: Option<NodeIndex>,
}

impl DefinitionTags {
    pub fn from_schema(schema: &HedSchema) -> DefinitionTags {
        DefinitionTags {
            definition: schema.find_short(DEFINITION_TAG),
            def: schema.find_short(DEF_TAG),
            def_expand: schema.find_short(DEF_EXPAND_TAG),
        }
    }

    pub fn is_definition(&self, idx: NodeIndex) -> bool {
        self.definition == Some(idx)
    }

    pub fn is_def(&self, idx: NodeIndex) -> bool {
        self.def == Some(idx)
    }

    pub fn is_def_expand(&self, idx: NodeIndex) -> bool {
        self.def_expand == Some(idx)
    }

    fn tag_is<F: Fn(&Self, NodeIndex) -> bool>(&self, tag: &HedTag<'_>, check: F) -> bool {
        tag.entry().is_some_and(|idx| check(self, idx))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefinitionEntry {
    pub name: String,
    pub takes_value: bool,
    /// Long forms of the contents, `#` left in place.
    pub contents: Vec<String>,
    /// The contents group as written, parentheses included.
    pub contents_text: Option<String>,
}

impl DefinitionEntry {
    /// Case-folded, sorted long forms with the placeholder replaced by `value`.
    pub fn expected_tags(&self, value: Option<&str>) -> Vec<String> {
        let mut tags = self
            .contents
            .iter()
            .map(|tag| substitute(tag, value).to_ascii_lowercase())
            .collect::<Vec<String>>();
        tags.sort();
        tags
    }

    pub fn expanded_contents(&self, value: Option<&str>) -> Option<String> {
        self.contents_text
            .as_ref()
            .map(|text| substitute(text, value))
    }
}

fn substitute(text: &str, value: Option<&str>) -> String {
    match value {
        Some(value) => text.replace('#', value),
        None => text.to_string(),
    }
}

/// Split a `Def`/`Def-expand` extension into the definition name and optional value.
fn split_reference(extension: &str) -> (&str, Option<&str>) {
    match extension.split_once('/') {
        Some((name, value)) => (name, Some(value)),
        None => (extension, None),
    }
}

fn tag_list<'t, I: IntoIterator<Item = &'t str>>(tags: I) -> String {
    tags.into_iter().collect::<Vec<&str>>().join(", ")
}

/// Find the definition groups of a canonicalized string, check their structure, and return the
/// well-formed ones.
pub fn check_definition_groups(
    schema: &HedSchema,
    parsed: &HedString<'_>,
) -> (Vec<DefinitionEntry>, Vec<Issue>) {
    let special = DefinitionTags::from_schema(schema);
    let mut entries = Vec::new();
    let mut issues = Vec::new();
    if special.definition.is_none() {
        return (entries, issues);
    }
    let source = parsed.source();
    let is_definition = |tag: &&HedTag<'_>| special.tag_is(tag, DefinitionTags::is_definition);

    let placement = |tag: &HedTag<'_>| {
        format_issue(
            ErrorCode::DefinitionInvalidPlacement,
            &IssueParams::new().with("tag", tag.org_tag()),
        )
        .with_span(tag.span(), source)
    };
    for tag in parsed.top_level_tags().filter(is_definition) {
        issues.push(placement(tag));
    }
    for group in parsed.top_level_groups() {
        for nested in group.groups().flat_map(HedGroup::all_groups) {
            for tag in nested.tags().filter(is_definition) {
                issues.push(placement(tag));
            }
        }
    }

    for group in parsed.top_level_groups() {
        let definition_tags = group.tags().filter(is_definition).collect::<Vec<_>>();
        let Some(definition) = definition_tags.first() else {
            continue;
        };
        let extension = definition.extension();
        let (name, takes_value) = match extension.strip_suffix("/#") {
            Some(name) => (name, true),
            None => (extension, false),
        };
        let group_issue = |code: ErrorCode, params: IssueParams| {
            format_issue(code, &params.with("def_name", name)).with_span(group.span, source)
        };

        let direct = group.tags().collect::<Vec<_>>();
        if direct.len() > 1 {
            issues.push(group_issue(
                ErrorCode::DefinitionWrongNumberDefTags,
                IssueParams::new().with("tag_list", tag_list(direct.iter().map(|t| t.org_tag()))),
            ));
            continue;
        }

        let inner = group.groups().collect::<Vec<_>>();
        if inner.len() > 1 {
            issues.push(group_issue(
                ErrorCode::DefinitionWrongNumberGroupTags,
                IssueParams::new().with(
                    "tag_list",
                    tag_list(inner.iter().map(|g| g.span.slice(source))),
                ),
            ));
            continue;
        }

        let contents = inner.first().map(|g| g.all_tags()).unwrap_or_default();
        let references = contents
            .iter()
            .filter(|tag| {
                special.tag_is(tag, DefinitionTags::is_def)
                    || special.tag_is(tag, DefinitionTags::is_def_expand)
            })
            .map(|tag| tag.org_tag())
            .collect::<Vec<_>>();
        if !references.is_empty() {
            issues.push(group_issue(
                ErrorCode::DefinitionDefTagInDefinition,
                IssueParams::new().with("tag_list", tag_list(references)),
            ));
            continue;
        }

        let placeholders = contents
            .iter()
            .filter(|tag| tag.org_tag().contains('#'))
            .collect::<Vec<_>>();
        let placeholder_count = placeholders
            .iter()
            .map(|tag| tag.org_tag().matches('#').count())
            .sum::<usize>();
        let expected_count = usize::from(takes_value);
        if placeholder_count != expected_count {
            issues.push(group_issue(
                ErrorCode::DefinitionWrongNumberPlaceholderTags,
                IssueParams::new()
                    .with("expected_count", expected_count)
                    .with(
                        "tag_list",
                        tag_list(placeholders.iter().map(|t| t.org_tag())),
                    ),
            ));
            continue;
        }

        if name.is_empty() {
            continue;
        }
        entries.push(DefinitionEntry {
            name: name.to_string(),
            takes_value,
            contents: contents.iter().map(|t| t.long_tag().to_string()).collect(),
            contents_text: inner.first().map(|g| g.span.slice(source).to_string()),
        });
    }
    (entries, issues)
}

/// Case-insensitive name -> definition.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DefinitionDict {
    entries: BTreeMap<String, DefinitionEntry>,
}

impl DefinitionDict {
    /// Gather every definition declared in `strings`. Malformed definitions, duplicates and
    /// names that collide with schema terms are reported and left out.
    pub fn gather<S: AsRef<str>>(
        schema: &HedSchema,
        strings: &[S],
    ) -> (DefinitionDict, Vec<Issue>) {
        DefinitionDict::gather_from(schema, strings.iter().map(|s| (None, s.as_ref())))
    }

    /// Like [`DefinitionDict::gather`], tagging each issue with the sidecar key its string came
    /// from.
    pub fn gather_keyed<K: AsRef<str>, S: AsRef<str>>(
        schema: &HedSchema,
        strings: &[(K, S)],
    ) -> (DefinitionDict, Vec<Issue>) {
        DefinitionDict::gather_from(
            schema,
            strings
                .iter()
                .map(|(key, s)| (Some(key.as_ref()), s.as_ref())),
        )
    }

    fn gather_from<'k, I>(schema: &HedSchema, strings: I) -> (DefinitionDict, Vec<Issue>)
    where
        I: Iterator<Item = (Option<&'k str>, &'k str)>,
    {
        let mut dict = DefinitionDict::default();
        let mut issues = Vec::new();
        for (key, hed_string) in strings {
            let (parsed, _) = HedString::parse(hed_string).canonicalize(schema);
            let (entries, structure) = check_definition_groups(schema, &parsed);
            let mut found = structure;
            for entry in entries {
                if let Some(issue) = dict.insert(schema, entry) {
                    found.push(issue);
                }
            }
            issues.extend(found.into_iter().map(|issue| match key {
                Some(key) => issue.for_sidecar_key(key),
                None => issue,
            }));
        }
        tracing::debug!(
            "[DefinitionDict::gather] {} definitions, {} issues",
            dict.len(),
            issues.len()
        );
        (dict, issues)
    }

    fn insert(&mut self, schema: &HedSchema, entry: DefinitionEntry) -> Option<Issue> {
        let params = IssueParams::new().with("def_name", &entry.name);
        if schema.short_names().contains(&entry.name) {
            return Some(format_issue(ErrorCode::DefinitionTagInSchema, &params));
        }
        let key = entry.name.to_ascii_lowercase();
        if self.entries.contains_key(&key) {
            return Some(format_issue(ErrorCode::DefinitionDuplicate, &params));
        }
        self.entries.insert(key, entry);
        None
    }

    pub fn get(&self, name: &str) -> Option<&DefinitionEntry> {
        self.entries.get(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = &DefinitionEntry> {
        self.entries.values()
    }

    /// Look up the definition a `Def`/`Def-expand` tag names and check its value.
    fn reference<'d>(
        &'d self,
        tag: &HedTag<'_>,
        source: &str,
    ) -> Result<Option<(&'d DefinitionEntry, Option<String>)>, Issue> {
        let extension = tag.extension();
        if extension.is_empty() {
            return Ok(None);
        }
        let (name, value) = split_reference(extension);
        let issue = |code: ErrorCode| {
            format_issue(
                code,
                &IssueParams::new()
                    .with("tag", tag.org_tag())
                    .with("def_name", name),
            )
            .with_span(tag.span(), source)
        };
        let Some(entry) = self.get(name) else {
            return Err(issue(ErrorCode::DefUnmatched));
        };
        match (entry.takes_value, value) {
            (true, None) => Err(issue(ErrorCode::DefValueMissing)),
            (false, Some(_)) => Err(issue(ErrorCode::DefValueExtra)),
            (_, value) => Ok(Some((entry, value.map(str::to_string)))),
        }
    }

    /// Check every `Def` and `Def-expand` in a canonicalized string. Tags inside definition
    /// groups are left to the structure checks.
    pub fn check_references(&self, schema: &HedSchema, parsed: &HedString<'_>) -> Vec<Issue> {
        let special = DefinitionTags::from_schema(schema);
        let source = parsed.source();
        let definition_spans = parsed
            .top_level_groups()
            .filter(|group| {
                group
                    .tags()
                    .any(|tag| special.tag_is(tag, DefinitionTags::is_definition))
            })
            .map(|group| group.span)
            .collect::<Vec<Span>>();
        let in_definition =
            |tag: &HedTag<'_>| definition_spans.iter().any(|span| span.contains(&tag.span()));

        let mut issues = Vec::new();
        for (depth, group) in groups_with_depth(parsed.root(), 0) {
            for tag in group.tags() {
                if in_definition(tag) {
                    continue;
                }
                let is_def = special.tag_is(tag, DefinitionTags::is_def);
                let is_expand = special.tag_is(tag, DefinitionTags::is_def_expand);
                if !is_def && !is_expand {
                    continue;
                }
                let (entry, value) = match self.reference(tag, source) {
                    Ok(Some(found)) => found,
                    Ok(None) => continue,
                    Err(issue) => {
                        issues.push(issue);
                        continue;
                    }
                };
                if is_expand && depth > 0 {
                    let mut found = group
                        .groups()
                        .flat_map(|g| g.all_tags())
                        .map(|t| t.long_tag().to_ascii_lowercase())
                        .collect::<Vec<String>>();
                    found.sort();
                    let expected = entry.expected_tags(value.as_deref());
                    if found != expected {
                        issues.push(
                            format_issue(
                                ErrorCode::DefExpandInvalid,
                                &IssueParams::new()
                                    .with("def_name", &entry.name)
                                    .with("expected", expected.join(","))
                                    .with("found", found.join(",")),
                            )
                            .with_span(group.span, source),
                        );
                    }
                }
            }
        }
        issues.sort_by_key(|issue| issue.span().map(|span| span.start));
        issues
    }

    /// Replace every known `Def/Name[/value]` with `(Def-expand/Name[/value], (contents))`.
    /// Anything that cannot be expanded is kept as written.
    pub fn expand_defs(&self, schema: &HedSchema, hed_string: &str) -> String {
        let special = DefinitionTags::from_schema(schema);
        let (parsed, _) = HedString::parse(hed_string).canonicalize(schema);
        parsed.rewrite(|tag| {
            if !special.tag_is(tag, DefinitionTags::is_def) {
                return tag.org_tag().to_string();
            }
            match self.reference(tag, hed_string) {
                Ok(Some((entry, value))) => match entry.expanded_contents(value.as_deref()) {
                    Some(contents) => {
                        format!("({DEF_EXPAND_TAG}/{}, {contents})", tag.extension())
                    }
                    None => format!("({DEF_EXPAND_TAG}/{})", tag.extension()),
                },
                _ => tag.org_tag().to_string(),
            }
        })
    }
}

fn groups_with_depth<'a, 's>(
    group: &'a HedGroup<'s>,
    depth: usize,
) -> Vec<(usize, &'a HedGroup<'s>)> {
    let mut out = vec![(depth, group)];
    for child in group.groups() {
        out.extend(groups_with_depth(child, depth + 1));
    }
    out
}
