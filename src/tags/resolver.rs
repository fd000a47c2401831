//! Short/long form resolution of a single tag against a schema.

use crate::{
    issues::{format_issue, ErrorCode, Issue, IssueParams},
    schema::HedSchema,
    span::Span,
    tags::{CanonicalForm, RawTag},
};

/// Byte spans of the slash-separated segments of `text`.
fn segments(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start = 0;
    for (i, c) in text.char_indices() {
        if c == '/' {
            spans.push(Span::new(start, i));
            start = i + 1;
        }
    }
    spans.push(Span::new(start, text.len()));
    spans
}

/// Whether `written` (already case-folded) names `long` or a trailing part of it that starts
/// at a segment boundary.
fn is_path_suffix(long: &str, written: &str) -> bool {
    if !long.ends_with(written) {
        return false;
    }
    let cut = long.len() - written.len();
    cut == 0 || long.as_bytes()[cut - 1] == b'/'
}

impl HedSchema {
    /// Resolve a written tag to its long form.
    ///
    /// Segments are read left to right. Known names extend the base tag as long as what has
    /// been written so far is a trailing part of that node's long name. The first unknown
    /// segment starts the extension, and once the base takes a value everything after it is
    /// the value. A schema term appearing inside an extension is rejected.
    pub fn resolve(&self, raw: &RawTag<'_>) -> Result<CanonicalForm, Vec<Issue>> {
        if self.has_duplicate_tags() {
            return Err(self.duplicate_issues());
        }

        let text = raw.text();
        let lowered = text.to_ascii_lowercase();
        let issue_at = |code: ErrorCode, params: IssueParams, span: Span| {
            vec![format_issue(code, &params).with_span(span.offset(raw.span.start), raw.source)]
        };

        let spans = segments(text);
        if spans.iter().any(|s| s.slice(text).trim().is_empty()) {
            return Err(issue_at(
                ErrorCode::NodeNameEmpty,
                IssueParams::new().with("tag", text),
                Span::new(0, text.len()),
            ));
        }

        let mut base = None;
        let mut in_extension = false;
        for (position, span) in spans.iter().enumerate() {
            if let Some((node, _)) = base {
                if self.takes_value_child(node).is_some() {
                    break;
                }
            }
            let name = span.slice(text).trim();
            let Some(idx) = self.find_short(name) else {
                if base.is_none() {
                    return Err(self.unknown_base(text, &spans[position + 1..], issue_at));
                }
                in_extension = true;
                continue;
            };

            let entry = self.entry(idx);
            let written = &lowered[..span.end];
            if in_extension || !is_path_suffix(&entry.long_name.to_ascii_lowercase(), written) {
                return Err(issue_at(
                    ErrorCode::InvalidParentNode,
                    IssueParams::new()
                        .with("tag", name)
                        .with("expected_parent", &entry.long_name),
                    *span,
                ));
            }
            base = Some((idx, span.end));
        }

        let Some((idx, end)) = base else {
            return Err(issue_at(
                ErrorCode::NoValidTagFound,
                IssueParams::new().with("tag", text),
                Span::new(0, text.len()),
            ));
        };
        let entry = self.entry(idx);
        let long_tag = format!("{}{}", entry.long_name, &text[end..]);
        let extension_index = if end < text.len() {
            entry.long_name.len() + 1
        } else {
            long_tag.len()
        };
        Ok(CanonicalForm {
            short_tag_index: entry.long_name.len() - entry.name.len(),
            extension_index,
            entry: idx,
            long_tag,
        })
    }

    /// The first segment is not a schema term. If a later one is, the written parents are
    /// wrong; otherwise nothing in the tag is known.
    fn unknown_base<F>(&self, text: &str, rest: &[Span], issue_at: F) -> Vec<Issue>
    where
        F: Fn(ErrorCode, IssueParams, Span) -> Vec<Issue>,
    {
        for span in rest {
            let name = span.slice(text).trim();
            if let Some(idx) = self.find_short(name) {
                return issue_at(
                    ErrorCode::InvalidParentNode,
                    IssueParams::new()
                        .with("tag", name)
                        .with("expected_parent", &self.entry(idx).long_name),
                    *span,
                );
            }
        }
        let first = rest
            .first()
            .map(|span| Span::new(0, span.start.saturating_sub(1)))
            .unwrap_or_else(|| Span::new(0, text.len()));
        issue_at(
            ErrorCode::NoValidTagFound,
            IssueParams::new().with("tag", first.slice(text)),
            first,
        )
    }

    /// Long form of a single tag. On failure the trimmed input is returned with the issues.
    pub fn convert_to_long(&self, tag: &str) -> (String, Vec<Issue>) {
        let raw = trimmed(tag);
        match self.resolve(&raw) {
            Ok(form) => (form.long_tag, Vec::new()),
            Err(issues) => (raw.text().to_string(), issues),
        }
    }

    /// Short form of a single tag. On failure the trimmed input is returned with the issues.
    pub fn convert_to_short(&self, tag: &str) -> (String, Vec<Issue>) {
        let raw = trimmed(tag);
        match self.resolve(&raw) {
            Ok(form) => (form.short_tag().to_string(), Vec::new()),
            Err(issues) => (raw.text().to_string(), issues),
        }
    }
}

fn trimmed(tag: &str) -> RawTag<'_> {
    let start = tag.len() - tag.trim_start().len();
    let end = tag.trim_end().len().max(start);
    RawTag::new(tag, Span::new(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        schema::{SchemaEntry, TagAttribute, ValueClass},
        tags::HedTag,
    };

    fn schema() -> HedSchema {
        let mut builder = HedSchema::builder("resolver");
        let event = builder.add_tag(None, SchemaEntry::new("Event")).unwrap();
        builder
            .add_tag(Some(event), SchemaEntry::new("Sensory-event"))
            .unwrap();
        let item = builder
            .add_tag(
                None,
                SchemaEntry::new("Item").with_attribute(TagAttribute::ExtensionAllowed),
            )
            .unwrap();
        builder.add_tag(Some(item), SchemaEntry::new("Object")).unwrap();
        let property = builder.add_tag(None, SchemaEntry::new("Property")).unwrap();
        let duration = builder
            .add_tag(Some(property), SchemaEntry::new("Duration"))
            .unwrap();
        builder
            .add_tag(
                Some(duration),
                SchemaEntry::new("#")
                    .with_unit_class("time")
                    .with_value_class(ValueClass::Numeric),
            )
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_short_to_long() {
        let schema = schema();
        assert_eq!(
            schema.convert_to_long("Sensory-event"),
            ("Event/Sensory-event".to_string(), vec![])
        );
        assert_eq!(
            schema.convert_to_long(" object/Chair "),
            ("Item/Object/Chair".to_string(), vec![])
        );
        assert_eq!(
            schema.convert_to_long("Duration/3 ms").0,
            "Property/Duration/3 ms"
        );
        assert_eq!(
            schema.convert_to_short("Property/Duration/3 ms").0,
            "Duration/3 ms"
        );
    }

    #[test]
    fn test_long_forms_are_idempotent() {
        let schema = schema();
        for idx in schema.nodes() {
            let entry = schema.entry(*idx);
            if entry.is_placeholder() {
                continue;
            }
            let (long, issues) = schema.convert_to_long(&entry.long_name);
            assert!(issues.is_empty(), "{}", entry.long_name);
            assert_eq!(long, entry.long_name);
            assert_eq!(schema.convert_to_short(&entry.long_name).0, entry.name);
        }
    }

    #[test]
    fn test_split_points() {
        let schema = schema();
        let source = "x, Object/Chair/Leg";
        let raw = RawTag::new(source, Span::new(3, source.len()));
        let (tag, issues) = HedTag::unresolved(raw).resolve(&schema);
        assert!(issues.is_empty());
        assert_eq!(tag.long_tag(), "Item/Object/Chair/Leg");
        assert_eq!(tag.short_tag(), "Object/Chair/Leg");
        assert_eq!(tag.base_tag(), "Item/Object");
        assert_eq!(tag.short_base_tag(), "Object");
        assert_eq!(tag.org_base_tag(), "Object");
        assert_eq!(tag.extension(), "Chair/Leg");

        let (again, issues) = tag.clone().resolve(&schema);
        assert!(issues.is_empty());
        assert_eq!(again, tag);
    }

    #[test]
    fn test_resolution_failures() {
        let schema = schema();
        let (text, issues) = schema.convert_to_long("Nothing/Here");
        assert_eq!(text, "Nothing/Here");
        assert_eq!(issues[0].code, ErrorCode::NoValidTagFound);
        assert_eq!(issues[0].span(), Some(Span::new(0, 7)));

        let (_, issues) = schema.convert_to_long("Event/Object");
        assert_eq!(issues[0].code, ErrorCode::InvalidParentNode);
        assert_eq!(issues[0].span(), Some(Span::new(6, 12)));

        let (_, issues) = schema.convert_to_long("Wrong/Sensory-event");
        assert_eq!(issues[0].code, ErrorCode::InvalidParentNode);

        let (_, issues) = schema.convert_to_long("Object/Chair/Event");
        assert_eq!(issues[0].code, ErrorCode::InvalidParentNode);

        let (_, issues) = schema.convert_to_long("Event//Sensory-event");
        assert_eq!(issues[0].code, ErrorCode::NodeNameEmpty);
    }

    #[test]
    fn test_values_may_contain_schema_terms() {
        let schema = schema();
        let (long, issues) = schema.convert_to_long("Duration/Event");
        assert!(issues.is_empty());
        assert_eq!(long, "Property/Duration/Event");
    }

    #[test]
    fn test_failed_tag_falls_back_to_raw_text() {
        let schema = schema();
        let (tag, issues) = HedTag::unresolved(RawTag::whole("Bogus/Thing")).resolve(&schema);
        assert_eq!(issues.len(), 1);
        assert!(!tag.is_resolved());
        assert_eq!(tag.long_tag(), "Bogus/Thing");
        assert_eq!(tag.base_tag(), "Bogus/Thing");
        assert_eq!(tag.extension(), "");
    }

    #[test]
    fn test_duplicate_schema_short_circuits() {
        let mut builder = HedSchema::builder("dup");
        let a = builder.add_tag(None, SchemaEntry::new("A")).unwrap();
        let b = builder.add_tag(None, SchemaEntry::new("B")).unwrap();
        builder.add_tag(Some(a), SchemaEntry::new("Foo")).unwrap();
        builder.add_tag(Some(b), SchemaEntry::new("Foo")).unwrap();
        let schema = builder.build();

        let (text, issues) = schema.convert_to_long("A");
        assert_eq!(text, "A");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ErrorCode::SchemaDuplicateNode);
    }
}
