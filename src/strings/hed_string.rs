//! Annotation strings as a tree of tags and parenthesized groups.

use crate::{
    issues::Issue,
    schema::HedSchema,
    span::Span,
    strings::tokenizer::{split_hed_string, CLOSING_GROUP, OPENING_GROUP},
    tags::{HedTag, RawTag},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HedNode<'s> {
    Tag(HedTag<'s>),
    Group(HedGroup<'s>),
}

/// A parenthesized group. The root group of a string spans the whole string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HedGroup<'s> {
    pub span: Span,
    pub children: Vec<HedNode<'s>>,
}

impl<'s> HedGroup<'s> {
    fn new(start: usize) -> HedGroup<'s> {
        HedGroup {
            span: Span::new(start, start),
            children: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Tags directly inside this group.
    pub fn tags(&self) -> impl Iterator<Item = &HedTag<'s>> {
        self.children.iter().filter_map(|node| match node {
            HedNode::Tag(tag) => Some(tag),
            HedNode::Group(_) => None,
        })
    }

    /// Groups directly inside this group.
    pub fn groups(&self) -> impl Iterator<Item = &HedGroup<'s>> {
        self.children.iter().filter_map(|node| match node {
            HedNode::Group(group) => Some(group),
            HedNode::Tag(_) => None,
        })
    }

    /// Every tag in this group and its subgroups, in written order.
    pub fn all_tags(&self) -> Vec<&HedTag<'s>> {
        let mut tags = Vec::new();
        collect_tags(self, &mut tags);
        tags
    }

    /// This group and every group below it, pre-order.
    pub fn all_groups(&self) -> Vec<&HedGroup<'s>> {
        let mut groups = vec![self];
        let mut index = 0;
        while index < groups.len() {
            let current = groups[index];
            let position = index + 1;
            for (offset, child) in current.groups().enumerate() {
                groups.insert(position + offset, child);
            }
            index += 1;
        }
        groups
    }

    fn resolve(self, schema: &HedSchema, issues: &mut Vec<Issue>) -> HedGroup<'s> {
        let children = self
            .children
            .into_iter()
            .map(|node| match node {
                HedNode::Tag(tag) => {
                    let (tag, tag_issues) = tag.resolve(schema);
                    issues.extend(tag_issues);
                    HedNode::Tag(tag)
                }
                HedNode::Group(group) => HedNode::Group(group.resolve(schema, issues)),
            })
            .collect();
        HedGroup {
            span: self.span,
            children,
        }
    }
}

fn collect_tags<'a, 's>(group: &'a HedGroup<'s>, out: &mut Vec<&'a HedTag<'s>>) {
    for node in group.children.iter() {
        match node {
            HedNode::Tag(tag) => out.push(tag),
            HedNode::Group(child) => collect_tags(child, out),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HedString<'s> {
    source: &'s str,
    root: HedGroup<'s>,
}

impl<'s> HedString<'s> {
    /// Build the group tree. Stray closing parentheses are ignored and unclosed groups end at
    /// the end of the string; reporting either is left to the syntax checks.
    pub fn parse(source: &'s str) -> HedString<'s> {
        let mut stack = vec![HedGroup::new(0)];
        for (is_tag, span) in split_hed_string(source) {
            if is_tag {
                if let Some(current) = stack.last_mut() {
                    current
                        .children
                        .push(HedNode::Tag(HedTag::unresolved(RawTag::new(source, span))));
                }
                continue;
            }
            for (i, c) in span.slice(source).char_indices() {
                let at = span.start + i;
                if c == OPENING_GROUP {
                    stack.push(HedGroup::new(at));
                } else if c == CLOSING_GROUP && stack.len() > 1 {
                    if let Some(mut group) = stack.pop() {
                        group.span.end = at + 1;
                        if let Some(parent) = stack.last_mut() {
                            parent.children.push(HedNode::Group(group));
                        }
                    }
                }
            }
        }
        while stack.len() > 1 {
            if let Some(mut group) = stack.pop() {
                group.span.end = source.len();
                if let Some(parent) = stack.last_mut() {
                    parent.children.push(HedNode::Group(group));
                }
            }
        }
        let mut root = stack.pop().unwrap_or_else(|| HedGroup::new(0));
        root.span = Span::new(0, source.len());
        HedString { source, root }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn root(&self) -> &HedGroup<'s> {
        &self.root
    }

    /// Every tag in written order.
    pub fn tags(&self) -> Vec<&HedTag<'s>> {
        self.root.all_tags()
    }

    /// Tags not enclosed in any group.
    pub fn top_level_tags(&self) -> impl Iterator<Item = &HedTag<'s>> {
        self.root.tags()
    }

    pub fn top_level_groups(&self) -> impl Iterator<Item = &HedGroup<'s>> {
        self.root.groups()
    }

    /// Resolve every tag. Issues come back in written order; tags that fail stay unresolved.
    /// A schema with duplicate short names resolves nothing and returns its duplicate issues.
    pub fn canonicalize(self, schema: &HedSchema) -> (HedString<'s>, Vec<Issue>) {
        if schema.has_duplicate_tags() {
            return (self, schema.duplicate_issues());
        }
        let mut issues = Vec::new();
        let root = self.root.resolve(schema, &mut issues);
        (
            HedString {
                source: self.source,
                root,
            },
            issues,
        )
    }

    /// Rewrite the source, replacing each tag with `render(tag)` and keeping every delimiter
    /// byte as written.
    pub fn rewrite<F>(&self, render: F) -> String
    where
        F: Fn(&HedTag<'s>) -> String,
    {
        let mut out = String::with_capacity(self.source.len());
        let mut last = 0;
        for tag in self.tags() {
            let span = tag.span();
            out.push_str(&self.source[last..span.start]);
            out.push_str(&render(tag));
            last = span.end;
        }
        out.push_str(&self.source[last..]);
        out
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagForm {
    Long,
    Short,
}

/// Convert every tag in `hed_string` to `form`. Tags that cannot be resolved are left as
/// written and reported.
pub fn convert_hed_string(
    schema: &HedSchema,
    hed_string: &str,
    form: TagForm,
) -> (String, Vec<Issue>) {
    let (parsed, issues) = HedString::parse(hed_string).canonicalize(schema);
    let converted = parsed.rewrite(|tag| match form {
        TagForm::Long => tag.long_tag().to_string(),
        TagForm::Short => tag.short_tag().to_string(),
    });
    (converted, issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        issues::ErrorCode,
        schema::{SchemaEntry, TagAttribute},
    };

    fn schema() -> HedSchema {
        let mut builder = HedSchema::builder("strings");
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
        builder.build()
    }

    #[test]
    fn test_group_tree() {
        let parsed = HedString::parse("Event, (Object, (Item)), Sensory-event");
        let top = parsed
            .top_level_tags()
            .map(|t| t.org_tag())
            .collect::<Vec<_>>();
        assert_eq!(top, vec!["Event", "Sensory-event"]);

        let groups = parsed.top_level_groups().collect::<Vec<_>>();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].span.slice(parsed.source()), "(Object, (Item))");
        assert_eq!(groups[0].groups().count(), 1);
        assert_eq!(parsed.root().all_groups().len(), 3);

        let all = parsed.tags().iter().map(|t| t.org_tag()).collect::<Vec<_>>();
        assert_eq!(all, vec!["Event", "Object", "Item", "Sensory-event"]);
    }

    #[test]
    fn test_unbalanced_parentheses_still_parse() {
        let parsed = HedString::parse("(Event, (Item), Object");
        assert_eq!(parsed.tags().len(), 3);
        let outer = parsed.top_level_groups().next().unwrap();
        assert_eq!(outer.span.end, parsed.source().len());

        let parsed = HedString::parse("Event), Item");
        assert_eq!(parsed.top_level_tags().count(), 2);
    }

    #[test]
    fn test_convert_preserves_delimiters() {
        let schema = schema();
        let (long, issues) = convert_hed_string(
            &schema,
            "Sensory-event, (Object/Chair ,Event)",
            TagForm::Long,
        );
        assert!(issues.is_empty());
        assert_eq!(long, "Event/Sensory-event, (Item/Object/Chair ,Event)");

        let (short, issues) = convert_hed_string(&schema, &long, TagForm::Short);
        assert!(issues.is_empty());
        assert_eq!(short, "Sensory-event, (Object/Chair ,Event)");
    }

    #[test]
    fn test_convert_keeps_unknown_tags() {
        let schema = schema();
        let (converted, issues) =
            convert_hed_string(&schema, "Object, Mystery/Tag", TagForm::Long);
        assert_eq!(converted, "Item/Object, Mystery/Tag");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ErrorCode::NoValidTagFound);
        assert_eq!(issues[0].span(), Some(Span::new(8, 15)));
    }
}
