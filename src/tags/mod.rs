//! Tag instances.
//!
//! A tag starts life as a [`RawTag`]: a span into the annotation string it was written in. The
//! resolver turns it into a [`CanonicalForm`] (long form plus the two split points). [`HedTag`]
//! pairs the two and can only move from unresolved to resolved by being consumed, so the
//! canonical forms are set once and never change afterwards.

use petgraph::graph::NodeIndex;

use crate::{issues::Issue, schema::HedSchema, span::Span};

pub mod resolver;

/// Immutable view of a tag as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTag<'s> {
    pub source: &'s str,
    pub span: Span,
}

impl<'s> RawTag<'s> {
    pub fn new(source: &'s str, span: Span) -> RawTag<'s> {
        RawTag { source, span }
    }

    /// Treat an entire string as a single tag.
    pub fn whole(source: &'s str) -> RawTag<'s> {
        RawTag::new(source, Span::new(0, source.len()))
    }

    pub fn text(&self) -> &'s str {
        self.span.slice(self.source)
    }
}

/// Result of resolving a tag against a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalForm {
    /// Schema long name of the base tag followed by the written extension, if any.
    pub long_tag: String,
    /// Byte offset in `long_tag` where the short form starts.
    pub short_tag_index: usize,
    /// Byte offset in `long_tag` where the extension or value starts. Equal to
    /// `long_tag.len()` when there is none.
    pub extension_index: usize,
    /// Schema node of the base tag.
    pub entry: NodeIndex,
}

impl CanonicalForm {
    pub fn short_tag(&self) -> &str {
        &self.long_tag[self.short_tag_index..]
    }

    pub fn extension(&self) -> &str {
        &self.long_tag[self.extension_index..]
    }

    pub fn base_tag(&self) -> &str {
        self.long_tag[..self.extension_index].trim_end_matches('/')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HedTag<'s> {
    raw: RawTag<'s>,
    form: Option<CanonicalForm>,
}

impl<'s> HedTag<'s> {
    pub fn unresolved(raw: RawTag<'s>) -> HedTag<'s> {
        HedTag { raw, form: None }
    }

    /// Resolve the tag, returning it with its canonical form set on success. A tag that was
    /// already resolved is returned unchanged with no issues. On failure the tag stays
    /// unresolved and keeps reporting its raw text.
    pub fn resolve(self, schema: &HedSchema) -> (HedTag<'s>, Vec<Issue>) {
        if self.form.is_some() {
            return (self, Vec::new());
        }
        match schema.resolve(&self.raw) {
            Ok(form) => (
                HedTag {
                    raw: self.raw,
                    form: Some(form),
                },
                Vec::new(),
            ),
            Err(issues) => (self, issues),
        }
    }

    pub fn raw(&self) -> &RawTag<'s> {
        &self.raw
    }

    pub fn span(&self) -> Span {
        self.raw.span
    }

    pub fn form(&self) -> Option<&CanonicalForm> {
        self.form.as_ref()
    }

    pub fn entry(&self) -> Option<NodeIndex> {
        self.form.as_ref().map(|form| form.entry)
    }

    pub fn is_resolved(&self) -> bool {
        self.form.is_some()
    }

    /// The tag exactly as written.
    pub fn org_tag(&self) -> &'s str {
        self.raw.text()
    }

    pub fn long_tag(&self) -> &str {
        match &self.form {
            Some(form) => &form.long_tag,
            None => self.org_tag(),
        }
    }

    pub fn short_tag(&self) -> &str {
        match &self.form {
            Some(form) => form.short_tag(),
            None => self.org_tag(),
        }
    }

    /// Long form without the extension.
    pub fn base_tag(&self) -> &str {
        match &self.form {
            Some(form) => form.base_tag(),
            None => self.org_tag(),
        }
    }

    /// Short form without the extension.
    pub fn short_base_tag(&self) -> &str {
        match &self.form {
            Some(form) => {
                let end = form.long_tag.len() - form.extension().len();
                form.long_tag[form.short_tag_index..end].trim_end_matches('/')
            }
            None => self.org_tag(),
        }
    }

    /// The written tag without its extension.
    pub fn org_base_tag(&self) -> &'s str {
        let org = self.org_tag();
        match &self.form {
            Some(form) => {
                let end = org.len().saturating_sub(form.extension().len());
                org.get(..end).unwrap_or(org).trim_end_matches('/')
            }
            None => org,
        }
    }

    pub fn extension(&self) -> &str {
        match &self.form {
            Some(form) => form.extension(),
            None => "",
        }
    }

    pub fn has_extension(&self) -> bool {
        !self.extension().is_empty()
    }

    /// Case-folded long form, used for tag equality inside groups.
    pub fn lowered_long(&self) -> String {
        self.long_tag().to_ascii_lowercase()
    }
}
