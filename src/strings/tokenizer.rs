//! Splitting a raw annotation string into tag and delimiter spans.
//!
//! The tokenizer does not judge tags. It only decides which byte ranges are candidate tags and
//! which are structure (`,` `(` `)` `~` and whitespace). Tag and delimiter spans alternate and
//! together cover the input exactly, so every later issue can point back into the original text.

use crate::span::Span;

pub const TAG_DELIMITERS: [char; 4] = [',', '(', ')', '~'];
pub const OPENING_GROUP: char = '(';
pub const CLOSING_GROUP: char = ')';

pub fn is_delimiter(c: char) -> bool {
    TAG_DELIMITERS.contains(&c)
}

/// Split `hed_string` into `(is_tag, span)` pairs in source order.
///
/// A tag runs from its first non-space, non-delimiter character to the last non-space character
/// before the next delimiter, so interior spaces (`Duration/3 ms`) stay in the tag. Everything
/// between tags (delimiters and surrounding whitespace, however many) becomes one delimiter
/// span.
pub fn split_hed_string(hed_string: &str) -> Vec<(bool, Span)> {
    let mut result = Vec::new();
    let mut last_end = 0;
    let mut tag_start: Option<usize> = None;
    let mut tag_end = 0;

    for (i, c) in hed_string.char_indices() {
        if is_delimiter(c) {
            if let Some(start) = tag_start.take() {
                push_delimiter(&mut result, last_end, start);
                result.push((true, Span::new(start, tag_end)));
                last_end = tag_end;
            }
            continue;
        }
        if c.is_whitespace() {
            continue;
        }
        if tag_start.is_none() {
            tag_start = Some(i);
        }
        tag_end = i + c.len_utf8();
    }

    if let Some(start) = tag_start {
        push_delimiter(&mut result, last_end, start);
        result.push((true, Span::new(start, tag_end)));
        last_end = tag_end;
    }
    push_delimiter(&mut result, last_end, hed_string.len());
    result
}

fn push_delimiter(result: &mut Vec<(bool, Span)>, start: usize, end: usize) {
    if start < end {
        result.push((false, Span::new(start, end)));
    }
}
