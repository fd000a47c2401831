//! Character and delimiter checks that run on the raw string before any tag is resolved.

use crate::{
    issues::{format_issue, ErrorCode, Issue, IssueParams},
    span::Span,
    strings::tokenizer::{split_hed_string, CLOSING_GROUP, OPENING_GROUP},
};

const INVALID_CHARACTERS: &[char] = &['[', ']', '{', '}'];

/// Brackets, braces and non-whitespace control characters.
pub fn check_invalid_characters(hed_string: &str) -> Vec<Issue> {
    hed_string
        .char_indices()
        .filter(|(_, c)| INVALID_CHARACTERS.contains(c) || (c.is_control() && !c.is_whitespace()))
        .map(|(index, c)| {
            format_issue(
                ErrorCode::CharacterInvalid,
                &IssueParams::new()
                    .with("character", c.escape_default())
                    .with("index", index),
            )
            .with_span(Span::new(index, index + c.len_utf8()), hed_string)
        })
        .collect()
}

/// Returns an issue when the parentheses cannot be paired, either because the counts differ or
/// because a group is closed before it is opened.
pub fn check_parentheses(hed_string: &str) -> Option<Issue> {
    let mut opening = 0usize;
    let mut closing = 0usize;
    let mut closed_early = false;
    for c in hed_string.chars() {
        if c == OPENING_GROUP {
            opening += 1;
        } else if c == CLOSING_GROUP {
            closing += 1;
            closed_early |= closing > opening;
        }
    }
    if opening == closing && !closed_early {
        return None;
    }
    Some(format_issue(
        ErrorCode::ParenthesesMismatch,
        &IssueParams::new()
            .with("opening_count", opening)
            .with("closing_count", closing),
    ))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Last {
    Start,
    Tag,
    Comma { index: usize, reported: bool },
    Open,
    Close,
    Tilde,
}

/// Check the order of tags and delimiters: empty tags, missing commas, empty groups and
/// tildes. Each offending position is reported once.
pub fn check_delimiters(hed_string: &str) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut last = Last::Start;
    let mut last_tag = Span::new(0, 0);
    let mut open_positions = Vec::<usize>::new();
    let mut last_group = Span::new(0, 0);

    let tag_empty = |index: usize| {
        format_issue(ErrorCode::TagEmpty, &IssueParams::new().with("index", index))
            .with_span(Span::new(index, index + 1), hed_string)
    };
    let comma_missing = |span: Span| {
        format_issue(
            ErrorCode::CommaMissing,
            &IssueParams::new().with("tag", span.slice(hed_string)),
        )
        .with_span(span, hed_string)
    };

    for (is_tag, span) in split_hed_string(hed_string) {
        if is_tag {
            if last == Last::Close {
                issues.push(comma_missing(last_group));
            }
            last = Last::Tag;
            last_tag = span;
            continue;
        }
        for (offset, c) in span.slice(hed_string).char_indices() {
            let index = span.start + offset;
            match c {
                ',' => {
                    let reported = matches!(
                        last,
                        Last::Start | Last::Comma { .. } | Last::Open | Last::Tilde
                    );
                    if reported {
                        issues.push(tag_empty(index));
                    }
                    last = Last::Comma { index, reported };
                }
                OPENING_GROUP => {
                    match last {
                        Last::Tag => issues.push(comma_missing(last_tag)),
                        Last::Close => issues.push(comma_missing(last_group)),
                        _ => {}
                    }
                    open_positions.push(index);
                    last = Last::Open;
                }
                CLOSING_GROUP => {
                    match last {
                        Last::Open => issues.push(
                            format_issue(
                                ErrorCode::GroupEmpty,
                                &IssueParams::new().with("index", index),
                            )
                            .with_span(Span::new(index, index + 1), hed_string),
                        ),
                        Last::Comma {
                            index: comma,
                            reported: false,
                        } => issues.push(tag_empty(comma)),
                        _ => {}
                    }
                    let start = open_positions.pop().unwrap_or(index);
                    last_group = Span::new(start, index + 1);
                    last = Last::Close;
                }
                '~' => {
                    issues.push(
                        format_issue(
                            ErrorCode::TildesUnsupported,
                            &IssueParams::new().with("index", index),
                        )
                        .with_span(Span::new(index, index + 1), hed_string),
                    );
                    last = Last::Tilde;
                }
                _ => {}
            }
        }
    }

    if let Last::Comma {
        index,
        reported: false,
    } = last
    {
        issues.push(tag_empty(index));
    }
    issues
}
