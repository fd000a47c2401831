//! Small string helpers for tabular annotations.

use crate::strings::tokenizer::split_hed_string;

/// Prepend `prefix` to `tag` unless the tag already starts with it (ignoring ASCII case).
pub fn add_prefix_if_not_present(tag: &str, prefix: &str) -> String {
    let starts_with_prefix = tag
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix));
    if starts_with_prefix {
        tag.to_string()
    } else {
        format!("{prefix}{tag}")
    }
}

/// Apply [`add_prefix_if_not_present`] to every tag of an annotation string, keeping the
/// delimiters as written.
pub fn add_prefix_to_tags(hed_string: &str, prefix: &str) -> String {
    if prefix.is_empty() {
        return hed_string.to_string();
    }
    split_hed_string(hed_string)
        .into_iter()
        .map(|(is_tag, span)| {
            let text = span.slice(hed_string);
            if is_tag {
                add_prefix_if_not_present(text, prefix)
            } else {
                text.to_string()
            }
        })
        .collect()
}
