//! Annotation strings: tokenizing, the group tree, and whole-string conversions.

pub mod hed_string;
pub mod tokenizer;
pub mod util;

pub use hed_string::{convert_hed_string, HedGroup, HedNode, HedString, TagForm};
pub use tokenizer::split_hed_string;
pub use util::{add_prefix_if_not_present, add_prefix_to_tags};
