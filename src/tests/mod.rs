mod canonicalization;
pub(crate) mod helpers;
