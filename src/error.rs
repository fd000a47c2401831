use std::{fmt, io};

use regex::Error as RegexError;
use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;

/// Fatal errors. Anything that describes a problem with an annotation string is reported as an
/// [`crate::issues::Issue`] instead; these variants cover failures that stop an operation from
/// starting at all (unreadable schema, malformed config, a schema with duplicate terms).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum HedError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File System error: {0}")]
    Io(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("Schema load error: {0}")]
    SchemaLoad(String),
    #[error("Schema {version} has duplicate tag names ({}); tag resolution is disabled", .names.join(", "))]
    DuplicateTags { version: String, names: Vec<String> },
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for HedError {
    fn from(src: toml::de::Error) -> HedError {
        HedError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for HedError {
    fn from(src: toml::ser::Error) -> HedError {
        HedError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for HedError {
    fn from(src: JsonError) -> HedError {
        HedError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<io::Error> for HedError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => HedError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => HedError::PermissionDenied,
            _ => HedError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<fmt::Error> for HedError {
    fn from(x: fmt::Error) -> Self {
        HedError::Serialization(format!("{x}"))
    }
}

impl From<RegexError> for HedError {
    fn from(x: RegexError) -> Self {
        HedError::Serialization(format!("Regex parse failed: {x}"))
    }
}
