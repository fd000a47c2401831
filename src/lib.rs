//! # hed-core
//!
//! Canonicalization and validation of HED (Hierarchical Event Descriptor) annotation strings.
//!
//! ## Overview
//!
//! A HED string is a comma-separated list of tags and parenthesized tag groups, such as
//! `Sensory-event, (Item/Object/Furnishing/Chair, Action/Move), Duration/3 ms`. Every tag names
//! a node in a versioned schema tree, optionally followed by an extension or a value. Tags may
//! be written in long form (the full path from a root), short form (just the node name) or
//! anything in between, as long as the written parents match the schema.
//!
//! hed-core loads a schema into a tree ([`schema::HedSchema`]), resolves each written tag to a
//! canonical long form ([`tags::HedTag`]), and checks whole strings against the schema's rules
//! ([`validation::HedValidator`]). Problems are reported as [`issues::Issue`] values with a
//! stable code, a severity and the span of source text they refer to. Validation never stops at
//! the first problem.
//!
//! ### Key Features
//!
//! - **Form conversion**: short to long and long to short, for single tags and whole strings
//! - **Duplicate detection**: a schema whose short names are ambiguous refuses to resolve tags
//! - **Syntax checks**: invalid characters, unbalanced parentheses, missing commas, empty tags
//! - **Schema rules**: values and units, required children, extensions, top-level groups
//! - **Definitions**: `Definition` groups, `Def` and `Def-expand` references, expansion
//! - **BIDS sidecars**: HED strings found in JSON column descriptions
//!
//! ## Architecture
//!
//! - **[`schema`]**: the schema tree, unit classes, loading and the duplicate index
//! - **[`tags`]**: a single tag and its resolution against the schema
//! - **[`strings`]**: tokenizing and parsing whole strings into tag/group trees
//! - **[`validation`]**: the validation pipeline and its individual rule sets
//! - **[`definitions`]**: definition gathering, reference checks and expansion
//! - **[`sidecar`]**: extraction and validation of HED in BIDS JSON sidecars
//! - **[`issues`]**: issue codes, message templates and issue context
//! - **[`config`]**: validator switches and the TOML configuration file
//!
//! ## Quick Start
//!
//! ```rust
//! use hed_core::{
//!     config::ValidatorConfig,
//!     schema::{HedSchema, SchemaEntry},
//!     validation::HedValidator,
//! };
//!
//! # fn main() -> Result<(), hed_core::HedError> {
//! let mut builder = HedSchema::builder("8.3.0");
//! let event = builder.add_tag(None, SchemaEntry::new("Event"))?;
//! builder.add_tag(Some(event), SchemaEntry::new("Sensory-event"))?;
//! let schema = builder.build();
//!
//! let (long, issues) = schema.convert_to_long("Sensory-event");
//! assert!(issues.is_empty());
//! assert_eq!(long, "Event/Sensory-event");
//!
//! let validator = HedValidator::new(&schema, ValidatorConfig::default())?;
//! let issues = validator.validate_string("Sensory-event, Blorp");
//! assert_eq!(issues.len(), 1);
//! println!("{}", issues[0]);
//! # Ok(())
//! # }
//! ```
//!
//! Schemas are usually loaded from JSON or TOML files with [`schema::load_schema`], or shared
//! across a process through [`schema::SCHEMAS`].

pub mod config;
pub mod definitions;
pub mod error;
pub mod issues;
pub mod schema;
pub mod sidecar;
pub mod span;
pub mod strings;
pub mod tags;
#[cfg(test)]
mod tests;
pub mod validation;

pub use error::*;
pub use issues::{ErrorCode, Issue, Severity};
pub use schema::HedSchema;
pub use validation::{validate_hed_string, HedValidator};
