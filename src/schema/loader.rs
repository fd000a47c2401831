//! Schema documents (JSON or TOML) and their conversion into a [`HedSchema`].
//!
//! The document mirrors the tree directly: every tag lists its children, and a child named `#`
//! declares that the parent takes a value.

use enumset::EnumSet;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};

use super::{HedSchema, SchemaBuilder, SchemaEntry, TagAttribute, Unit, UnitClass, ValueClass};
use crate::{config::get_content, error::HedError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitClassSpec {
    pub name: String,
    #[serde(default)]
    pub default_units: Option<String>,
    #[serde(default)]
    pub units: Vec<Unit>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagSpec {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub attributes: EnumSet<TagAttribute>,
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
    #[serde(default)]
    pub unit_classes: Vec<String>,
    #[serde(default)]
    pub value_classes: Vec<ValueClass>,
    #[serde(default)]
    pub children: Vec<TagSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub version: String,
    #[serde(default)]
    pub unit_classes: Vec<UnitClassSpec>,
    #[serde(default)]
    pub tags: Vec<TagSpec>,
}

impl SchemaDocument {
    pub fn from_json_str(content: &str) -> Result<SchemaDocument, HedError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<SchemaDocument, HedError> {
        Ok(toml::from_str(content)?)
    }

    pub fn into_schema(self) -> Result<HedSchema, HedError> {
        let mut builder = SchemaBuilder::new(self.version);
        for unit_class in self.unit_classes {
            builder.add_unit_class(UnitClass::new(
                unit_class.name,
                unit_class.default_units,
                unit_class.units,
            ));
        }
        // Pre-order with an explicit stack; children are pushed reversed to keep document order.
        let mut pending: Vec<(Option<NodeIndex>, TagSpec)> =
            self.tags.into_iter().rev().map(|t| (None, t)).collect();
        while let Some((parent, spec)) = pending.pop() {
            let TagSpec {
                name,
                description,
                attributes,
                properties,
                unit_classes,
                value_classes,
                children,
            } = spec;
            let entry = SchemaEntry {
                name,
                long_name: String::new(),
                description,
                attributes,
                properties,
                unit_classes,
                value_classes,
            };
            let idx = builder.add_tag(parent, entry)?;
            pending.extend(children.into_iter().rev().map(|c| (Some(idx), c)));
        }
        Ok(builder.build())
    }
}

impl HedSchema {
    pub fn from_json_str(content: &str) -> Result<HedSchema, HedError> {
        SchemaDocument::from_json_str(content)?.into_schema()
    }

    pub fn from_toml_str(content: &str) -> Result<HedSchema, HedError> {
        SchemaDocument::from_toml_str(content)?.into_schema()
    }
}

/// Load a schema file, choosing the format by extension (`.json` or `.toml`).
pub fn load_schema<P: AsRef<Path>>(path: P) -> Result<HedSchema, HedError> {
    let path = path.as_ref();
    let content = get_content(path)?;
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    let schema = match extension.as_str() {
        "json" => HedSchema::from_json_str(&content)?,
        "toml" => HedSchema::from_toml_str(&content)?,
        other => {
            return Err(HedError::SchemaLoad(format!(
                "unsupported schema format '{other}' for {}",
                path.display()
            )))
        }
    };
    tracing::debug!("Loaded schema {} from {:?}", schema.version(), path);
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOML_SCHEMA: &str = r##"
version = "8.0.0-mini"

[[unit_classes]]
name = "time"
default_units = "s"
units = [
    { name = "second", si_unit = true },
    { name = "s", si_unit = true, unit_symbol = true },
]

[[tags]]
name = "Event"
attributes = ["extensionAllowed"]

[[tags.children]]
name = "Sensory-event"
description = "Something enters the senses."

[[tags]]
name = "Duration"
attributes = ["requireChild"]

[[tags.children]]
name = "#"
unit_classes = ["time"]
value_classes = ["numericClass"]
"##;

    #[test]
    fn test_load_toml_document() {
        let schema = HedSchema::from_toml_str(TOML_SCHEMA).unwrap();
        assert_eq!(schema.version(), "8.0.0-mini");
        let sensory = schema.find_short("Sensory-event").unwrap();
        assert_eq!(schema.entry(sensory).long_name, "Event/Sensory-event");
        assert_eq!(
            schema.entry(sensory).description.as_deref(),
            Some("Something enters the senses.")
        );

        let duration = schema.find_short("duration").unwrap();
        assert!(schema
            .entry(duration)
            .has_attribute(TagAttribute::RequireChild));
        let value = schema.takes_value_child(duration).unwrap();
        assert_eq!(schema.entry(value).unit_classes, vec!["time".to_string()]);
        assert_eq!(schema.entry(value).value_classes, vec![ValueClass::Numeric]);
        assert_eq!(schema.unit_class("TIME").unwrap().default_units(), Some("s"));
    }

    #[test]
    fn test_load_json_document() {
        let json = r#"{
            "version": "1.0.0",
            "tags": [
                {"name": "Item", "attributes": ["extensionAllowed", "unique"],
                 "children": [{"name": "Object"}]}
            ]
        }"#;
        let schema = HedSchema::from_json_str(json).unwrap();
        let item = schema.find_long("item").unwrap();
        assert!(schema.entry(item).has_attribute(TagAttribute::Unique));
        assert!(schema.find_long("Item/Object").is_some());
    }

    #[test]
    fn test_unknown_attribute_is_rejected() {
        let json = r#"{"version": "1", "tags": [{"name": "Item", "attributes": ["bogus"]}]}"#;
        assert!(matches!(
            HedSchema::from_json_str(json),
            Err(HedError::Serialization(_))
        ));
    }

    #[test]
    fn test_load_schema_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.xml");
        std::fs::write(&path, "<HED/>").unwrap();
        assert!(matches!(load_schema(&path), Err(HedError::SchemaLoad(_))));
    }
}
