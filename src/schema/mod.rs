//! The HED schema tree.
//!
//! A [`HedSchema`] is an ordered forest of [`SchemaEntry`] nodes stored in a petgraph
//! [`DiGraph`]. Edges run parent -> child and carry the child's sort position, so sibling order
//! is the declaration order. A child named `#` is the parent's value placeholder: its unit and
//! value classes govern whatever value is written after the parent tag.
//!
//! Schemas are built once (through [`SchemaBuilder`] or the [`loader`]) and are read-only
//! afterwards; building runs the [`duplicates::DuplicateTagDetector`] so every schema knows up
//! front whether short-form resolution is possible.

use enumset::{EnumSet, EnumSetType};
use petgraph::{
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
    Direction,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{
    error::HedError,
    issues::{format_issue, ErrorCode, Issue, IssueParams},
    validation::value_classes,
};

pub mod compliance;
pub mod duplicates;
pub mod loader;
pub mod registry;
pub mod units;

pub use compliance::check_compliance;
pub use duplicates::{DuplicateTagDetector, ShortNameIndex};
pub use loader::{load_schema, SchemaDocument, TagSpec};
pub use registry::{SchemaRegistry, SCHEMAS};
pub use units::{Unit, UnitClass};

/// Name of the value placeholder node.
pub const PLACEHOLDER: &str = "#";

pub type TagGraph = DiGraph<SchemaEntry, u16>;

/// Boolean tag attributes.
#[derive(EnumSetType, Debug, Serialize, Deserialize, Hash, PartialOrd, Ord)]
#[enumset(serialize_repr = "list")]
#[serde(rename_all = "camelCase")]
pub enum TagAttribute {
    /// Free-text children may be appended. Inherited by descendants.
    ExtensionAllowed,
    /// The tag cannot be used on its own; a child or value must follow.
    RequireChild,
    /// Every annotation must contain a tag under this node.
    Required,
    Recommended,
    /// The tag may only appear inside a top-level group.
    TopLevelTagGroup,
    /// At most one tag under this node per annotation.
    Unique,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueClass {
    #[serde(rename = "numericClass")]
    Numeric,
    #[serde(rename = "dateTimeClass")]
    DateTime,
    /// Deprecated, kept for older schemas.
    #[serde(rename = "clockTimeClass")]
    ClockTime,
    #[serde(rename = "textClass")]
    Text,
}

impl ValueClass {
    pub fn validate(&self, value: &str) -> bool {
        match self {
            ValueClass::Numeric => value_classes::validate_numeric_value_class(value),
            ValueClass::DateTime => value_classes::is_date_time(value),
            ValueClass::ClockTime => value_classes::is_clock_face_time(value),
            ValueClass::Text => value_classes::validate_text_value_class(value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaEntry {
    pub name: String,
    /// Full slash path from the top-level tag. Filled in when the entry is added to a tree.
    pub long_name: String,
    pub description: Option<String>,
    pub attributes: EnumSet<TagAttribute>,
    /// Key/value attributes (`suggestedTag`, `relatedTag`, ...).
    pub properties: BTreeMap<String, String>,
    pub unit_classes: Vec<String>,
    pub value_classes: Vec<ValueClass>,
}

impl SchemaEntry {
    pub fn new(name: &str) -> SchemaEntry {
        SchemaEntry {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, attribute: TagAttribute) -> Self {
        self.attributes |= attribute;
        self
    }

    pub fn with_unit_class(mut self, unit_class: &str) -> Self {
        self.unit_classes.push(unit_class.to_string());
        self
    }

    pub fn with_value_class(mut self, value_class: ValueClass) -> Self {
        self.value_classes.push(value_class);
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn is_placeholder(&self) -> bool {
        self.name == PLACEHOLDER
    }

    pub fn has_attribute(&self, attribute: TagAttribute) -> bool {
        self.attributes.contains(attribute)
    }
}

/// Children of `idx` in declaration order.
fn ordered_children(graph: &TagGraph, idx: NodeIndex) -> Vec<NodeIndex> {
    let mut edges = graph
        .edges_directed(idx, Direction::Outgoing)
        .map(|edge| (*edge.weight(), edge.target()))
        .collect::<Vec<(u16, NodeIndex)>>();
    edges.sort();
    edges.into_iter().map(|(_, target)| target).collect()
}

/// Depth-first pre-order over the forest, siblings in declaration order.
fn preorder(graph: &TagGraph, roots: &[NodeIndex]) -> Vec<NodeIndex> {
    let mut order = Vec::with_capacity(graph.node_count());
    let mut stack = roots.iter().rev().copied().collect::<Vec<NodeIndex>>();
    while let Some(idx) = stack.pop() {
        order.push(idx);
        stack.extend(ordered_children(graph, idx).into_iter().rev());
    }
    order
}

pub struct SchemaBuilder {
    version: String,
    graph: TagGraph,
    roots: Vec<NodeIndex>,
    unit_classes: BTreeMap<String, UnitClass>,
}

impl SchemaBuilder {
    pub fn new<S: Into<String>>(version: S) -> SchemaBuilder {
        SchemaBuilder {
            version: version.into(),
            graph: TagGraph::default(),
            roots: Vec::new(),
            unit_classes: BTreeMap::new(),
        }
    }

    pub fn add_unit_class(&mut self, unit_class: UnitClass) -> &mut Self {
        if self
            .unit_classes
            .insert(unit_class.name().to_ascii_lowercase(), unit_class)
            .is_some()
        {
            tracing::info!("[SchemaBuilder::add_unit_class] replaced an existing unit class");
        }
        self
    }

    /// Add `entry` under `parent` (or as a top-level tag). Siblings may not share a
    /// case-insensitive name.
    pub fn add_tag(
        &mut self,
        parent: Option<NodeIndex>,
        mut entry: SchemaEntry,
    ) -> Result<NodeIndex, HedError> {
        if entry.name.trim().is_empty() || entry.name.contains('/') {
            return Err(HedError::SchemaLoad(format!(
                "invalid tag name '{}'",
                entry.name
            )));
        }
        let siblings = match parent {
            Some(p) => ordered_children(&self.graph, p),
            None => self.roots.clone(),
        };
        if let Some(existing) = siblings
            .iter()
            .find(|idx| self.graph[**idx].name.eq_ignore_ascii_case(&entry.name))
        {
            return Err(HedError::SchemaLoad(format!(
                "'{}' is declared twice under the same parent ('{}')",
                entry.name, self.graph[*existing].long_name
            )));
        }
        entry.long_name = match parent {
            Some(p) => format!("{}/{}", self.graph[p].long_name, entry.name),
            None => entry.name.clone(),
        };
        let idx = self.graph.add_node(entry);
        match parent {
            Some(p) => {
                let order = u16::try_from(siblings.len()).map_err(|_| {
                    HedError::SchemaLoad(format!(
                        "too many children under '{}'",
                        self.graph[p].long_name
                    ))
                })?;
                self.graph.add_edge(p, idx, order);
            }
            None => self.roots.push(idx),
        }
        Ok(idx)
    }

    pub fn build(self) -> HedSchema {
        let order = preorder(&self.graph, &self.roots);
        let short_names = DuplicateTagDetector::scan(&self.graph, &order);
        let long_names = order
            .iter()
            .filter(|idx| !self.graph[**idx].is_placeholder())
            .map(|idx| (self.graph[*idx].long_name.to_ascii_lowercase(), *idx))
            .collect::<BTreeMap<String, NodeIndex>>();
        tracing::info!(
            "[SchemaBuilder::build] schema {}: {} nodes, {} unit classes, duplicates: {}",
            self.version,
            self.graph.node_count(),
            self.unit_classes.len(),
            short_names.has_duplicates()
        );
        HedSchema {
            version: self.version,
            graph: self.graph,
            roots: self.roots,
            order,
            long_names,
            short_names,
            unit_classes: self.unit_classes,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HedSchema {
    version: String,
    graph: TagGraph,
    roots: Vec<NodeIndex>,
    order: Vec<NodeIndex>,
    long_names: BTreeMap<String, NodeIndex>,
    short_names: ShortNameIndex,
    unit_classes: BTreeMap<String, UnitClass>,
}

impl HedSchema {
    pub fn builder<S: Into<String>>(version: S) -> SchemaBuilder {
        SchemaBuilder::new(version)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn graph(&self) -> &TagGraph {
        &self.graph
    }

    pub fn entry(&self, idx: NodeIndex) -> &SchemaEntry {
        &self.graph[idx]
    }

    pub fn roots(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Every node, pre-order, declaration order.
    pub fn nodes(&self) -> &[NodeIndex] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        ordered_children(&self.graph, idx)
    }

    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .neighbors_directed(idx, Direction::Incoming)
            .next()
    }

    pub fn short_names(&self) -> &ShortNameIndex {
        &self.short_names
    }

    /// Case-insensitive lookup of a full schema path.
    pub fn find_long(&self, long_name: &str) -> Option<NodeIndex> {
        self.long_names
            .get(&long_name.to_ascii_lowercase())
            .copied()
    }

    /// Case-insensitive lookup of a short name. `None` when the name is unknown or duplicated.
    pub fn find_short(&self, name: &str) -> Option<NodeIndex> {
        self.short_names.get_unique(name)
    }

    /// The `#` child of `idx`, when the tag takes a value.
    pub fn takes_value_child(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.children(idx)
            .into_iter()
            .find(|child| self.graph[*child].is_placeholder())
    }

    /// Whether `idx` or any ancestor allows extension.
    pub fn extension_allowed(&self, idx: NodeIndex) -> bool {
        let mut current = Some(idx);
        while let Some(node) = current {
            if self.graph[node].has_attribute(TagAttribute::ExtensionAllowed) {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn tags_with_attribute(&self, attribute: TagAttribute) -> Vec<NodeIndex> {
        self.order
            .iter()
            .copied()
            .filter(|idx| self.graph[*idx].has_attribute(attribute))
            .collect()
    }

    pub fn unit_class(&self, name: &str) -> Option<&UnitClass> {
        self.unit_classes.get(&name.to_ascii_lowercase())
    }

    pub fn unit_classes(&self) -> impl Iterator<Item = &UnitClass> {
        self.unit_classes.values()
    }

    pub fn has_duplicate_tags(&self) -> bool {
        self.short_names.has_duplicates()
    }

    /// Case-folded short name -> long forms of every node using it, in declaration order.
    pub fn find_duplicate_tags(&self) -> BTreeMap<String, Vec<String>> {
        self.short_names
            .duplicates()
            .map(|(name, nodes)| {
                (
                    name.clone(),
                    nodes
                        .iter()
                        .map(|idx| self.graph[*idx].long_name.clone())
                        .collect(),
                )
            })
            .collect()
    }

    /// One `SCHEMA_DUPLICATE_NODE` issue per duplicated short name.
    pub fn duplicate_issues(&self) -> Vec<Issue> {
        self.find_duplicate_tags()
            .into_iter()
            .map(|(name, paths)| {
                format_issue(
                    ErrorCode::SchemaDuplicateNode,
                    &IssueParams::new()
                        .with("tag", name)
                        .with("count", paths.len())
                        .with("paths", paths.join(", ")),
                )
            })
            .collect()
    }

    /// Fails when the schema cannot be used for tag resolution.
    pub fn ensure_resolvable(&self) -> Result<(), HedError> {
        if self.has_duplicate_tags() {
            return Err(HedError::DuplicateTags {
                version: self.version.clone(),
                names: self.find_duplicate_tags().into_keys().collect(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_schema() -> HedSchema {
        let mut builder = HedSchema::builder("test");
        let event = builder
            .add_tag(None, SchemaEntry::new("Event"))
            .unwrap();
        builder
            .add_tag(Some(event), SchemaEntry::new("Sensory-event"))
            .unwrap();
        builder
            .add_tag(Some(event), SchemaEntry::new("Agent-action"))
            .unwrap();
        let item = builder
            .add_tag(
                None,
                SchemaEntry::new("Item").with_attribute(TagAttribute::ExtensionAllowed),
            )
            .unwrap();
        let object = builder.add_tag(Some(item), SchemaEntry::new("Object")).unwrap();
        builder
            .add_tag(
                Some(object),
                SchemaEntry::new("#").with_value_class(ValueClass::Text),
            )
            .unwrap();
        builder.build()
    }

    #[test]
    fn test_long_names_and_order() {
        let schema = small_schema();
        let names = schema
            .nodes()
            .iter()
            .map(|idx| schema.entry(*idx).long_name.as_str())
            .collect::<Vec<&str>>();
        assert_eq!(
            names,
            vec![
                "Event",
                "Event/Sensory-event",
                "Event/Agent-action",
                "Item",
                "Item/Object",
                "Item/Object/#"
            ]
        );
        assert_eq!(schema.len(), 6);
    }

    #[test]
    fn test_lookups() {
        let schema = small_schema();
        let sensory = schema.find_long("event/SENSORY-EVENT").unwrap();
        assert_eq!(schema.find_short("sensory-event"), Some(sensory));
        assert_eq!(schema.parent(sensory), schema.find_short("Event"));
        assert!(schema.find_long("Item/Object/#").is_none());

        let object = schema.find_short("Object").unwrap();
        assert!(schema.takes_value_child(object).is_some());
        assert!(schema.extension_allowed(object));
        assert!(!schema.extension_allowed(sensory));
    }

    #[test]
    fn test_sibling_names_must_differ() {
        let mut builder = HedSchema::builder("test");
        let event = builder.add_tag(None, SchemaEntry::new("Event")).unwrap();
        builder.add_tag(Some(event), SchemaEntry::new("Cue")).unwrap();
        let err = builder.add_tag(Some(event), SchemaEntry::new("cue")).unwrap_err();
        assert!(matches!(err, HedError::SchemaLoad(_)));
        assert!(builder.add_tag(None, SchemaEntry::new("EVENT")).is_err());
        assert!(builder.add_tag(None, SchemaEntry::new("")).is_err());
    }

    #[test]
    fn test_ensure_resolvable() {
        let schema = small_schema();
        assert!(schema.ensure_resolvable().is_ok());
        assert!(schema.duplicate_issues().is_empty());

        let mut builder = HedSchema::builder("dup");
        let a = builder.add_tag(None, SchemaEntry::new("A")).unwrap();
        let b = builder.add_tag(None, SchemaEntry::new("B")).unwrap();
        builder.add_tag(Some(a), SchemaEntry::new("Foo")).unwrap();
        builder.add_tag(Some(b), SchemaEntry::new("Foo")).unwrap();
        let schema = builder.build();
        assert_eq!(
            schema.ensure_resolvable(),
            Err(HedError::DuplicateTags {
                version: "dup".to_string(),
                names: vec!["foo".to_string()]
            })
        );
        let issues = schema.duplicate_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, ErrorCode::SchemaDuplicateNode);
        assert_eq!(
            issues[0].message,
            "Duplicate term 'foo' used 2 places: A/Foo, B/Foo"
        );
    }
}
