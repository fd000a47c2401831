//! Pre-flight duplicate detection over the short names of a schema tree.
//!
//! Short-form resolution only works if every short name identifies one node. The detector walks
//! the tree once (pre-order, declaration order) and records every node under its case-folded
//! short name. Value placeholders (`#`) are extension points and never enter the index.

use petgraph::graph::NodeIndex;
use std::collections::BTreeMap;

use super::TagGraph;

/// Case-folded short name -> every node carrying that name, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ShortNameIndex {
    names: BTreeMap<String, Vec<NodeIndex>>,
    // Set once by the scan; checked before every resolution.
    has_duplicates: bool,
}

impl ShortNameIndex {
    /// The node for `name` when exactly one node carries it.
    pub fn get_unique(&self, name: &str) -> Option<NodeIndex> {
        match self.names.get(&name.to_ascii_lowercase()) {
            Some(nodes) if nodes.len() == 1 => Some(nodes[0]),
            _ => None,
        }
    }

    pub fn get_all(&self, name: &str) -> &[NodeIndex] {
        self.names
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn has_duplicates(&self) -> bool {
        self.has_duplicates
    }

    pub fn duplicates(&self) -> impl Iterator<Item = (&String, &Vec<NodeIndex>)> {
        self.names.iter().filter(|(_, nodes)| nodes.len() > 1)
    }
}

pub struct DuplicateTagDetector;

impl DuplicateTagDetector {
    /// Index every non-placeholder node in `preorder`.
    pub fn scan(graph: &TagGraph, preorder: &[NodeIndex]) -> ShortNameIndex {
        let mut names = BTreeMap::<String, Vec<NodeIndex>>::new();
        for idx in preorder.iter().copied() {
            let entry = &graph[idx];
            if entry.is_placeholder() {
                continue;
            }
            names
                .entry(entry.name.to_ascii_lowercase())
                .or_default()
                .push(idx);
        }
        let has_duplicates = names.values().any(|nodes| nodes.len() > 1);
        let index = ShortNameIndex {
            names,
            has_duplicates,
        };
        if index.has_duplicates() {
            for (name, nodes) in index.duplicates() {
                tracing::warn!(
                    "[DuplicateTagDetector::scan] short name '{}' used by {} nodes: {}",
                    name,
                    nodes.len(),
                    nodes
                        .iter()
                        .map(|idx| graph[*idx].long_name.as_str())
                        .collect::<Vec<&str>>()
                        .join(", ")
                );
            }
        }
        index
    }
}
