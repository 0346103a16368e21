//! Node catalog module
//!
//! Read-only catalog of installable node kinds. The marketplace renders it and
//! the validator may cross-reference node ids against it. Install state lives
//! with the caller; this module only answers questions about the catalog.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Marketplace category of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    /// Brand inputs: kits, text, reference images
    Foundation,

    /// Flow control and prompt assembly
    Orchestration,

    /// AI-backed creative generation
    Generative,

    /// Deterministic helpers (extraction, resizing)
    Utility,

    /// Third-party integrations
    External,
}

impl fmt::Display for NodeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeCategory::Foundation => "Foundation",
            NodeCategory::Orchestration => "Orchestration",
            NodeCategory::Generative => "Generative",
            NodeCategory::Utility => "Utility",
            NodeCategory::External => "External",
        };
        f.write_str(name)
    }
}

/// A catalog entry describing an installable unit of workflow functionality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDefinition {
    /// Unique identifier (e.g. "image-generator")
    pub id: String,

    /// Marketplace category
    pub category: NodeCategory,

    /// Human-readable label for the node (displayed in UI)
    pub label: String,

    /// Short marketplace description
    #[serde(default)]
    pub description: String,

    /// Core nodes ship by default and cannot be uninstalled
    #[serde(default)]
    pub is_core: bool,

    /// Credit cost per run, when the node is metered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u32>,

    /// Default canvas colour (hex)
    pub default_color: String,
}

/// Registry of all catalog nodes, in declaration order
#[derive(Debug, Clone)]
pub struct NodeCatalog {
    nodes: Vec<NodeDefinition>,
    /// Map of node id to position in `nodes`
    index: HashMap<String, usize>,
}

impl NodeCatalog {
    /// Create a catalog from its declaration
    ///
    /// # Returns
    ///
    /// * `Ok(NodeCatalog)` if every id is non-empty and unique
    /// * `Err(AppError::ConfigError)` otherwise
    pub fn new(nodes: Vec<NodeDefinition>) -> Result<Self, AppError> {
        let mut index = HashMap::with_capacity(nodes.len());

        for (position, node) in nodes.iter().enumerate() {
            if node.id.trim().is_empty() {
                return Err(AppError::ConfigError(format!(
                    "Node #{} has an empty id",
                    position
                )));
            }

            if node.label.trim().is_empty() {
                return Err(AppError::ConfigError(format!(
                    "Node '{}' has an empty label",
                    node.id
                )));
            }

            if index.insert(node.id.clone(), position).is_some() {
                return Err(AppError::ConfigError(format!(
                    "Node '{}' declared more than once",
                    node.id
                )));
            }
        }

        Ok(Self { nodes, index })
    }

    /// All nodes in declaration order
    pub fn all_nodes(&self) -> &[NodeDefinition] {
        &self.nodes
    }

    /// Get a node definition by id
    ///
    /// # Returns
    ///
    /// * `Ok(&NodeDefinition)` if found
    /// * `Err(AppError::NotFound)` if the id is not in the catalog
    pub fn find_by_id(&self, id: &str) -> Result<&NodeDefinition, AppError> {
        self.index
            .get(id)
            .map(|&i| &self.nodes[i])
            .ok_or_else(|| AppError::NotFound(format!("Node '{}' not found", id)))
    }

    /// Check if a node exists
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Count of catalog nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of the always-installed core nodes
    pub fn core_node_ids(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .filter(|n| n.is_core)
            .map(|n| n.id.as_str())
            .collect()
    }

    /// Nodes of one category, in declaration order
    pub fn by_category(&self, category: NodeCategory) -> impl Iterator<Item = &NodeDefinition> {
        self.nodes.iter().filter(move |n| n.category == category)
    }

    /// Check that a user may uninstall the given node.
    ///
    /// Core nodes are refused with `BadRequest`, unknown ids with `NotFound`.
    pub fn ensure_removable(&self, id: &str) -> Result<&NodeDefinition, AppError> {
        let node = self.find_by_id(id)?;
        if node.is_core {
            return Err(AppError::BadRequest(format!(
                "Core node '{}' cannot be uninstalled",
                id
            )));
        }
        Ok(node)
    }
}
