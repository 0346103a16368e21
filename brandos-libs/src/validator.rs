//! Workflow graph validation
//!
//! Checks a workflow document against the port type registry and, when
//! enabled, the node catalog. Validation is exhaustive: every violation in the
//! document is reported, not just the first one.

use crate::catalog::NodeCatalog;
use crate::config::{RegistryConfig, ValidationOptions};
use crate::error::AppError;
use crate::ports::{PortTypeRegistry, GROUP_TYPE};
use crate::workflow::WorkflowDocument;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A single structural violation found in a document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationFailure {
    /// A node id appears more than once; reported per repeated occurrence
    DuplicateNodeId { node_id: String },

    /// A node's type is neither a registered port type nor "group"
    InvalidNodeType { node_id: String, node_type: String },

    /// An edge's source is not a node of the document
    DanglingEdgeSource { edge_index: usize, source: String },

    /// An edge's target is not a node of the document
    DanglingEdgeTarget { edge_index: usize, target: String },

    /// An edge joins two port types that cannot connect
    IncompatibleEdgeTypes {
        edge_index: usize,
        source_type: String,
        target_type: String,
    },
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNodeId { node_id } => write!(f, "Duplicate node id '{}'", node_id),
            Self::InvalidNodeType { node_id, node_type } => {
                write!(f, "Invalid node type '{}' for node '{}'", node_type, node_id)
            }
            Self::DanglingEdgeSource { edge_index, source } => write!(
                f,
                "Edge {} references missing source node '{}'",
                edge_index, source
            ),
            Self::DanglingEdgeTarget { edge_index, target } => write!(
                f,
                "Edge {} references missing target node '{}'",
                edge_index, target
            ),
            Self::IncompatibleEdgeTypes {
                edge_index,
                source_type,
                target_type,
            } => write!(
                f,
                "Edge {} connects incompatible types: {} -> {}",
                edge_index, source_type, target_type
            ),
        }
    }
}

/// Result of validating one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "failures", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Valid,
    Invalid(Vec<ValidationFailure>),
}

impl ValidationOutcome {
    fn from_failures(failures: Vec<ValidationFailure>) -> Self {
        if failures.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(failures)
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Recorded failures, empty when valid
    pub fn failures(&self) -> &[ValidationFailure] {
        match self {
            Self::Valid => &[],
            Self::Invalid(failures) => failures,
        }
    }

    /// All failure messages joined with "; "
    pub fn summary(&self) -> String {
        self.failures()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Handle holding the registries a validation runs against.
///
/// Cheap to clone; clones share the same registries.
#[derive(Debug, Clone)]
pub struct WorkflowValidator {
    ports: Arc<PortTypeRegistry>,
    catalog: Arc<NodeCatalog>,
    options: ValidationOptions,
}

impl WorkflowValidator {
    /// Create a validator over already-built registries
    pub fn init(
        ports: Arc<PortTypeRegistry>,
        catalog: Arc<NodeCatalog>,
        options: ValidationOptions,
    ) -> Self {
        Self {
            ports,
            catalog,
            options,
        }
    }

    /// Build both registries from a declaration
    ///
    /// # Returns
    ///
    /// * `Ok(WorkflowValidator)` - the declaration is consistent
    /// * `Err(AppError::ConfigError)` - duplicate ids or unknown references
    pub fn from_config(config: &RegistryConfig) -> Result<Self, AppError> {
        let ports = PortTypeRegistry::new(config.port_types.clone())?;
        let catalog = NodeCatalog::new(config.nodes.clone())?;

        Ok(Self::init(
            Arc::new(ports),
            Arc::new(catalog),
            config.validation,
        ))
    }

    /// Validator over the built-in declaration
    pub fn builtin() -> Result<Self, AppError> {
        Self::from_config(&RegistryConfig::builtin())
    }

    pub fn ports(&self) -> &PortTypeRegistry {
        &self.ports
    }

    pub fn catalog(&self) -> &NodeCatalog {
        &self.catalog
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    fn accepts_node_type(&self, node_type: &str) -> bool {
        self.ports.is_valid_type(node_type)
            || (self.options.accept_catalog_kinds && self.catalog.contains(node_type))
    }

    /// Validate a document.
    ///
    /// Failures are ordered: duplicate ids, then node types, then edges, each
    /// in document order. The result depends only on the document and the
    /// registries.
    pub fn validate(&self, document: &WorkflowDocument) -> ValidationOutcome {
        let mut failures = Vec::new();

        // Node id -> type of its first occurrence
        let mut node_types: HashMap<&str, &str> = HashMap::with_capacity(document.nodes.len());
        for node in &document.nodes {
            if node_types.contains_key(node.id.as_str()) {
                failures.push(ValidationFailure::DuplicateNodeId {
                    node_id: node.id.clone(),
                });
            } else {
                node_types.insert(node.id.as_str(), node.node_type.as_str());
            }
        }

        for node in &document.nodes {
            if !self.accepts_node_type(&node.node_type) {
                failures.push(ValidationFailure::InvalidNodeType {
                    node_id: node.id.clone(),
                    node_type: node.node_type.clone(),
                });
            }
        }

        for (edge_index, edge) in document.edges.iter().enumerate() {
            let source_type = node_types.get(edge.source.as_str());
            let target_type = node_types.get(edge.target.as_str());

            if source_type.is_none() {
                failures.push(ValidationFailure::DanglingEdgeSource {
                    edge_index,
                    source: edge.source.clone(),
                });
            }
            if target_type.is_none() {
                failures.push(ValidationFailure::DanglingEdgeTarget {
                    edge_index,
                    target: edge.target.clone(),
                });
            }

            if !self.options.check_edge_types {
                continue;
            }

            if let (Some(&source_type), Some(&target_type)) = (source_type, target_type) {
                if self.is_typed_port(source_type)
                    && self.is_typed_port(target_type)
                    && !self.ports.is_compatible(source_type, target_type)
                {
                    failures.push(ValidationFailure::IncompatibleEdgeTypes {
                        edge_index,
                        source_type: source_type.to_string(),
                        target_type: target_type.to_string(),
                    });
                }
            }
        }

        debug!(
            "Validated {} nodes, {} edges: {} failures",
            document.nodes.len(),
            document.edges.len(),
            failures.len()
        );

        ValidationOutcome::from_failures(failures)
    }

    /// Parse and validate a JSON document.
    ///
    /// # Returns
    ///
    /// * `Ok(ValidationOutcome)` - the document parsed; it may still be invalid
    /// * `Err(AppError::MalformedDocument)` - the document did not parse
    pub fn validate_json(&self, contents: &str, location: &str) -> Result<ValidationOutcome, AppError> {
        let document = WorkflowDocument::from_json(contents, location)?;
        Ok(self.validate(&document))
    }

    /// Parse and validate a document read as raw bytes.
    pub fn validate_slice(&self, bytes: &[u8], location: &str) -> Result<ValidationOutcome, AppError> {
        let document = WorkflowDocument::from_slice(bytes, location)?;
        Ok(self.validate(&document))
    }

    /// Group nodes and catalog kinds carry no port type to compare
    fn is_typed_port(&self, node_type: &str) -> bool {
        node_type != GROUP_TYPE && self.ports.get(node_type).is_some()
    }
}
