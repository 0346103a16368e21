//! # Brand OS Libraries
//!
//! Core library for the Brand OS workflow system. This crate holds the typed
//! node-graph model behind the moodboard canvas and everything needed to
//! check a saved workflow without touching the UI.
//!
//! ## Main Components
//!
//! - `PortTypeRegistry`: closed set of port types and their compatibility
//! - `NodeCatalog`: read-only marketplace catalog of node kinds
//! - `WorkflowDocument`: the persisted nodes + edges graph
//! - `WorkflowValidator`: exhaustive structural validation of a document
//! - `RegistryConfig`: built-in or YAML declaration both registries are built from
//! - `AppError`: standardized error handling

pub mod catalog;
pub mod config;
pub mod error;
pub mod ports;
pub mod validator;
pub mod workflow;

// Re-export main types for convenience
pub use catalog::{NodeCatalog, NodeCategory, NodeDefinition};
pub use config::{load_registry_config, RegistryConfig, ValidationOptions};
pub use error::AppError;
pub use ports::{PortTypeDescriptor, PortTypeRegistry, ANY_TYPE, GROUP_TYPE};
pub use validator::{ValidationFailure, ValidationOutcome, WorkflowValidator};
pub use workflow::{WorkflowDocument, WorkflowEdge, WorkflowNode};
