//! Workflow document model.
//!
//! The persisted graph a workflow author exports from the canvas. Only the
//! fields the validator needs are modelled; anything else the editor stores
//! (positions, node data, handles) is ignored on parse.

use crate::error::AppError;
use serde::{Deserialize, Serialize};

/// A persisted workflow graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDocument {
    /// Node instances on the canvas
    pub nodes: Vec<WorkflowNode>,

    /// Connections between node instances
    pub edges: Vec<WorkflowEdge>,
}

/// A node instance in a workflow
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowNode {
    /// Instance id, unique within the document
    pub id: String,

    /// Port type tag (or "group")
    #[serde(rename = "type")]
    pub node_type: String,
}

/// A connection between two node instances
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowEdge {
    /// Source node instance id
    pub source: String,

    /// Target node instance id
    pub target: String,
}

impl WorkflowNode {
    pub fn new(id: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
        }
    }
}

impl WorkflowEdge {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

impl WorkflowDocument {
    /// Parse a workflow document from JSON text.
    ///
    /// # Arguments
    ///
    /// * `contents` - Raw JSON
    /// * `location` - Where the document came from, echoed in the error
    ///
    /// # Returns
    ///
    /// * `Ok(WorkflowDocument)` - Both `nodes` and `edges` arrays parsed
    /// * `Err(AppError::MalformedDocument)` - Not JSON, or not the expected shape
    pub fn from_json(contents: &str, location: &str) -> Result<Self, AppError> {
        serde_json::from_str(contents).map_err(|e| malformed(location, e))
    }

    /// Parse a workflow document from raw bytes.
    ///
    /// Bytes that are not UTF-8 are reported as `MalformedDocument`, the
    /// same as any other JSON syntax error.
    pub fn from_slice(bytes: &[u8], location: &str) -> Result<Self, AppError> {
        serde_json::from_slice(bytes).map_err(|e| malformed(location, e))
    }
}

fn malformed(location: &str, error: serde_json::Error) -> AppError {
    AppError::MalformedDocument {
        location: location.to_string(),
        message: error.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_editor_fields() {
        let json = r##"{
            "nodes": [
                {"id": "a", "type": "text", "position": {"x": 10, "y": 20}, "data": {"label": "Headline"}},
                {"id": "b", "type": "image"}
            ],
            "edges": [{"id": "e1", "source": "a", "target": "b", "sourceHandle": "out"}],
            "viewport": {"zoom": 1.5}
        }"##;

        let document = WorkflowDocument::from_json(json, "flow.json").unwrap();
        assert_eq!(
            document.nodes,
            vec![WorkflowNode::new("a", "text"), WorkflowNode::new("b", "image")]
        );
        assert_eq!(document.edges, vec![WorkflowEdge::new("a", "b")]);
    }

    #[test]
    fn test_missing_edges_is_malformed() {
        let result = WorkflowDocument::from_json(r#"{"nodes": []}"#, "flow.json");
        match result {
            Err(AppError::MalformedDocument { location, message }) => {
                assert_eq!(location, "flow.json");
                assert!(message.contains("edges"));
            }
            other => panic!("expected malformed document, got {:?}", other),
        }
    }

    #[test]
    fn test_from_slice() {
        let bytes = br#"{"nodes": [{"id": "a", "type": "text"}], "edges": []}"#;
        let document = WorkflowDocument::from_slice(bytes, "flow.json").unwrap();
        assert_eq!(document.nodes, vec![WorkflowNode::new("a", "text")]);
    }

    #[test]
    fn test_invalid_utf8_is_malformed() {
        let result = WorkflowDocument::from_slice(b"{\xff\xfe}", "flow.json");
        assert!(matches!(
            result,
            Err(AppError::MalformedDocument { ref location, .. }) if location == "flow.json"
        ));
    }

    #[test]
    fn test_non_string_type_is_malformed() {
        let json = r#"{"nodes": [{"id": "a", "type": 7}], "edges": []}"#;
        assert!(matches!(
            WorkflowDocument::from_json(json, "flow.json"),
            Err(AppError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        assert!(matches!(
            WorkflowDocument::from_json("{ not json", "flow.json"),
            Err(AppError::MalformedDocument { .. })
        ));
    }
}
