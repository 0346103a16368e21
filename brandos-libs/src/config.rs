//! Registry declaration.
//!
//! The port types and catalog nodes known to a deployment are declared once,
//! either by the built-in declaration compiled into this crate or by a
//! `registry.yaml` file, and turned into immutable registries at startup.

use crate::catalog::{NodeCategory, NodeDefinition};
use crate::error::AppError;
use crate::ports::PortTypeDescriptor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Root structure of a registry declaration file.
///
/// # Example YAML
///
/// ```yaml
/// port_types:
///   - key: "text"
///     label: "Text"
///   - key: "prompt"
///     label: "Prompt"
///     accepts: ["text"]
/// nodes:
///   - id: "copywriter"
///     category: "generative"
///     label: "Copywriter"
///     description: "Drafts on-brand copy"
///     cost: 2
///     default_color: "#F59E0B"
/// validation:
///   accept_catalog_kinds: false
///   check_edge_types: false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Port type declarations, in display order
    #[serde(default)]
    pub port_types: Vec<PortTypeDescriptor>,

    /// Catalog node declarations, in display order
    #[serde(default)]
    pub nodes: Vec<NodeDefinition>,

    /// Validator switches
    #[serde(default)]
    pub validation: ValidationOptions,
}

/// Optional validator behaviour. Both switches are off by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    /// Also accept a node whose type equals a catalog node id
    #[serde(default)]
    pub accept_catalog_kinds: bool,

    /// Report edges whose endpoint port types cannot connect
    #[serde(default)]
    pub check_edge_types: bool,
}

fn port(key: &str, label: &str, color: &str, accepts: &[&str]) -> PortTypeDescriptor {
    PortTypeDescriptor {
        key: key.to_string(),
        label: label.to_string(),
        color: Some(color.to_string()),
        accepts: accepts.iter().map(|a| a.to_string()).collect(),
    }
}

fn node(
    id: &str,
    category: NodeCategory,
    label: &str,
    description: &str,
    is_core: bool,
    cost: Option<u32>,
    default_color: &str,
) -> NodeDefinition {
    NodeDefinition {
        id: id.to_string(),
        category,
        label: label.to_string(),
        description: description.to_string(),
        is_core,
        cost,
        default_color: default_color.to_string(),
    }
}

impl RegistryConfig {
    /// The declaration shipped with Brand OS.
    pub fn builtin() -> Self {
        use NodeCategory::*;

        let port_types = vec![
            port("text", "Text", "#94A3B8", &["prompt", "number"]),
            port("prompt", "Prompt", "#A78BFA", &["text"]),
            port("image", "Image", "#38BDF8", &[]),
            port("video", "Video", "#F87171", &[]),
            port("audio", "Audio", "#34D399", &[]),
            port("number", "Number", "#FBBF24", &[]),
            port("color", "Color", "#F472B6", &[]),
            port("palette", "Palette", "#EC4899", &["color"]),
            port("typography", "Typography", "#818CF8", &[]),
            port("style", "Style", "#C084FC", &["palette", "typography", "image"]),
            port("json", "JSON", "#64748B", &["text", "number"]),
            port("any", "Any", "#E2E8F0", &[]),
        ];

        let nodes = vec![
            node("brand-kit", Foundation, "Brand Kit", "Logo, palette and typography of the active workspace", true, None, "#6366F1"),
            node("text-input", Foundation, "Text Input", "Free-form text entered on the canvas", true, None, "#94A3B8"),
            node("image-input", Foundation, "Image Input", "Reference image upload", true, None, "#38BDF8"),
            node("prompt-builder", Orchestration, "Prompt Builder", "Combines brand context and text into a generation prompt", true, None, "#A78BFA"),
            node("router", Orchestration, "Router", "Sends its input down one of several branches", false, None, "#8B5CF6"),
            node("image-generator", Generative, "Image Generator", "Generates on-brand imagery from a prompt", false, Some(4), "#0EA5E9"),
            node("copywriter", Generative, "Copywriter", "Drafts on-brand copy", false, Some(2), "#F59E0B"),
            node("video-generator", Generative, "Video Generator", "Short-form video from a prompt and key frames", false, Some(12), "#EF4444"),
            node("style-transfer", Generative, "Style Transfer", "Applies a brand style to an image", false, Some(6), "#C084FC"),
            node("palette-extractor", Utility, "Palette Extractor", "Extracts a colour palette from an image", false, Some(1), "#EC4899"),
            node("upscaler", Utility, "Upscaler", "Upscales images for print and large formats", false, Some(3), "#14B8A6"),
            node("webhook", External, "Webhook", "Posts results to an external URL", false, None, "#64748B"),
            node("figma-export", External, "Figma Export", "Pushes assets into a Figma file", false, None, "#A259FF"),
            node("slack-notify", External, "Slack Notify", "Announces finished assets in a Slack channel", false, None, "#4A154B"),
        ];

        Self {
            port_types,
            nodes,
            validation: ValidationOptions::default(),
        }
    }
}

/// Load and parse a registry declaration from a YAML file.
///
/// Registry-level consistency (unique ids, known `accepts` entries) is
/// checked when the registries are built from the result.
///
/// # Arguments
///
/// * `config_path` - Path to the registry.yaml file
///
/// # Returns
///
/// * `Ok(RegistryConfig)` - Successfully parsed declaration
/// * `Err(AppError::IoError)` - The file could not be read
/// * `Err(AppError::YamlError)` - The file is not a valid declaration
/// * `Err(AppError::ConfigError)` - The declaration has no port types
///
/// # Example
///
/// ```rust,ignore
/// use brandos_libs::load_registry_config;
///
/// let config = load_registry_config("./registry.yaml")?;
/// println!("{} port types", config.port_types.len());
/// ```
pub fn load_registry_config<P: AsRef<Path>>(config_path: P) -> Result<RegistryConfig, AppError> {
    let path = config_path.as_ref();

    let contents = fs::read_to_string(path)?;
    let config: RegistryConfig = serde_yaml::from_str(&contents)?;

    if config.port_types.is_empty() {
        return Err(AppError::ConfigError(format!(
            "Registry at {:?} declares no port types",
            path
        )));
    }

    debug!(
        "Loaded registry declaration from {:?}: {} port types, {} nodes",
        path,
        config.port_types.len(),
        config.nodes.len()
    );

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::NodeCatalog;
    use crate::ports::PortTypeRegistry;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_yaml(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_builtin_declaration_is_consistent() {
        let config = RegistryConfig::builtin();
        let ports = PortTypeRegistry::new(config.port_types).unwrap();
        let catalog = NodeCatalog::new(config.nodes).unwrap();

        assert!(ports.is_valid_type("text"));
        assert!(ports.is_valid_type("image"));
        assert!(ports.is_valid_type("number"));
        assert!(!ports.is_valid_type("group-frame"));
        assert!(catalog.find_by_id("brand-kit").unwrap().is_core);
        assert_eq!(config.validation, ValidationOptions::default());
    }

    #[test]
    fn test_sample_file_matches_builtin() {
        let sample = concat!(env!("CARGO_MANIFEST_DIR"), "/../registry.yaml");
        let loaded = load_registry_config(sample).unwrap();
        let builtin = RegistryConfig::builtin();

        assert_eq!(loaded.port_types, builtin.port_types);
        assert_eq!(loaded.nodes, builtin.nodes);
        assert_eq!(loaded.validation, builtin.validation);
    }

    #[test]
    fn test_load_registry_config() {
        let file = write_yaml(
            r##"
port_types:
  - key: "text"
    label: "Text"
  - key: "prompt"
    label: "Prompt"
    accepts: ["text"]
nodes:
  - id: "copywriter"
    category: "generative"
    label: "Copywriter"
    cost: 2
    default_color: "#F59E0B"
validation:
  check_edge_types: true
"##,
        );

        let config = load_registry_config(file.path()).unwrap();
        assert_eq!(config.port_types.len(), 2);
        assert_eq!(config.port_types[1].accepts, vec!["text".to_string()]);
        assert_eq!(config.nodes[0].cost, Some(2));
        assert!(!config.nodes[0].is_core);
        assert!(config.validation.check_edge_types);
        assert!(!config.validation.accept_catalog_kinds);
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_registry_config("/nonexistent/registry.yaml");
        assert!(matches!(result, Err(AppError::IoError(_))));
    }

    #[test]
    fn test_load_rejects_empty_port_types() {
        let file = write_yaml("nodes: []\n");
        assert!(matches!(
            load_registry_config(file.path()),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn test_load_rejects_unknown_category() {
        let file = write_yaml(
            r##"
port_types:
  - key: "text"
    label: "Text"
nodes:
  - id: "x"
    category: "magic"
    label: "X"
    default_color: "#000"
"##,
        );
        assert!(matches!(
            load_registry_config(file.path()),
            Err(AppError::YamlError(_))
        ));
    }
}
