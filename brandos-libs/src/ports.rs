//! Port type registry.
//!
//! Holds the closed set of data kinds a node's connection points may carry,
//! and which kinds may be wired into which. The registry is built once from a
//! declaration and never mutated afterwards.

use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Reserved tag for group nodes. Always valid, never declared.
pub const GROUP_TYPE: &str = "group";

/// Wildcard tag. When declared, it connects to every other type.
pub const ANY_TYPE: &str = "any";

/// Declaration of a single port type.
///
/// # Example YAML
///
/// ```yaml
/// key: "palette"
/// label: "Palette"
/// color: "#F472B6"
/// accepts: ["color"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortTypeDescriptor {
    /// Tag used by workflow documents (e.g. "text", "image")
    pub key: String,

    /// Human-readable label
    pub label: String,

    /// Handle colour used by the canvas (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    /// Other port types this type accepts as a connection source
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub accepts: Vec<String>,
}

impl PortTypeDescriptor {
    /// Shorthand for declarations without colour or extra accepted types
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            color: None,
            accepts: Vec::new(),
        }
    }
}

/// Immutable registry of port types, in declaration order.
#[derive(Debug, Clone)]
pub struct PortTypeRegistry {
    types: Vec<PortTypeDescriptor>,
    index: HashMap<String, usize>,
}

impl PortTypeRegistry {
    /// Build the registry from a declaration.
    ///
    /// # Returns
    ///
    /// * `Ok(PortTypeRegistry)` - every key is non-empty and unique, and every
    ///   `accepts` entry names a declared type
    /// * `Err(AppError::ConfigError)` - the declaration is inconsistent
    pub fn new(types: Vec<PortTypeDescriptor>) -> Result<Self, AppError> {
        let mut index = HashMap::with_capacity(types.len());

        for (position, descriptor) in types.iter().enumerate() {
            if descriptor.key.trim().is_empty() {
                return Err(AppError::ConfigError(format!(
                    "Port type #{} has an empty key",
                    position
                )));
            }

            if index.insert(descriptor.key.clone(), position).is_some() {
                return Err(AppError::ConfigError(format!(
                    "Duplicate port type '{}'",
                    descriptor.key
                )));
            }
        }

        let declared: HashSet<&str> = types.iter().map(|t| t.key.as_str()).collect();
        for descriptor in &types {
            for accepted in &descriptor.accepts {
                if !declared.contains(accepted.as_str()) && accepted != GROUP_TYPE {
                    return Err(AppError::ConfigError(format!(
                        "Port type '{}' accepts undeclared type '{}'",
                        descriptor.key, accepted
                    )));
                }
            }
        }

        Ok(Self { types, index })
    }

    /// True iff `tag` is declared or is the reserved group tag
    pub fn is_valid_type(&self, tag: &str) -> bool {
        tag == GROUP_TYPE || self.index.contains_key(tag)
    }

    /// Look up a declared port type
    pub fn get(&self, tag: &str) -> Option<&PortTypeDescriptor> {
        self.index.get(tag).map(|&i| &self.types[i])
    }

    /// All declared port types in declaration order
    pub fn types(&self) -> &[PortTypeDescriptor] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Whether an output of type `source` may be wired into an input of type `target`.
    ///
    /// Identical valid types always connect. A declared `any` type connects
    /// in both directions. Otherwise the target must list the source in its
    /// `accepts` declaration.
    pub fn is_compatible(&self, source: &str, target: &str) -> bool {
        if !self.is_valid_type(source) || !self.is_valid_type(target) {
            return false;
        }

        if source == target {
            return true;
        }

        if (source == ANY_TYPE || target == ANY_TYPE) && self.index.contains_key(ANY_TYPE) {
            return true;
        }

        self.get(target)
            .is_some_and(|descriptor| descriptor.accepts.iter().any(|a| a == source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> PortTypeRegistry {
        let mut prompt = PortTypeDescriptor::new("prompt", "Prompt");
        prompt.accepts = vec!["text".to_string()];

        PortTypeRegistry::new(vec![
            PortTypeDescriptor::new("text", "Text"),
            PortTypeDescriptor::new("image", "Image"),
            prompt,
            PortTypeDescriptor::new("any", "Any"),
        ])
        .unwrap()
    }

    #[test]
    fn test_declared_types_are_valid() {
        let registry = registry();
        assert!(registry.is_valid_type("text"));
        assert!(registry.is_valid_type("image"));
        assert!(!registry.is_valid_type("bogus"));
        assert!(!registry.is_valid_type("Text"));
    }

    #[test]
    fn test_group_is_always_valid() {
        let empty = PortTypeRegistry::new(Vec::new()).unwrap();
        assert!(empty.is_empty());
        assert!(empty.is_valid_type(GROUP_TYPE));
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let registry = registry();
        let keys: Vec<&str> = registry.types().iter().map(|t| t.key.as_str()).collect();
        assert_eq!(keys, vec!["text", "image", "prompt", "any"]);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result = PortTypeRegistry::new(vec![
            PortTypeDescriptor::new("text", "Text"),
            PortTypeDescriptor::new("text", "Copy"),
        ]);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_empty_key_rejected() {
        let result = PortTypeRegistry::new(vec![PortTypeDescriptor::new(" ", "Blank")]);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_unknown_accepts_rejected() {
        let mut image = PortTypeDescriptor::new("image", "Image");
        image.accepts = vec!["video".to_string()];
        let result = PortTypeRegistry::new(vec![image]);
        assert!(matches!(result, Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_compatibility() {
        let registry = registry();
        assert!(registry.is_compatible("text", "text"));
        assert!(registry.is_compatible("text", "prompt"));
        assert!(!registry.is_compatible("prompt", "text"));
        assert!(!registry.is_compatible("text", "image"));
        assert!(registry.is_compatible("image", "any"));
        assert!(registry.is_compatible("any", "text"));
        assert!(!registry.is_compatible("bogus", "bogus"));
    }

    #[test]
    fn test_any_is_not_a_wildcard_unless_declared() {
        let registry = PortTypeRegistry::new(vec![PortTypeDescriptor::new("text", "Text")]).unwrap();
        assert!(!registry.is_compatible("text", ANY_TYPE));
    }
}
