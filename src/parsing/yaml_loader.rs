//! YAML document loader.
//!
//! Turns a YAML document into a [`Node`] tree:
//! - scalar entries become attributes (null entries are dropped)
//! - mapping entries become one child element named by the key
//! - sequence entries become one child element per item, named by the key;
//!   scalar items become elements carrying a `value` attribute
//!
//! The top-level mapping must hold exactly one key, the root element.

use serde_yaml::Value;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;
use crate::parsing::node::Node;

/// Load a YAML document from a string and return its root element.
///
/// # Arguments
/// * `content` - YAML text
///
/// # Errors
/// Returns [`ConfigError::Document`] if the text is not YAML or the top
/// level is not a single-key mapping.
pub fn load_from_str(content: &str) -> Result<Node, ConfigError> {
    let yaml: Value = serde_yaml::from_str(content)
        .map_err(|e| ConfigError::Document(format!("Failed to parse YAML: {}", e)))?;

    let mapping = yaml
        .as_mapping()
        .ok_or_else(|| ConfigError::Document("Top level must be a mapping".to_string()))?;

    if mapping.len() != 1 {
        return Err(ConfigError::Document(format!(
            "Top level must contain exactly one root element, found {}",
            mapping.len()
        )));
    }

    let (key, value) = mapping
        .iter()
        .next()
        .ok_or_else(|| ConfigError::Document("Document is empty".to_string()))?;
    let name = scalar_to_string(key)
        .ok_or_else(|| ConfigError::Document("Root element name must be a scalar".to_string()))?;

    node_from_value(&name, value)
}

/// Load a YAML document from a file.
pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Node, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
    load_from_str(&content)
}

fn node_from_value(name: &str, value: &Value) -> Result<Node, ConfigError> {
    let mut node = Node::new(name);

    match value {
        Value::Null => {}
        Value::Mapping(mapping) => {
            for (key, entry) in mapping {
                let key = scalar_to_string(key).ok_or_else(|| {
                    ConfigError::Document(format!("Non-scalar key inside '{}'", name))
                })?;
                append_entry(&mut node, &key, entry)?;
            }
        }
        Value::Sequence(_) => {
            return Err(ConfigError::Document(format!(
                "Element '{}' cannot be a bare sequence",
                name
            )));
        }
        Value::Tagged(tagged) => return node_from_value(name, &tagged.value),
        scalar => {
            if let Some(text) = scalar_to_string(scalar) {
                node.attributes.insert("value".to_string(), text);
            }
        }
    }

    Ok(node)
}

fn append_entry(node: &mut Node, key: &str, entry: &Value) -> Result<(), ConfigError> {
    match entry {
        Value::Null => {}
        Value::Mapping(_) => node.children.push(node_from_value(key, entry)?),
        Value::Sequence(items) => {
            for item in items {
                node.children.push(node_from_value(key, item)?);
            }
        }
        Value::Tagged(tagged) => append_entry(node, key, &tagged.value)?,
        scalar => {
            if let Some(text) = scalar_to_string(scalar) {
                node.attributes.insert(key.to_string(), text);
            }
        }
    }
    Ok(())
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sections_attributes_and_lists() {
        let yaml = r#"
configuration:
  properties:
    resource: db.properties
    property:
      - name: username
        value: dev
  settings:
    setting:
      - { name: cacheEnabled, value: false }
      - { name: defaultStatementTimeout, value: 25 }
"#;
        let root = load_from_str(yaml).unwrap();
        assert_eq!(root.name, "configuration");
        assert_eq!(root.children.len(), 2);

        let properties = &root.children[0];
        assert_eq!(properties.attributes["resource"], "db.properties");
        assert_eq!(properties.children[0].attributes["value"], "dev");

        let settings = &root.children[1];
        assert_eq!(settings.children.len(), 2);
        assert_eq!(settings.children[0].attributes["value"], "false");
        assert_eq!(settings.children[1].attributes["value"], "25");
    }

    #[test]
    fn test_scalar_sequence_items_become_value_elements() {
        let root = load_from_str("root:\n  item: [a, b]\n").unwrap();
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].name, "item");
        assert_eq!(root.children[1].attributes["value"], "b");
    }

    #[test]
    fn test_rejects_multiple_roots() {
        let err = load_from_str("a: {}\nb: {}\n").unwrap_err();
        assert!(matches!(err, ConfigError::Document(_)));
    }

    #[test]
    fn test_rejects_invalid_yaml() {
        assert!(load_from_str("configuration: [unclosed").is_err());
    }
}
