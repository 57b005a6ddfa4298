//! Navigable node tree for configuration documents.
//!
//! A [`Document`] owns the raw [`Node`] tree and the variable table used for
//! placeholder substitution. Nodes are read through [`XNode`] views, which
//! substitute `${...}` placeholders eagerly on every attribute read, so
//! replacing the document's variables changes what every later read sees.

use indexmap::IndexMap;

use crate::parsing::property_parser;
use crate::properties::Properties;

/// Raw element: a name, string attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Node {
    pub name: String,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }
}

/// A parsed configuration document and its substitution variables.
#[derive(Debug, Clone)]
pub struct Document {
    root: Node,
    variables: Properties,
}

impl Document {
    pub fn new(root: Node, variables: Properties) -> Self {
        Self { root, variables }
    }

    /// Replace the substitution variables for all subsequent reads.
    pub fn set_variables(&mut self, variables: Properties) {
        self.variables = variables;
    }

    pub fn variables(&self) -> &Properties {
        &self.variables
    }

    /// View of the root element.
    pub fn root(&self) -> XNode<'_> {
        XNode {
            node: &self.root,
            variables: &self.variables,
        }
    }
}

/// Read-only view of a [`Node`] that resolves placeholders on read.
#[derive(Debug, Clone, Copy)]
pub struct XNode<'a> {
    node: &'a Node,
    variables: &'a Properties,
}

impl<'a> XNode<'a> {
    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    /// First child element named `name`.
    pub fn eval_node(&self, name: &str) -> Option<XNode<'a>> {
        let variables = self.variables;
        self.node
            .children
            .iter()
            .find(|child| child.name == name)
            .map(|node| XNode { node, variables })
    }

    /// All child elements in document order.
    pub fn children(&self) -> Vec<XNode<'a>> {
        let variables = self.variables;
        self.node
            .children
            .iter()
            .map(|node| XNode { node, variables })
            .collect()
    }

    /// Attribute value with placeholders substituted.
    pub fn string_attribute(&self, name: &str) -> Option<String> {
        self.node
            .attributes
            .get(name)
            .map(|raw| property_parser::substitute(raw, self.variables))
    }

    pub fn string_attribute_or(&self, name: &str, default: &str) -> String {
        self.string_attribute(name)
            .unwrap_or_else(|| default.to_string())
    }

    /// Flatten the children's `name`/`value` attribute pairs into a table.
    ///
    /// Children without a `name` attribute are skipped; a missing `value`
    /// reads as the empty string.
    pub fn children_as_properties(&self) -> Properties {
        let mut props = Properties::new();
        for child in self.children() {
            if let Some(name) = child.string_attribute("name") {
                let value = child.string_attribute("value").unwrap_or_default();
                props.insert(name, value);
            }
        }
        props
    }
}
