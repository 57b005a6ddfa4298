//! Document reading: YAML loading, node tree and placeholder substitution.

pub mod node;
pub mod property_parser;
pub mod yaml_loader;

pub use node::{Document, Node, XNode};
