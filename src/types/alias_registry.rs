//! Case-insensitive short names for fully-qualified type names.

use indexmap::IndexMap;
use std::collections::HashMap;

use crate::error::ConfigError;
use crate::types::catalog::{TypeDescriptor, TypeKind};

/// Aliases every registry starts with, mapping to the scalar value types.
const VALUE_TYPE_ALIASES: &[(&str, &str)] = &[
    ("string", "String"),
    ("byte", "i8"),
    ("short", "i16"),
    ("int", "i32"),
    ("integer", "i32"),
    ("long", "i64"),
    ("float", "f32"),
    ("double", "f64"),
    ("boolean", "bool"),
    ("bytes", "Vec<u8>"),
];

/// Registry of alias → type name. Lookups ignore ASCII case.
#[derive(Debug, Clone)]
pub struct TypeAliasRegistry {
    aliases: IndexMap<String, String>,
}

impl TypeAliasRegistry {
    /// Registry holding the value type aliases.
    pub fn new() -> Self {
        let mut registry = Self {
            aliases: IndexMap::new(),
        };
        for (alias, type_name) in VALUE_TYPE_ALIASES {
            registry.register_alias(alias, type_name);
        }
        registry
    }

    /// Bind `alias` to `type_name`. A later registration of the same alias
    /// replaces the earlier one.
    pub fn register_alias(&mut self, alias: &str, type_name: &str) {
        let key = alias.to_ascii_lowercase();
        if let Some(previous) = self.aliases.get(&key) {
            if previous != type_name {
                tracing::debug!(
                    "Type alias '{}' rebound from {} to {}",
                    alias,
                    previous,
                    type_name
                );
            }
        }
        self.aliases.insert(key, type_name.to_string());
    }

    /// Bind a type under its default alias: the type's own hint, else its
    /// simple name.
    pub fn register_type(&mut self, descriptor: &TypeDescriptor) {
        self.register_alias(descriptor.default_alias(), descriptor.name());
    }

    /// Bind every eligible type found by a namespace scan.
    ///
    /// Only concrete types are registered. Two types in the same scan that
    /// produce the same alias fail the scan.
    ///
    /// # Returns
    /// Number of aliases registered.
    pub fn register_scanned(
        &mut self,
        namespace: &str,
        found: &[TypeDescriptor],
    ) -> Result<usize, ConfigError> {
        let mut seen: HashMap<String, &str> = HashMap::new();

        for descriptor in found.iter().filter(|d| d.kind() == TypeKind::Concrete) {
            let key = descriptor.default_alias().to_ascii_lowercase();
            if let Some(existing) = seen.get(&key) {
                if *existing != descriptor.name() {
                    return Err(ConfigError::validation(format!(
                        "The alias '{}' is already mapped to the value '{}' in namespace '{}'; \
                         cannot also map it to '{}'",
                        descriptor.default_alias(),
                        existing,
                        namespace,
                        descriptor.name()
                    )));
                }
            }
            seen.insert(key, descriptor.name());
        }

        for descriptor in found.iter().filter(|d| d.kind() == TypeKind::Concrete) {
            self.register_type(descriptor);
        }

        tracing::debug!("Registered {} type aliases from namespace {}", seen.len(), namespace);
        Ok(seen.len())
    }

    /// Type name bound to `alias`, if any.
    pub fn lookup(&self, alias: &str) -> Option<&str> {
        self.aliases
            .get(&alias.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.lookup(alias).is_some()
    }

    /// All aliases (lower-cased) with their type names.
    pub fn aliases(&self) -> &IndexMap<String, String> {
        &self.aliases
    }
}

impl Default for TypeAliasRegistry {
    fn default() -> Self {
        Self::new()
    }
}
