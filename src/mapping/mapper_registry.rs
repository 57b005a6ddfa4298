//! Registry of bound mapper interfaces.

use indexmap::IndexSet;

use crate::error::ConfigError;
use crate::mapping::statement::{MappedStatement, StatementRegistry};
use crate::types::catalog::{TypeDescriptor, TypeKind};

/// Mapper interfaces known to the configuration, in binding order.
#[derive(Debug, Clone, Default)]
pub struct MapperRegistry {
    known: IndexSet<String>,
}

impl MapperRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a mapper interface and register its declared statements as
    /// `Type.method`.
    ///
    /// Types that are not interfaces are ignored.
    ///
    /// # Returns
    /// `true` if the type was bound.
    pub fn add_mapper(
        &mut self,
        descriptor: &TypeDescriptor,
        statements: &mut StatementRegistry,
    ) -> Result<bool, ConfigError> {
        if descriptor.kind() != TypeKind::Interface {
            tracing::debug!("Skipping mapper {}: not an interface", descriptor.name());
            return Ok(false);
        }
        if self.has_mapper(descriptor.name()) {
            return Err(ConfigError::validation(format!(
                "Type {} is already known to the MapperRegistry.",
                descriptor.name()
            )));
        }

        for decl in descriptor.statements() {
            statements.add_statement(MappedStatement {
                id: format!("{}.{}", descriptor.name(), decl.method),
                kind: decl.kind,
                sql: decl.sql.clone(),
                resource: descriptor.name().to_string(),
                database_id: None,
            })?;
        }

        self.known.insert(descriptor.name().to_string());
        tracing::info!(
            "Bound mapper {} ({} statements)",
            descriptor.name(),
            descriptor.statements().len()
        );
        Ok(true)
    }

    pub fn has_mapper(&self, type_name: &str) -> bool {
        self.known.contains(type_name)
    }

    pub fn mappers(&self) -> impl Iterator<Item = &str> {
        self.known.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.known.len()
    }

    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::mapping::statement::{StatementDecl, StatementKind};

    fn user_mapper() -> TypeDescriptor {
        TypeDescriptor::interface("app::mapper::UserMapper")
            .with_statement(StatementDecl::new(
                "selectById",
                StatementKind::Select,
                "SELECT * FROM users WHERE id = #{id}",
            ))
            .with_statement(StatementDecl::new(
                "deleteById",
                StatementKind::Delete,
                "DELETE FROM users WHERE id = #{id}",
            ))
    }

    #[test]
    fn test_binding_registers_statements() {
        let mut registry = MapperRegistry::new();
        let mut statements = StatementRegistry::new();

        assert!(registry.add_mapper(&user_mapper(), &mut statements).unwrap());
        assert!(registry.has_mapper("app::mapper::UserMapper"));
        assert_eq!(
            statements.statement_ids(),
            vec![
                "app::mapper::UserMapper.selectById",
                "app::mapper::UserMapper.deleteById"
            ]
        );
    }

    #[test]
    fn test_binding_twice_fails() {
        let mut registry = MapperRegistry::new();
        let mut statements = StatementRegistry::new();
        registry.add_mapper(&user_mapper(), &mut statements).unwrap();

        let err = registry.add_mapper(&user_mapper(), &mut statements).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("already known"));
    }

    #[test]
    fn test_concrete_types_are_ignored() {
        let mut registry = MapperRegistry::new();
        let mut statements = StatementRegistry::new();
        let bound = registry
            .add_mapper(&TypeDescriptor::new("app::model::User"), &mut statements)
            .unwrap();
        assert!(!bound);
        assert!(registry.is_empty());
    }
}
