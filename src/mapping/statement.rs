//! Mapped statements, SQL fragments and the registry that holds them.

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::ConfigError;

literal_enum! {
    /// Kind of SQL command a statement runs.
    pub enum StatementKind {
        Select => "select",
        Insert => "insert",
        Update => "update",
        Delete => "delete",
    }
}

/// Statement declared on a mapper interface method.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementDecl {
    pub method: String,
    pub kind: StatementKind,
    pub sql: String,
}

impl StatementDecl {
    pub fn new(method: impl Into<String>, kind: StatementKind, sql: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            kind,
            sql: sql.into(),
        }
    }
}

/// A statement ready to run, keyed by its fully-qualified id.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MappedStatement {
    pub id: String,
    pub kind: StatementKind,
    pub sql: String,
    /// Resource or type the statement was declared in.
    pub resource: String,
    pub database_id: Option<String>,
}

/// Reusable SQL text referenced by statements.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SqlFragment {
    pub id: String,
    pub body: String,
    pub resource: String,
}

/// Every statement and fragment of an assembly. Ids are unique across all
/// mapper sources.
#[derive(Debug, Clone, Default)]
pub struct StatementRegistry {
    statements: IndexMap<String, MappedStatement>,
    fragments: IndexMap<String, SqlFragment>,
}

impl StatementRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_statement(&mut self, statement: MappedStatement) -> Result<(), ConfigError> {
        if self.statements.contains_key(&statement.id) {
            return Err(ConfigError::validation(format!(
                "Mapped Statements collection already contains value for {}. please check {}",
                statement.id, statement.resource
            )));
        }
        tracing::debug!("Mapped statement {} ({})", statement.id, statement.kind);
        self.statements.insert(statement.id.clone(), statement);
        Ok(())
    }

    pub fn add_fragment(&mut self, fragment: SqlFragment) -> Result<(), ConfigError> {
        if self.fragments.contains_key(&fragment.id) {
            return Err(ConfigError::validation(format!(
                "SQL fragments collection already contains value for {}. please check {}",
                fragment.id, fragment.resource
            )));
        }
        self.fragments.insert(fragment.id.clone(), fragment);
        Ok(())
    }

    pub fn statement(&self, id: &str) -> Option<&MappedStatement> {
        self.statements.get(id)
    }

    pub fn has_statement(&self, id: &str) -> bool {
        self.statements.contains_key(id)
    }

    pub fn fragment(&self, id: &str) -> Option<&SqlFragment> {
        self.fragments.get(id)
    }

    pub fn statements(&self) -> impl Iterator<Item = &MappedStatement> {
        self.statements.values()
    }

    pub fn statement_ids(&self) -> Vec<&str> {
        self.statements.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn select(id: &str) -> MappedStatement {
        MappedStatement {
            id: id.to_string(),
            kind: StatementKind::Select,
            sql: "SELECT 1".to_string(),
            resource: "mappers/user.yaml".to_string(),
            database_id: None,
        }
    }

    #[test]
    fn test_duplicate_statement_id_rejected() {
        let mut registry = StatementRegistry::new();
        registry.add_statement(select("app::UserMapper.selectUser")).unwrap();

        let err = registry
            .add_statement(select("app::UserMapper.selectUser"))
            .unwrap_err();
        assert!(err.to_string().contains("already contains value for app::UserMapper.selectUser"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_fragment_id_rejected() {
        let mut registry = StatementRegistry::new();
        let fragment = SqlFragment {
            id: "users.columns".to_string(),
            body: "id, name".to_string(),
            resource: "mappers/user.yaml".to_string(),
        };
        registry.add_fragment(fragment.clone()).unwrap();
        assert!(registry.add_fragment(fragment).is_err());
        assert_eq!(registry.fragment("users.columns").map(|f| f.body.as_str()), Some("id, name"));
    }

    #[test]
    fn test_statement_kind_literals() {
        assert_eq!("update".parse::<StatementKind>(), Ok(StatementKind::Update));
        assert!("UPDATE".parse::<StatementKind>().is_err());
    }
}
