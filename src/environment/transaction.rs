//! Transaction strategies.

use std::fmt;

use crate::error::ConfigError;
use crate::properties::{parse_bool, Properties};

/// Creates transactions for an environment.
pub trait TransactionFactory: fmt::Debug + Send + Sync {
    fn set_properties(&mut self, _properties: &Properties) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Whether transaction boundaries are left to an external container.
    fn is_managed(&self) -> bool;
}

/// Commits and rolls back directly on the connection.
#[derive(Debug, Clone, Default)]
pub struct JdbcTransactionFactory {
    skip_set_auto_commit_on_close: bool,
}

impl JdbcTransactionFactory {
    pub const TYPE_NAME: &'static str = "mapcfg::transaction::JdbcTransactionFactory";

    pub fn skip_set_auto_commit_on_close(&self) -> bool {
        self.skip_set_auto_commit_on_close
    }
}

impl TransactionFactory for JdbcTransactionFactory {
    fn set_properties(&mut self, properties: &Properties) -> Result<(), ConfigError> {
        if let Some(value) = properties.get("skipSetAutoCommitOnClose") {
            self.skip_set_auto_commit_on_close = parse_bool("skipSetAutoCommitOnClose", value)?;
        }
        Ok(())
    }

    fn is_managed(&self) -> bool {
        false
    }
}

/// Leaves commit and rollback to the container.
#[derive(Debug, Clone)]
pub struct ManagedTransactionFactory {
    close_connection: bool,
}

impl ManagedTransactionFactory {
    pub const TYPE_NAME: &'static str = "mapcfg::transaction::ManagedTransactionFactory";

    pub fn close_connection(&self) -> bool {
        self.close_connection
    }
}

impl Default for ManagedTransactionFactory {
    fn default() -> Self {
        Self {
            close_connection: true,
        }
    }
}

impl TransactionFactory for ManagedTransactionFactory {
    fn set_properties(&mut self, properties: &Properties) -> Result<(), ConfigError> {
        if let Some(value) = properties.get("closeConnection") {
            self.close_connection = parse_bool("closeConnection", value)?;
        }
        Ok(())
    }

    fn is_managed(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_managed_close_connection() {
        let mut factory = ManagedTransactionFactory::default();
        assert!(factory.close_connection());

        let mut props = Properties::new();
        props.insert("closeConnection".to_string(), "false".to_string());
        factory.set_properties(&props).unwrap();

        assert!(!factory.close_connection());
        assert!(factory.is_managed());
    }

    #[test]
    fn test_jdbc_ignores_unrelated_properties() {
        let mut factory = JdbcTransactionFactory::default();
        let mut props = Properties::new();
        props.insert("somethingElse".to_string(), "1".to_string());
        factory.set_properties(&props).unwrap();
        assert!(!factory.skip_set_auto_commit_on_close());
        assert!(!factory.is_managed());
    }
}
