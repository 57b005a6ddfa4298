//! Environments: the pairing of a transaction strategy with a connection source.

pub mod database_id;
pub mod datasource;
pub mod transaction;

use std::sync::Arc;

pub use database_id::{DatabaseIdProvider, VendorDatabaseIdProvider};
pub use datasource::{
    DataSource, DataSourceFactory, PoolSettings, PooledDataSource, PooledDataSourceFactory,
    UnpooledDataSource, UnpooledDataSourceFactory,
};
pub use transaction::{JdbcTransactionFactory, ManagedTransactionFactory, TransactionFactory};

/// The environment selected for a configuration. Never modified after construction.
#[derive(Debug, Clone)]
pub struct Environment {
    id: String,
    transaction_factory: Arc<dyn TransactionFactory>,
    data_source: Arc<dyn DataSource>,
}

impl Environment {
    pub fn new(
        id: impl Into<String>,
        transaction_factory: Arc<dyn TransactionFactory>,
        data_source: Arc<dyn DataSource>,
    ) -> Self {
        Self {
            id: id.into(),
            transaction_factory,
            data_source,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transaction_factory(&self) -> &Arc<dyn TransactionFactory> {
        &self.transaction_factory
    }

    pub fn data_source(&self) -> &Arc<dyn DataSource> {
        &self.data_source
    }
}
