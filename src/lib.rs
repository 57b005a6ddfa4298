//! # mapcfg: Configuration Assembly for a SQL Mapping Layer
//!
//! mapcfg reads a YAML configuration document and assembles a single,
//! fully-validated [`Configuration`] for a data-access layer: settings,
//! the selected environment, installed strategies, type aliases, type
//! handlers, interceptors and mapped statements.
//!
//! ## Features
//!
//! - **Fixed-order assembly**: sections are processed in a fixed order so later stages can rely on earlier ones
//! - **Layered variables**: inline properties < property file < caller variables, substituted into every later `${...}`
//! - **Checked settings**: unknown setting names fail fast against a static table of typed setters
//! - **Named constructors**: strategies are resolved by alias or type name through a [`TypeCatalog`]
//! - **Pluggable scanning**: namespace scans go through an injectable [`Vfs`]
//!
//! ## Example
//!
//! ```yaml
//! configuration:
//!   properties:
//!     resource: db.properties
//!   settings:
//!     setting:
//!       - name: mapUnderscoreToCamelCase
//!         value: true
//!   typeAliases:
//!     package:
//!       - name: app::model
//!   environments:
//!     default: dev
//!     environment:
//!       - id: dev
//!         transactionManager:
//!           type: JDBC
//!         dataSource:
//!           type: POOLED
//!           property:
//!             - name: url
//!               value: ${url}
//!   mappers:
//!     mapper:
//!       - resource: mappers/user.yaml
//! ```

#[macro_use]
mod literal_enum;

// Core modules
pub mod error;
pub mod properties;

// Document reading
pub mod parsing;

// Resources and namespace scanning
pub mod io;

// Type naming and resolution
pub mod types;

// Pluggable strategies
pub mod environment;
pub mod factory;
pub mod plugin;

// Statements and mapper sources
pub mod mapping;

// Runtime configuration
pub mod session;

// Assembly pipeline
pub mod builder;

// Re-export key types
pub use builder::ConfigBuilder;
pub use error::{ConfigError, ErrorKind};
pub use properties::Properties;
pub use session::{Configuration, ConfigurationSummary, Settings};

pub use environment::{
    DataSource, DataSourceFactory, DatabaseIdProvider, Environment, TransactionFactory,
};
pub use factory::{ObjectFactory, ObjectWrapperFactory, ProxyFactory, ReflectorFactory};
pub use io::{FsResourceLoader, ResourceLoader, Vfs};
pub use mapping::{MappedStatement, MapperDocumentParser, StatementDecl, StatementKind};
pub use plugin::{Interceptor, InterceptorChain};
pub use types::{JdbcType, TypeCatalog, TypeDescriptor, TypeHandler, TypeKind};
