//! Type catalog: the table of types a configuration document may name.
//!
//! Documents refer to strategies by type name (`mapcfg::transaction::JdbcTransactionFactory`)
//! or alias (`JDBC`). The catalog maps each fully-qualified type name to a
//! [`TypeDescriptor`] and, for instantiable strategies, a constructor that
//! yields a [`Component`] tagged with its capability.
//!
//! # Example
//!
//! ```
//! use mapcfg::{Interceptor, TypeCatalog, TypeDescriptor};
//!
//! #[derive(Debug, Default)]
//! struct AuditInterceptor;
//! impl Interceptor for AuditInterceptor {}
//!
//! let mut catalog = TypeCatalog::with_builtins();
//! catalog.register_interceptor(
//!     TypeDescriptor::new("app::plugins::AuditInterceptor").with_alias("audit"),
//!     AuditInterceptor::default,
//! );
//! assert!(catalog.instantiate_interceptor("app::plugins::AuditInterceptor").is_ok());
//! assert!(catalog.instantiate_object_factory("app::plugins::AuditInterceptor").is_err());
//! ```

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::environment::database_id::{DatabaseIdProvider, VendorDatabaseIdProvider};
use crate::environment::datasource::{
    DataSourceFactory, PooledDataSourceFactory, UnpooledDataSourceFactory,
};
use crate::environment::transaction::{
    JdbcTransactionFactory, ManagedTransactionFactory, TransactionFactory,
};
use crate::error::ConfigError;
use crate::factory::{
    DefaultObjectFactory, DefaultObjectWrapperFactory, DefaultProxyFactory,
    DefaultReflectorFactory, ObjectFactory, ObjectWrapperFactory, ProxyFactory, ReflectorFactory,
};
use crate::io::vfs::{CatalogVfs, Vfs};
use crate::mapping::statement::StatementDecl;
use crate::plugin::Interceptor;
use crate::types::type_handler::{ScalarTypeHandler, TypeHandler, BUILTIN_TYPE_HANDLERS};

/// Separator between namespace segments in type names.
pub const NAMESPACE_SEPARATOR: &str = "::";

/// Structural kind of a type, used to filter namespace scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Concrete,
    Abstract,
    Interface,
    Anonymous,
    Nested,
}

/// Static description of a named type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    name: String,
    kind: TypeKind,
    alias: Option<String>,
    statements: Vec<StatementDecl>,
}

impl TypeDescriptor {
    /// Concrete type with no alias hint.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Concrete,
            alias: None,
            statements: Vec::new(),
        }
    }

    /// Interface type, eligible for mapper binding.
    pub fn interface(name: impl Into<String>) -> Self {
        Self::new(name).with_kind(TypeKind::Interface)
    }

    pub fn with_kind(mut self, kind: TypeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Alias hint declared by the type itself.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Statement declared on a mapper interface method.
    pub fn with_statement(mut self, statement: StatementDecl) -> Self {
        self.statements.push(statement);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    pub fn statements(&self) -> &[StatementDecl] {
        &self.statements
    }

    /// Last path segment of the type name.
    pub fn simple_name(&self) -> &str {
        self.name
            .rsplit(NAMESPACE_SEPARATOR)
            .next()
            .unwrap_or(&self.name)
    }

    /// Alias used when none is given explicitly: the hint, else the simple name.
    pub fn default_alias(&self) -> &str {
        self.alias().unwrap_or_else(|| self.simple_name())
    }

    /// Whether this type lives under `namespace`, at any depth.
    pub fn is_under(&self, namespace: &str) -> bool {
        let namespace = namespace.trim_end_matches(NAMESPACE_SEPARATOR);
        self.name
            .strip_prefix(namespace)
            .map(|rest| rest.starts_with(NAMESPACE_SEPARATOR))
            .unwrap_or(false)
    }
}

impl From<&str> for TypeDescriptor {
    fn from(name: &str) -> Self {
        TypeDescriptor::new(name)
    }
}

type Constructor = Arc<dyn Fn() -> Component + Send + Sync>;

struct CatalogEntry {
    descriptor: TypeDescriptor,
    constructor: Option<(Capability, Constructor)>,
}

/// Table of known types and their constructors.
#[derive(Default)]
pub struct TypeCatalog {
    entries: IndexMap<String, CatalogEntry>,
}

macro_rules! components {
    ($( $variant:ident($trait_:ident) => $label:literal, $register:ident, $instantiate:ident; )+) => {
        /// What a constructed component can be used as.
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum Capability {
            $( $variant ),+
        }

        impl fmt::Display for Capability {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self {
                    $( Capability::$variant => f.write_str($label) ),+
                }
            }
        }

        /// Freshly constructed strategy instance, tagged by capability.
        #[derive(Debug)]
        pub enum Component {
            $( $variant(Box<dyn $trait_>) ),+
        }

        impl Component {
            pub fn capability(&self) -> Capability {
                match self {
                    $( Component::$variant(_) => Capability::$variant ),+
                }
            }
        }

        impl TypeCatalog {
            $(
                #[doc = concat!("Register a type constructible as ", $label, ".")]
                pub fn $register<D, F, T>(&mut self, descriptor: D, constructor: F)
                where
                    D: Into<TypeDescriptor>,
                    F: Fn() -> T + Send + Sync + 'static,
                    T: $trait_ + 'static,
                {
                    self.insert(
                        descriptor.into(),
                        Some((
                            Capability::$variant,
                            Arc::new(move || Component::$variant(Box::new(constructor()))),
                        )),
                    );
                }

                #[doc = concat!("Construct `type_name`, which must be ", $label, ".")]
                pub fn $instantiate(&self, type_name: &str) -> Result<Box<dyn $trait_>, ConfigError> {
                    match self.instantiate(type_name)? {
                        Component::$variant(instance) => Ok(instance),
                        other => Err(ConfigError::resolution(format!(
                            "Type '{}' is {}, expected {}",
                            type_name,
                            other.capability(),
                            $label
                        ))),
                    }
                }
            )+
        }
    };
}

components! {
    Interceptor(Interceptor) => "an interceptor", register_interceptor, instantiate_interceptor;
    ObjectFactory(ObjectFactory) => "an object factory", register_object_factory, instantiate_object_factory;
    ObjectWrapperFactory(ObjectWrapperFactory) => "an object wrapper factory", register_object_wrapper_factory, instantiate_object_wrapper_factory;
    ReflectorFactory(ReflectorFactory) => "a reflector factory", register_reflector_factory, instantiate_reflector_factory;
    ProxyFactory(ProxyFactory) => "a proxy factory", register_proxy_factory, instantiate_proxy_factory;
    Vfs(Vfs) => "a VFS", register_vfs, instantiate_vfs;
    TransactionFactory(TransactionFactory) => "a transaction factory", register_transaction_factory, instantiate_transaction_factory;
    DataSourceFactory(DataSourceFactory) => "a data source factory", register_data_source_factory, instantiate_data_source_factory;
    DatabaseIdProvider(DatabaseIdProvider) => "a database id provider", register_database_id_provider, instantiate_database_id_provider;
    TypeHandler(TypeHandler) => "a type handler", register_type_handler, instantiate_type_handler;
}

/// Scalar value types known to every catalog.
pub const VALUE_TYPES: &[&str] = &[
    "String", "i8", "i16", "i32", "i64", "f32", "f64", "bool", "Vec<u8>",
];

/// Log adapter types selectable through the `logImpl` setting.
pub const TRACING_LOG: &str = "mapcfg::logging::TracingLog";
pub const NO_LOGGING: &str = "mapcfg::logging::NoLogging";

/// Scripting language types selectable through `defaultScriptingLanguage`.
pub const DYNAMIC_LANGUAGE_DRIVER: &str = "mapcfg::scripting::DynamicLanguageDriver";
pub const RAW_LANGUAGE_DRIVER: &str = "mapcfg::scripting::RawLanguageDriver";

impl TypeCatalog {
    /// Empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding every built-in value type and strategy.
    pub fn with_builtins() -> Self {
        let mut catalog = Self::new();

        for value_type in VALUE_TYPES {
            catalog.register_type(TypeDescriptor::new(*value_type));
        }
        for name in [TRACING_LOG, NO_LOGGING, DYNAMIC_LANGUAGE_DRIVER, RAW_LANGUAGE_DRIVER] {
            catalog.register_type(TypeDescriptor::new(name));
        }

        catalog.register_transaction_factory(
            JdbcTransactionFactory::TYPE_NAME,
            JdbcTransactionFactory::default,
        );
        catalog.register_transaction_factory(
            ManagedTransactionFactory::TYPE_NAME,
            ManagedTransactionFactory::default,
        );
        catalog.register_data_source_factory(
            UnpooledDataSourceFactory::TYPE_NAME,
            UnpooledDataSourceFactory::default,
        );
        catalog.register_data_source_factory(
            PooledDataSourceFactory::TYPE_NAME,
            PooledDataSourceFactory::default,
        );
        catalog.register_database_id_provider(
            VendorDatabaseIdProvider::TYPE_NAME,
            VendorDatabaseIdProvider::default,
        );
        catalog.register_object_factory(DefaultObjectFactory::TYPE_NAME, DefaultObjectFactory::default);
        catalog.register_object_wrapper_factory(
            DefaultObjectWrapperFactory::TYPE_NAME,
            DefaultObjectWrapperFactory::default,
        );
        catalog.register_reflector_factory(
            DefaultReflectorFactory::TYPE_NAME,
            DefaultReflectorFactory::default,
        );
        catalog.register_proxy_factory(
            DefaultProxyFactory::TYPE_NAME,
            DefaultProxyFactory::default,
        );
        catalog.register_vfs(CatalogVfs::TYPE_NAME, CatalogVfs::default);

        for builtin in BUILTIN_TYPE_HANDLERS {
            catalog.register_type_handler(builtin.type_name, move || ScalarTypeHandler::new(builtin));
        }

        catalog
    }

    /// Register a type that cannot be instantiated (value types, interfaces).
    pub fn register_type(&mut self, descriptor: impl Into<TypeDescriptor>) {
        self.insert(descriptor.into(), None);
    }

    fn insert(&mut self, descriptor: TypeDescriptor, constructor: Option<(Capability, Constructor)>) {
        self.entries.insert(
            descriptor.name().to_string(),
            CatalogEntry {
                descriptor,
                constructor,
            },
        );
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.entries.contains_key(type_name)
    }

    /// Look up a type by its fully-qualified name.
    pub fn descriptor(&self, type_name: &str) -> Result<&TypeDescriptor, ConfigError> {
        self.entries
            .get(type_name)
            .map(|entry| &entry.descriptor)
            .ok_or_else(|| ConfigError::resolution(format!("Cannot find type '{}'", type_name)))
    }

    /// Capability of the type's constructor, if it has one.
    pub fn capability(&self, type_name: &str) -> Option<Capability> {
        self.entries
            .get(type_name)
            .and_then(|entry| entry.constructor.as_ref())
            .map(|(capability, _)| *capability)
    }

    /// Construct a new instance of `type_name`.
    pub fn instantiate(&self, type_name: &str) -> Result<Component, ConfigError> {
        let entry = self
            .entries
            .get(type_name)
            .ok_or_else(|| ConfigError::resolution(format!("Cannot find type '{}'", type_name)))?;

        let (_, constructor) = entry.constructor.as_ref().ok_or_else(|| {
            ConfigError::resolution(format!(
                "Type '{}' has no registered constructor and cannot be instantiated",
                type_name
            ))
        })?;

        Ok(constructor())
    }

    /// Every descriptor under `namespace`, in registration order.
    pub fn descriptors_under(&self, namespace: &str) -> Vec<TypeDescriptor> {
        self.entries
            .values()
            .filter(|entry| entry.descriptor.is_under(namespace))
            .map(|entry| entry.descriptor.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for TypeCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCatalog")
            .field("types", &self.entries.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_simple_name_and_default_alias() {
        let plain = TypeDescriptor::new("app::model::Author");
        assert_eq!(plain.simple_name(), "Author");
        assert_eq!(plain.default_alias(), "Author");

        let hinted = TypeDescriptor::new("app::model::Blog").with_alias("post");
        assert_eq!(hinted.default_alias(), "post");
    }

    #[test]
    fn test_is_under_matches_whole_segments() {
        let t = TypeDescriptor::new("app::model::inner::Comment");
        assert!(t.is_under("app::model"));
        assert!(t.is_under("app"));
        assert!(t.is_under("app::model::"));
        assert!(!t.is_under("app::mod"));
        assert!(!t.is_under("app::model::inner::Comment"));
    }

    #[test]
    fn test_builtins_instantiate_by_capability() {
        let catalog = TypeCatalog::with_builtins();

        assert!(catalog
            .instantiate_transaction_factory(JdbcTransactionFactory::TYPE_NAME)
            .is_ok());
        assert_eq!(
            catalog.capability(PooledDataSourceFactory::TYPE_NAME),
            Some(Capability::DataSourceFactory)
        );

        let err = catalog
            .instantiate_data_source_factory(JdbcTransactionFactory::TYPE_NAME)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert!(err.to_string().contains("a transaction factory"));

        // Short names like JDBC belong to the configuration's alias table.
        let jdbc = catalog.descriptor(JdbcTransactionFactory::TYPE_NAME).unwrap();
        assert_eq!(jdbc.alias(), None);
    }

    #[test]
    fn test_value_types_cannot_be_instantiated() {
        let catalog = TypeCatalog::with_builtins();
        assert!(catalog.contains("String"));
        let err = catalog.instantiate("String").unwrap_err();
        assert!(err.to_string().contains("no registered constructor"));
    }

    #[test]
    fn test_unknown_type() {
        let catalog = TypeCatalog::new();
        assert_eq!(catalog.instantiate("app::Missing").unwrap_err().kind(), ErrorKind::Resolution);
        assert!(catalog.descriptor("app::Missing").is_err());
    }

    #[test]
    fn test_descriptors_under_keeps_registration_order() {
        let mut catalog = TypeCatalog::new();
        catalog.register_type("app::model::B");
        catalog.register_type("app::other::X");
        catalog.register_type("app::model::A");

        let names: Vec<_> = catalog
            .descriptors_under("app::model")
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(names, vec!["app::model::B", "app::model::A"]);
    }
}
