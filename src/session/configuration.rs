//! The runtime configuration produced by assembly.

use indexmap::IndexSet;
use serde::Serialize;
use std::sync::Arc;

use crate::environment::Environment;
use crate::error::ConfigError;
use crate::factory::{
    DefaultObjectFactory, DefaultObjectWrapperFactory, DefaultProxyFactory,
    DefaultReflectorFactory, ObjectFactory, ObjectWrapperFactory, ProxyFactory, ReflectorFactory,
};
use crate::io::vfs::{CatalogVfs, Vfs};
use crate::mapping::mapper_registry::MapperRegistry;
use crate::mapping::statement::{MappedStatement, SqlFragment, StatementRegistry};
use crate::plugin::{Interceptor, InterceptorChain};
use crate::properties::Properties;
use crate::session::settings::Settings;
use crate::types::alias_registry::TypeAliasRegistry;
use crate::types::catalog::{
    Capability, TypeCatalog, TypeDescriptor, TypeKind, DYNAMIC_LANGUAGE_DRIVER, NO_LOGGING,
    RAW_LANGUAGE_DRIVER, TRACING_LOG,
};
use crate::types::type_handler::TypeHandlerRegistry;

/// Aliases every configuration starts with, besides the value types.
const BUILTIN_ALIASES: &[(&str, &str)] = &[
    ("JDBC", crate::environment::JdbcTransactionFactory::TYPE_NAME),
    ("MANAGED", crate::environment::ManagedTransactionFactory::TYPE_NAME),
    ("UNPOOLED", crate::environment::UnpooledDataSourceFactory::TYPE_NAME),
    ("POOLED", crate::environment::PooledDataSourceFactory::TYPE_NAME),
    ("DB_VENDOR", crate::environment::VendorDatabaseIdProvider::TYPE_NAME),
    ("DEFAULT", DefaultProxyFactory::TYPE_NAME),
    ("TRACING", TRACING_LOG),
    ("NO_LOGGING", NO_LOGGING),
    ("DYNAMIC", DYNAMIC_LANGUAGE_DRIVER),
    ("RAW", RAW_LANGUAGE_DRIVER),
];

/// Mutable aggregate filled in by [`ConfigBuilder`](crate::ConfigBuilder).
///
/// Holds the scalar [`Settings`], the selected [`Environment`], the
/// installed strategies and the registries every stage writes into.
#[derive(Debug)]
pub struct Configuration {
    catalog: Arc<TypeCatalog>,
    settings: Settings,
    variables: Properties,
    environment: Option<Environment>,
    database_id: Option<String>,
    vfs_impls: Vec<(String, Arc<dyn Vfs>)>,
    default_vfs: CatalogVfs,
    type_alias_registry: TypeAliasRegistry,
    type_handler_registry: TypeHandlerRegistry,
    mapper_registry: MapperRegistry,
    statements: StatementRegistry,
    interceptor_chain: InterceptorChain,
    object_factory: Arc<dyn ObjectFactory>,
    object_wrapper_factory: Arc<dyn ObjectWrapperFactory>,
    reflector_factory: Arc<dyn ReflectorFactory>,
    proxy_factory: Arc<dyn ProxyFactory>,
    loaded_resources: IndexSet<String>,
}

impl Configuration {
    /// Configuration over the built-in catalog.
    pub fn new() -> Self {
        Self::with_catalog(Arc::new(TypeCatalog::with_builtins()))
    }

    /// Configuration resolving types against `catalog`.
    pub fn with_catalog(catalog: Arc<TypeCatalog>) -> Self {
        let mut type_alias_registry = TypeAliasRegistry::new();
        for (alias, type_name) in BUILTIN_ALIASES {
            type_alias_registry.register_alias(alias, type_name);
        }

        Self {
            catalog,
            settings: Settings::default(),
            variables: Properties::new(),
            environment: None,
            database_id: None,
            vfs_impls: Vec::new(),
            default_vfs: CatalogVfs,
            type_alias_registry,
            type_handler_registry: TypeHandlerRegistry::with_builtins(),
            mapper_registry: MapperRegistry::new(),
            statements: StatementRegistry::new(),
            interceptor_chain: InterceptorChain::new(),
            object_factory: Arc::new(DefaultObjectFactory),
            object_wrapper_factory: Arc::new(DefaultObjectWrapperFactory),
            reflector_factory: Arc::new(DefaultReflectorFactory::default()),
            proxy_factory: Arc::new(DefaultProxyFactory),
            loaded_resources: IndexSet::new(),
        }
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    pub fn variables(&self) -> &Properties {
        &self.variables
    }

    pub fn set_variables(&mut self, variables: Properties) {
        self.variables = variables;
    }

    pub fn environment(&self) -> Option<&Environment> {
        self.environment.as_ref()
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = Some(environment);
    }

    pub fn database_id(&self) -> Option<&str> {
        self.database_id.as_deref()
    }

    pub fn set_database_id(&mut self, database_id: Option<String>) {
        self.database_id = database_id;
    }

    // ---- Type resolution -------------------------------------------------

    /// Resolve an alias or fully-qualified type name to a type name.
    ///
    /// Aliases are matched ignoring case; a name that is not an alias must
    /// be a type known to the catalog.
    pub fn resolve_alias(&self, alias: &str) -> Result<String, ConfigError> {
        if let Some(type_name) = self.type_alias_registry.lookup(alias) {
            return Ok(type_name.to_string());
        }
        if self.catalog.contains(alias) {
            return Ok(alias.to_string());
        }
        Err(ConfigError::resolution(format!(
            "Could not resolve type alias '{}'.",
            alias
        )))
    }

    /// Like [`resolve_alias`](Self::resolve_alias), passing `None` through.
    pub fn resolve_class(&self, alias: Option<&str>) -> Result<Option<String>, ConfigError> {
        alias.map(|a| self.resolve_alias(a)).transpose()
    }

    pub fn type_alias_registry(&self) -> &TypeAliasRegistry {
        &self.type_alias_registry
    }

    pub fn type_alias_registry_mut(&mut self) -> &mut TypeAliasRegistry {
        &mut self.type_alias_registry
    }

    /// Register aliases for every concrete type under `namespace`.
    pub fn register_aliases(&mut self, namespace: &str) -> Result<usize, ConfigError> {
        let found = self.scan(namespace);
        self.type_alias_registry.register_scanned(namespace, &found)
    }

    // ---- Namespace scanning ----------------------------------------------

    /// Install a VFS declared through `vfsImpl`.
    pub fn add_vfs_impl(&mut self, type_name: impl Into<String>, vfs: Arc<dyn Vfs>) {
        let type_name = type_name.into();
        tracing::debug!("Installed VFS {} (valid: {})", type_name, vfs.is_valid());
        self.vfs_impls.push((type_name, vfs));
    }

    /// Type name of the last VFS installed, if any.
    pub fn vfs_impl(&self) -> Option<&str> {
        self.vfs_impls.last().map(|(name, _)| name.as_str())
    }

    /// VFS used for namespace scans: the first valid installed one, else the
    /// catalog itself.
    pub fn vfs(&self) -> &dyn Vfs {
        self.vfs_impls
            .iter()
            .map(|(_, vfs)| &**vfs)
            .find(|vfs| vfs.is_valid())
            .unwrap_or(&self.default_vfs)
    }

    /// Every type under `namespace`, as seen by the active VFS.
    pub fn scan(&self, namespace: &str) -> Vec<TypeDescriptor> {
        self.vfs().list(&self.catalog, namespace)
    }

    // ---- Strategies ------------------------------------------------------

    pub fn object_factory(&self) -> &Arc<dyn ObjectFactory> {
        &self.object_factory
    }

    pub fn set_object_factory(&mut self, factory: Arc<dyn ObjectFactory>) {
        self.object_factory = factory;
    }

    pub fn object_wrapper_factory(&self) -> &Arc<dyn ObjectWrapperFactory> {
        &self.object_wrapper_factory
    }

    pub fn set_object_wrapper_factory(&mut self, factory: Arc<dyn ObjectWrapperFactory>) {
        self.object_wrapper_factory = factory;
    }

    pub fn reflector_factory(&self) -> &Arc<dyn ReflectorFactory> {
        &self.reflector_factory
    }

    pub fn set_reflector_factory(&mut self, factory: Arc<dyn ReflectorFactory>) {
        self.reflector_factory = factory;
    }

    pub fn proxy_factory(&self) -> &Arc<dyn ProxyFactory> {
        &self.proxy_factory
    }

    pub fn set_proxy_factory(&mut self, factory: Arc<dyn ProxyFactory>) {
        self.proxy_factory = factory;
    }

    pub fn interceptor_chain(&self) -> &InterceptorChain {
        &self.interceptor_chain
    }

    pub fn add_interceptor(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptor_chain.add(interceptor);
    }

    // ---- Type handlers ---------------------------------------------------

    pub fn type_handler_registry(&self) -> &TypeHandlerRegistry {
        &self.type_handler_registry
    }

    pub fn type_handler_registry_mut(&mut self) -> &mut TypeHandlerRegistry {
        &mut self.type_handler_registry
    }

    /// Register every concrete type handler under `namespace`.
    pub fn register_type_handlers(&mut self, namespace: &str) -> Result<usize, ConfigError> {
        let mut count = 0;
        for descriptor in self.scan(namespace) {
            if descriptor.kind() != TypeKind::Concrete
                || self.catalog.capability(descriptor.name()) != Some(Capability::TypeHandler)
            {
                continue;
            }
            let handler = self.catalog.instantiate_type_handler(descriptor.name())?;
            self.type_handler_registry
                .register_handler(descriptor.name(), Arc::from(handler));
            count += 1;
        }
        tracing::debug!("Registered {} type handlers from namespace {}", count, namespace);
        Ok(count)
    }

    // ---- Mappers ---------------------------------------------------------

    pub fn mapper_registry(&self) -> &MapperRegistry {
        &self.mapper_registry
    }

    pub fn has_mapper(&self, type_name: &str) -> bool {
        self.mapper_registry.has_mapper(type_name)
    }

    /// Bind the mapper interface `type_name`.
    pub fn add_mapper(&mut self, type_name: &str) -> Result<(), ConfigError> {
        let descriptor = self.catalog.descriptor(type_name)?;
        self.mapper_registry
            .add_mapper(descriptor, &mut self.statements)?;
        Ok(())
    }

    /// Bind every mapper interface under `namespace`.
    pub fn add_mappers(&mut self, namespace: &str) -> Result<usize, ConfigError> {
        let mut count = 0;
        for descriptor in self.scan(namespace) {
            if self
                .mapper_registry
                .add_mapper(&descriptor, &mut self.statements)?
            {
                count += 1;
            }
        }
        Ok(count)
    }

    pub fn statements(&self) -> &StatementRegistry {
        &self.statements
    }

    pub fn add_mapped_statement(&mut self, statement: MappedStatement) -> Result<(), ConfigError> {
        self.statements.add_statement(statement)
    }

    pub fn add_sql_fragment(&mut self, fragment: SqlFragment) -> Result<(), ConfigError> {
        self.statements.add_fragment(fragment)
    }

    pub fn has_statement(&self, id: &str) -> bool {
        self.statements.has_statement(id)
    }

    pub fn mapped_statement(&self, id: &str) -> Option<&MappedStatement> {
        self.statements.statement(id)
    }

    pub fn is_resource_loaded(&self, resource: &str) -> bool {
        self.loaded_resources.contains(resource)
    }

    pub fn add_loaded_resource(&mut self, resource: impl Into<String>) {
        self.loaded_resources.insert(resource.into());
    }

    /// Serializable overview of what was assembled.
    pub fn summary(&self) -> ConfigurationSummary<'_> {
        ConfigurationSummary {
            environment: self.environment.as_ref().map(Environment::id),
            database_id: self.database_id(),
            vfs_impl: self.vfs_impl(),
            settings: &self.settings,
            variables: &self.variables,
            type_aliases: self.type_alias_registry.aliases().len(),
            type_handlers: self.type_handler_registry.handler_types(),
            interceptors: self
                .interceptor_chain
                .interceptors()
                .iter()
                .map(|i| format!("{:?}", i))
                .collect(),
            mappers: self.mapper_registry.mappers().collect(),
            statements: self.statements.statement_ids(),
            loaded_resources: self.loaded_resources.iter().map(String::as_str).collect(),
        }
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only overview of a [`Configuration`], used for reporting.
#[derive(Debug, Serialize)]
pub struct ConfigurationSummary<'a> {
    pub environment: Option<&'a str>,
    pub database_id: Option<&'a str>,
    pub vfs_impl: Option<&'a str>,
    pub settings: &'a Settings,
    pub variables: &'a Properties,
    pub type_aliases: usize,
    pub type_handlers: Vec<&'a str>,
    pub interceptors: Vec<String>,
    pub mappers: Vec<&'a str>,
    pub statements: Vec<&'a str>,
    pub loaded_resources: Vec<&'a str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::type_handler::TypeHandler;
    use crate::types::JdbcType;

    #[derive(Debug, Default)]
    struct MoneyHandler;

    impl TypeHandler for MoneyHandler {
        fn mapped_types(&self) -> Vec<String> {
            vec!["app::model::Money".to_string()]
        }

        fn mapped_jdbc_types(&self) -> Vec<JdbcType> {
            vec![JdbcType::Decimal]
        }
    }

    #[derive(Debug)]
    struct NeverValid;

    impl Vfs for NeverValid {
        fn is_valid(&self) -> bool {
            false
        }

        fn list(&self, _catalog: &TypeCatalog, _namespace: &str) -> Vec<TypeDescriptor> {
            Vec::new()
        }
    }

    #[derive(Debug)]
    struct Nothing;

    impl Vfs for Nothing {
        fn list(&self, _catalog: &TypeCatalog, _namespace: &str) -> Vec<TypeDescriptor> {
            Vec::new()
        }
    }

    fn catalog() -> Arc<TypeCatalog> {
        let mut catalog = TypeCatalog::with_builtins();
        catalog.register_type("app::model::Author");
        catalog.register_type(TypeDescriptor::new("app::model::Blog").with_alias("post"));
        catalog.register_type(TypeDescriptor::interface("app::model::Named"));
        catalog.register_type_handler("app::handlers::MoneyHandler", MoneyHandler::default);
        Arc::new(catalog)
    }

    #[test]
    fn test_builtin_aliases_resolve() {
        let config = Configuration::new();
        assert_eq!(
            config.resolve_alias("jdbc").unwrap(),
            crate::environment::JdbcTransactionFactory::TYPE_NAME
        );
        assert_eq!(config.resolve_alias("int").unwrap(), "i32");
        assert_eq!(config.resolve_alias("TRACING").unwrap(), TRACING_LOG);
        assert_eq!(config.resolve_class(None).unwrap(), None);
    }

    #[test]
    fn test_unknown_alias_is_resolution_error() {
        let config = Configuration::new();
        let err = config.resolve_alias("nope").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert!(err.to_string().contains("Could not resolve type alias 'nope'"));
    }

    #[test]
    fn test_register_aliases_by_namespace() {
        let mut config = Configuration::with_catalog(catalog());
        let count = config.register_aliases("app::model").unwrap();

        assert_eq!(count, 2);
        assert_eq!(config.resolve_alias("author").unwrap(), "app::model::Author");
        assert_eq!(config.resolve_alias("POST").unwrap(), "app::model::Blog");
        assert!(config.resolve_alias("Named").is_err());
    }

    #[test]
    fn test_register_type_handlers_by_namespace() {
        let mut config = Configuration::with_catalog(catalog());
        assert_eq!(config.register_type_handlers("app::handlers").unwrap(), 1);

        let binding = config
            .type_handler_registry()
            .handler("app::model::Money", Some(JdbcType::Decimal))
            .unwrap();
        assert_eq!(binding.handler_type, "app::handlers::MoneyHandler");
    }

    #[test]
    fn test_first_valid_vfs_is_used_and_last_is_reported() {
        let mut config = Configuration::with_catalog(catalog());
        assert_eq!(config.scan("app::model").len(), 3);

        config.add_vfs_impl("app::vfs::NeverValid", Arc::new(NeverValid));
        assert_eq!(config.scan("app::model").len(), 3);

        config.add_vfs_impl("app::vfs::Nothing", Arc::new(Nothing));
        assert!(config.scan("app::model").is_empty());
        assert_eq!(config.vfs_impl(), Some("app::vfs::Nothing"));
    }

    #[test]
    fn test_loaded_resources() {
        let mut config = Configuration::new();
        assert!(!config.is_resource_loaded("mappers/user.yaml"));
        config.add_loaded_resource("mappers/user.yaml");
        assert!(config.is_resource_loaded("mappers/user.yaml"));
    }
}
