//! One-shot assembly of a [`Configuration`] from a configuration document.
//!
//! Sections are read in a fixed order, whatever their order in the
//! document:
//!
//! 1. `properties`, which installs the substitution variables every later read uses
//! 2. `settings`, read and validated but not yet applied
//! 3. the `vfsImpl` setting
//! 4. `typeAliases`
//! 5. `plugins`
//! 6. `objectFactory`, `objectWrapperFactory`, `reflectorFactory`
//! 7. settings application
//! 8. `environments`
//! 9. `databaseIdProvider`
//! 10. `typeHandlers`
//! 11. `mappers`
//!
//! The first failure aborts assembly and is returned wrapped in
//! [`ConfigError::Parsing`].

use std::path::Path;
use std::sync::Arc;

use crate::environment::database_id::normalize_provider_type;
use crate::environment::Environment;
use crate::error::ConfigError;
use crate::io::resources::{FsResourceLoader, ResourceLoader};
use crate::mapping::mapper_parser::{MapperDocumentParser, YamlMapperParser};
use crate::parsing::node::{Document, Node, XNode};
use crate::parsing::yaml_loader;
use crate::properties::{overlay, parse_property_file, Properties};
use crate::session::configuration::Configuration;
use crate::session::settings;
use crate::types::catalog::TypeCatalog;
use crate::types::jdbc_type::JdbcType;
use crate::types::type_handler::TypeHandler;

/// Name of the document's root element.
pub const ROOT_ELEMENT: &str = "configuration";

/// Resource name reported for documents not read from a file.
const INLINE_SOURCE: &str = "inline configuration document";

/// Assembles one [`Configuration`] from a configuration document.
///
/// # Example
///
/// ```
/// use mapcfg::ConfigBuilder;
///
/// let yaml = r#"
/// configuration:
///   environments:
///     default: dev
///     environment:
///       - id: dev
///         transactionManager:
///           type: JDBC
///         dataSource:
///           type: UNPOOLED
///           property:
///             - name: url
///               value: postgres://localhost/app
/// "#;
///
/// let mut builder = ConfigBuilder::from_yaml_str(yaml).unwrap();
/// let config = builder.parse().unwrap();
/// assert_eq!(config.environment().unwrap().id(), "dev");
/// assert!(builder.parse().is_err());
/// ```
pub struct ConfigBuilder {
    parsed: bool,
    source: String,
    document: Document,
    environment: Option<String>,
    variables: Properties,
    catalog: Arc<TypeCatalog>,
    resource_loader: Arc<dyn ResourceLoader>,
    mapper_parser: Arc<dyn MapperDocumentParser>,
}

impl ConfigBuilder {
    /// Builder over an already-loaded root element.
    pub fn from_node(root: Node) -> Result<Self, ConfigError> {
        if root.name != ROOT_ELEMENT {
            return Err(ConfigError::Document(format!(
                "The root element must be '{}', found '{}'",
                ROOT_ELEMENT, root.name
            )));
        }

        Ok(Self {
            parsed: false,
            source: INLINE_SOURCE.to_string(),
            document: Document::new(root, Properties::new()),
            environment: None,
            variables: Properties::new(),
            catalog: Arc::new(TypeCatalog::with_builtins()),
            resource_loader: Arc::new(FsResourceLoader::new()),
            mapper_parser: Arc::new(YamlMapperParser),
        })
    }

    /// Builder over a YAML document held in memory.
    ///
    /// Resources are resolved relative to the working directory.
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        Self::from_node(yaml_loader::load_from_str(content)?)
    }

    /// Builder over a YAML document on disk.
    ///
    /// Resources are resolved relative to the document's directory.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut builder = Self::from_node(yaml_loader::load_from_file(path)?)?;
        builder.source = path.display().to_string();

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        builder.resource_loader = Arc::new(FsResourceLoader::new().with_root(base));
        Ok(builder)
    }

    /// Environment to select, overriding the document's `default`.
    pub fn environment(mut self, id: impl Into<String>) -> Self {
        self.environment = Some(id.into());
        self
    }

    /// Caller variables. These take precedence over every property source
    /// in the document.
    pub fn variables(mut self, variables: Properties) -> Self {
        self.document.set_variables(variables.clone());
        self.variables = variables;
        self
    }

    pub fn catalog(mut self, catalog: Arc<TypeCatalog>) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn resource_loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.resource_loader = loader;
        self
    }

    pub fn mapper_parser(mut self, parser: Arc<dyn MapperDocumentParser>) -> Self {
        self.mapper_parser = parser;
        self
    }

    /// Run every stage and return the assembled configuration.
    ///
    /// # Errors
    /// A second call fails with [`ConfigError::Usage`]. Any stage failure
    /// is returned as [`ConfigError::Parsing`] naming the resource being
    /// processed.
    pub fn parse(&mut self) -> Result<Configuration, ConfigError> {
        if self.parsed {
            return Err(ConfigError::Usage(
                "Each ConfigBuilder can only be used once.".to_string(),
            ));
        }
        self.parsed = true;

        tracing::info!("Assembling configuration from {}", self.source);
        let mut configuration = Configuration::with_catalog(Arc::clone(&self.catalog));
        configuration.set_variables(self.variables.clone());

        match self.parse_configuration(&mut configuration) {
            Ok(()) => {
                tracing::info!(
                    "Configuration assembled: environment={}, {} statements",
                    configuration.environment().map(Environment::id).unwrap_or("none"),
                    configuration.statements().len()
                );
                Ok(configuration)
            }
            Err(err @ ConfigError::Parsing { .. }) => Err(err),
            Err(err) => Err(ConfigError::parsing(self.source.clone(), err)),
        }
    }

    fn parse_configuration(&mut self, configuration: &mut Configuration) -> Result<(), ConfigError> {
        self.properties_element(configuration)?;

        let root = self.document.root();
        let settings = settings_as_properties(root.eval_node("settings"))?;
        load_custom_vfs(&settings, configuration)?;
        type_aliases_element(root.eval_node("typeAliases"), configuration)?;
        plugin_element(root.eval_node("plugins"), configuration)?;
        object_factory_element(root.eval_node("objectFactory"), configuration)?;
        object_wrapper_factory_element(root.eval_node("objectWrapperFactory"), configuration)?;
        reflector_factory_element(root.eval_node("reflectorFactory"), configuration)?;
        // Settings are applied only after the object factories are installed.
        settings::apply_all(configuration, &settings)?;
        environments_element(
            root.eval_node("environments"),
            self.environment.as_deref(),
            configuration,
        )?;
        database_id_provider_element(root.eval_node("databaseIdProvider"), configuration)?;
        type_handler_element(root.eval_node("typeHandlers"), configuration)?;
        self.mapper_element(root.eval_node("mappers"), configuration)?;
        Ok(())
    }

    /// Merge inline properties, the referenced property file and the caller
    /// variables, and install the result for every later read.
    fn properties_element(&mut self, configuration: &mut Configuration) -> Result<(), ConfigError> {
        let mut defaults = Properties::new();

        if let Some(context) = self.document.root().eval_node("properties") {
            defaults = context.children_as_properties();

            match (context.string_attribute("resource"), context.string_attribute("url")) {
                (Some(_), Some(_)) => {
                    return Err(ConfigError::validation(
                        "The properties element cannot specify both a URL and a resource based \
                         property file reference. Please specify one or the other.",
                    ));
                }
                (Some(resource), None) => {
                    let content = self.resource_loader.resource_as_string(&resource)?;
                    overlay(&mut defaults, &parse_property_file(&resource, &content)?);
                }
                (None, Some(url)) => {
                    let content = self.resource_loader.url_as_string(&url)?;
                    overlay(&mut defaults, &parse_property_file(&url, &content)?);
                }
                (None, None) => {}
            }
        }

        overlay(&mut defaults, &self.variables);
        tracing::debug!("Installed {} configuration variables", defaults.len());
        self.document.set_variables(defaults.clone());
        configuration.set_variables(defaults);
        Ok(())
    }

    fn mapper_element(
        &self,
        parent: Option<XNode<'_>>,
        configuration: &mut Configuration,
    ) -> Result<(), ConfigError> {
        let Some(parent) = parent else {
            return Ok(());
        };

        for child in parent.children() {
            if child.name() == "package" {
                let namespace = required_attribute(&child, "name")?;
                let count = configuration.add_mappers(&namespace)?;
                tracing::debug!("Bound {} mappers from namespace {}", count, namespace);
                continue;
            }

            let resource = child.string_attribute("resource");
            let url = child.string_attribute("url");
            let class = child.string_attribute("class");

            match (resource, url, class) {
                (Some(resource), None, None) => {
                    self.load_mapper(&resource, configuration, |loader| {
                        loader.resource_as_string(&resource)
                    })?;
                }
                (None, Some(url), None) => {
                    self.load_mapper(&url, configuration, |loader| loader.url_as_string(&url))?;
                }
                (None, None, Some(class)) => {
                    let type_name = configuration.resolve_alias(&class)?;
                    configuration.add_mapper(&type_name)?;
                }
                _ => {
                    return Err(ConfigError::validation(
                        "A mapper element may only specify a url, resource or class, but not more than one.",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Read one mapper document and hand it to the mapper parser. Failures
    /// name the mapper resource.
    fn load_mapper<F>(
        &self,
        resource: &str,
        configuration: &mut Configuration,
        read: F,
    ) -> Result<(), ConfigError>
    where
        F: FnOnce(&dyn ResourceLoader) -> Result<String, ConfigError>,
    {
        let result = read(self.resource_loader.as_ref())
            .and_then(|content| self.mapper_parser.parse(&content, resource, configuration));
        result.map_err(|e| ConfigError::parsing(resource, e))
    }
}

fn required_attribute(node: &XNode<'_>, name: &str) -> Result<String, ConfigError> {
    node.string_attribute(name).ok_or_else(|| {
        ConfigError::validation(format!(
            "The {} element requires a '{}' attribute",
            node.name(),
            name
        ))
    })
}

fn settings_as_properties(context: Option<XNode<'_>>) -> Result<Properties, ConfigError> {
    let props = context
        .map(|c| c.children_as_properties())
        .unwrap_or_default();
    settings::validate(&props)?;
    Ok(props)
}

fn load_custom_vfs(settings: &Properties, configuration: &mut Configuration) -> Result<(), ConfigError> {
    let Some(value) = settings.get("vfsImpl") else {
        return Ok(());
    };

    for name in value.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let type_name = configuration.resolve_alias(name)?;
        let vfs = configuration.catalog().instantiate_vfs(&type_name)?;
        configuration.add_vfs_impl(type_name, Arc::from(vfs));
    }
    Ok(())
}

fn type_aliases_element(
    parent: Option<XNode<'_>>,
    configuration: &mut Configuration,
) -> Result<(), ConfigError> {
    let Some(parent) = parent else {
        return Ok(());
    };

    for child in parent.children() {
        if child.name() == "package" {
            let namespace = required_attribute(&child, "name")?;
            configuration.register_aliases(&namespace)?;
            continue;
        }

        let alias = child.string_attribute("alias");
        let type_name = required_attribute(&child, "type")?;
        let descriptor = configuration
            .catalog()
            .descriptor(&type_name)
            .map(Clone::clone)
            .map_err(|e| {
                ConfigError::resolution(format!(
                    "Error registering typeAlias for '{}'. Cause: {}",
                    alias.as_deref().unwrap_or(&type_name),
                    e
                ))
            })?;

        let registry = configuration.type_alias_registry_mut();
        match alias {
            Some(alias) => registry.register_alias(&alias, descriptor.name()),
            None => registry.register_type(&descriptor),
        }
    }
    Ok(())
}

fn plugin_element(
    parent: Option<XNode<'_>>,
    configuration: &mut Configuration,
) -> Result<(), ConfigError> {
    let Some(parent) = parent else {
        return Ok(());
    };

    for child in parent.children() {
        let type_name = configuration.resolve_alias(&required_attribute(&child, "interceptor")?)?;
        let mut interceptor = configuration.catalog().instantiate_interceptor(&type_name)?;
        interceptor.set_properties(&child.children_as_properties())?;
        tracing::debug!("Added interceptor {}", type_name);
        configuration.add_interceptor(Arc::from(interceptor));
    }
    Ok(())
}

fn object_factory_element(
    context: Option<XNode<'_>>,
    configuration: &mut Configuration,
) -> Result<(), ConfigError> {
    if let Some(context) = context {
        let type_name = configuration.resolve_alias(&required_attribute(&context, "type")?)?;
        let mut factory = configuration.catalog().instantiate_object_factory(&type_name)?;
        factory.set_properties(&context.children_as_properties())?;
        configuration.set_object_factory(Arc::from(factory));
    }
    Ok(())
}

fn object_wrapper_factory_element(
    context: Option<XNode<'_>>,
    configuration: &mut Configuration,
) -> Result<(), ConfigError> {
    if let Some(context) = context {
        let type_name = configuration.resolve_alias(&required_attribute(&context, "type")?)?;
        let mut factory = configuration
            .catalog()
            .instantiate_object_wrapper_factory(&type_name)?;
        factory.set_properties(&context.children_as_properties())?;
        configuration.set_object_wrapper_factory(Arc::from(factory));
    }
    Ok(())
}

fn reflector_factory_element(
    context: Option<XNode<'_>>,
    configuration: &mut Configuration,
) -> Result<(), ConfigError> {
    if let Some(context) = context {
        let type_name = configuration.resolve_alias(&required_attribute(&context, "type")?)?;
        let mut factory = configuration.catalog().instantiate_reflector_factory(&type_name)?;
        factory.set_properties(&context.children_as_properties())?;
        configuration.set_reflector_factory(Arc::from(factory));
    }
    Ok(())
}

/// Select the environment named by the caller, else the document default,
/// and build it.
fn environments_element(
    context: Option<XNode<'_>>,
    requested: Option<&str>,
    configuration: &mut Configuration,
) -> Result<(), ConfigError> {
    let Some(context) = context else {
        return Ok(());
    };

    let selected = requested
        .map(str::to_string)
        .or_else(|| context.string_attribute("default"))
        .ok_or_else(|| ConfigError::selection("No environment specified."))?;

    // Every candidate must carry an id; the last one matching is selected.
    let mut chosen = None;
    for child in context.children().into_iter().filter(|c| c.name() == "environment") {
        let id = child
            .string_attribute("id")
            .ok_or_else(|| ConfigError::selection("Environment requires an id attribute."))?;
        if id == selected {
            chosen = Some((id, child));
        }
    }
    let (id, child) = chosen.ok_or_else(|| {
        ConfigError::selection(format!("Environment '{}' is not declared", selected))
    })?;

    let transaction_manager = child.eval_node("transactionManager").ok_or_else(|| {
        ConfigError::selection("Environment declaration requires a TransactionFactory.")
    })?;
    let data_source = child.eval_node("dataSource").ok_or_else(|| {
        ConfigError::selection("Environment declaration requires a DataSourceFactory.")
    })?;

    let tx_type = configuration.resolve_alias(&required_attribute(&transaction_manager, "type")?)?;
    let mut tx_factory = configuration
        .catalog()
        .instantiate_transaction_factory(&tx_type)?;
    tx_factory.set_properties(&transaction_manager.children_as_properties())?;

    let ds_type = configuration.resolve_alias(&required_attribute(&data_source, "type")?)?;
    let mut ds_factory = configuration
        .catalog()
        .instantiate_data_source_factory(&ds_type)?;
    ds_factory.set_properties(&data_source.children_as_properties())?;

    tracing::info!("Selected environment {} ({}, {})", id, tx_type, ds_type);
    configuration.set_environment(Environment::new(
        id,
        Arc::from(tx_factory),
        ds_factory.data_source(),
    ));
    Ok(())
}

fn database_id_provider_element(
    context: Option<XNode<'_>>,
    configuration: &mut Configuration,
) -> Result<(), ConfigError> {
    let Some(context) = context else {
        return Ok(());
    };

    let declared = required_attribute(&context, "type")?;
    let type_name = configuration.resolve_alias(normalize_provider_type(&declared))?;
    let mut provider = configuration
        .catalog()
        .instantiate_database_id_provider(&type_name)?;
    provider.set_properties(&context.children_as_properties())?;

    let data_source = configuration
        .environment()
        .map(|env| Arc::clone(env.data_source()));
    if let Some(data_source) = data_source {
        let database_id = provider.database_id(data_source.as_ref())?;
        tracing::debug!("Database id: {:?}", database_id);
        configuration.set_database_id(database_id);
    }
    Ok(())
}

fn type_handler_element(
    parent: Option<XNode<'_>>,
    configuration: &mut Configuration,
) -> Result<(), ConfigError> {
    let Some(parent) = parent else {
        return Ok(());
    };

    for child in parent.children() {
        if child.name() == "package" {
            let namespace = required_attribute(&child, "name")?;
            configuration.register_type_handlers(&namespace)?;
            continue;
        }

        let value_type = configuration.resolve_class(child.string_attribute("javaType").as_deref())?;
        let jdbc_type = child
            .string_attribute("jdbcType")
            .map(|name| {
                name.parse::<JdbcType>().map_err(|expected| {
                    ConfigError::invalid_value("jdbcType", name.as_str(), expected)
                })
            })
            .transpose()?;
        let handler_type = configuration.resolve_alias(&required_attribute(&child, "handler")?)?;
        let handler: Arc<dyn TypeHandler> = Arc::from(
            configuration
                .catalog()
                .instantiate_type_handler(&handler_type)?,
        );

        let registry = configuration.type_handler_registry_mut();
        match (value_type, jdbc_type) {
            (Some(value_type), Some(jdbc_type)) => {
                registry.register(&value_type, Some(jdbc_type), &handler_type, handler)
            }
            (Some(value_type), None) => registry.register_for_type(&value_type, &handler_type, handler),
            (None, _) => registry.register_handler(&handler_type, handler),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn build(yaml: &str) -> Result<Configuration, ConfigError> {
        ConfigBuilder::from_yaml_str(yaml)?.parse()
    }

    #[test]
    fn test_empty_configuration() {
        let config = build("configuration: {}\n").unwrap();
        assert!(config.environment().is_none());
        assert!(config.settings().cache_enabled);
    }

    #[test]
    fn test_root_must_be_configuration() {
        let err = ConfigBuilder::from_yaml_str("mapper: {}\n").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Document);
    }

    #[test]
    fn test_from_path_missing_document() {
        let err = ConfigBuilder::from_path("does/not/exist/mapcfg.yaml").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("mapcfg.yaml"));
    }

    #[test]
    fn test_second_parse_is_usage_error() {
        let mut builder = ConfigBuilder::from_yaml_str("configuration: {}\n").unwrap();
        builder.parse().unwrap();
        let err = builder.parse().unwrap_err();
        assert!(matches!(err, ConfigError::Usage(_)));
        assert!(err.to_string().contains("only be used once"));
    }

    #[test]
    fn test_failures_are_wrapped_with_source() {
        let err = build(
            "configuration:\n  settings:\n    setting:\n      - name: fooBarBaz\n        value: x\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Parsing { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);
        let message = err.to_string();
        assert!(message.starts_with("Error parsing configuration. Cause: "));
        assert!(message.contains("fooBarBaz"));
        assert!(message.contains(INLINE_SOURCE));
    }

    #[test]
    fn test_placeholders_in_environment_selection() {
        let yaml = r#"
configuration:
  properties:
    property:
      - name: env
        value: qa
  environments:
    default: ${env}
    environment:
      - id: qa
        transactionManager:
          type: MANAGED
        dataSource:
          type: UNPOOLED
"#;
        let config = build(yaml).unwrap();
        let env = config.environment().unwrap();
        assert_eq!(env.id(), "qa");
        assert!(env.transaction_factory().is_managed());
    }

    #[test]
    fn test_environment_without_any_id_source() {
        let yaml = r#"
configuration:
  environments:
    environment:
      - id: dev
        transactionManager:
          type: JDBC
        dataSource:
          type: UNPOOLED
"#;
        let err = build(yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Selection);
        assert!(err.to_string().contains("No environment specified."));
    }

    #[test]
    fn test_missing_data_source_declaration() {
        let yaml = r#"
configuration:
  environments:
    default: dev
    environment:
      - id: dev
        transactionManager:
          type: JDBC
"#;
        let err = build(yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Selection);
        assert!(err.to_string().contains("requires a DataSourceFactory"));
    }

    #[test]
    fn test_missing_transaction_manager_declaration() {
        let yaml = r#"
configuration:
  environments:
    default: dev
    environment:
      - id: dev
        dataSource:
          type: UNPOOLED
"#;
        let err = build(yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Selection);
        assert!(err.to_string().contains("requires a TransactionFactory"));
    }

    #[test]
    fn test_candidate_without_id_after_selected_one() {
        let yaml = r#"
configuration:
  environments:
    default: dev
    environment:
      - id: dev
        transactionManager:
          type: JDBC
        dataSource:
          type: UNPOOLED
      - transactionManager:
          type: JDBC
        dataSource:
          type: UNPOOLED
"#;
        let err = build(yaml).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Selection);
        assert!(err.to_string().contains("requires an id attribute"));
    }

    #[test]
    fn test_last_matching_environment_wins() {
        let yaml = r#"
configuration:
  environments:
    default: dev
    environment:
      - id: dev
        transactionManager:
          type: JDBC
        dataSource:
          type: UNPOOLED
      - id: dev
        transactionManager:
          type: MANAGED
        dataSource:
          type: UNPOOLED
"#;
        let config = build(yaml).unwrap();
        assert!(config.environment().unwrap().transaction_factory().is_managed());
    }

    #[test]
    fn test_explicit_type_handler_binding() {
        let yaml = r#"
configuration:
  typeHandlers:
    typeHandler:
      - javaType: string
        jdbcType: CLOB
        handler: mapcfg::types::StringTypeHandler
"#;
        let config = build(yaml).unwrap();
        let binding = config
            .type_handler_registry()
            .handler("String", Some(JdbcType::Clob))
            .unwrap();
        assert_eq!(binding.handler_type, "mapcfg::types::StringTypeHandler");
    }

    #[test]
    fn test_bad_jdbc_type_literal() {
        let yaml = r#"
configuration:
  typeHandlers:
    typeHandler:
      - javaType: string
        jdbcType: TEXT
        handler: mapcfg::types::StringTypeHandler
"#;
        let err = build(yaml).unwrap_err();
        assert!(matches!(err.root_cause(), ConfigError::InvalidValue { .. }));
    }
}
