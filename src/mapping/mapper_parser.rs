//! Mapper documents.
//!
//! A mapper document declares SQL for one namespace:
//!
//! ```yaml
//! mapper:
//!   namespace: app::mapper::UserMapper
//!   sql:
//!     - id: columns
//!       body: id, name, email
//!   select:
//!     - id: selectById
//!       body: "SELECT ${columns} FROM users WHERE id = #{id}"
//!     - id: selectById
//!       databaseId: pg
//!       body: "SELECT id, name, email FROM users WHERE id = $1"
//! ```
//!
//! Statements and fragments are registered as `namespace.id`. A statement
//! whose `databaseId` matches the configuration's database id takes
//! precedence over one without a `databaseId` in the same document; a
//! statement for another database is skipped.

use crate::error::ConfigError;
use crate::mapping::statement::{MappedStatement, SqlFragment, StatementKind};
use crate::parsing::node::{Document, XNode};
use crate::parsing::yaml_loader;
use crate::session::configuration::Configuration;
use crate::types::catalog::TypeKind;

/// Turns one mapper document into statements on the configuration.
pub trait MapperDocumentParser: Send + Sync {
    /// Parse `content`, loaded from `resource`, into `configuration`.
    fn parse(
        &self,
        content: &str,
        resource: &str,
        configuration: &mut Configuration,
    ) -> Result<(), ConfigError>;
}

/// Parser for YAML mapper documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlMapperParser;

impl MapperDocumentParser for YamlMapperParser {
    fn parse(
        &self,
        content: &str,
        resource: &str,
        configuration: &mut Configuration,
    ) -> Result<(), ConfigError> {
        if configuration.is_resource_loaded(resource) {
            tracing::debug!("Mapper resource {} already loaded", resource);
            return Ok(());
        }

        let root = yaml_loader::load_from_str(content)?;
        if root.name != "mapper" {
            return Err(ConfigError::Document(format!(
                "Mapper document {} must have a 'mapper' root element, found '{}'",
                resource, root.name
            )));
        }
        let document = Document::new(root, configuration.variables().clone());
        let mapper = document.root();

        let namespace = mapper
            .string_attribute("namespace")
            .filter(|ns| !ns.is_empty())
            .ok_or_else(|| ConfigError::validation("Mapper's namespace cannot be empty"))?;

        configuration.add_loaded_resource(resource);

        for fragment in mapper.children().iter().filter(|c| c.name() == "sql") {
            let id = required_id(fragment, &namespace)?;
            configuration.add_sql_fragment(SqlFragment {
                id: format!("{}.{}", namespace, id),
                body: fragment.string_attribute_or("body", ""),
                resource: resource.to_string(),
            })?;
        }

        let statements: Vec<(StatementKind, XNode<'_>)> = mapper
            .children()
            .into_iter()
            .filter_map(|child| child.name().parse::<StatementKind>().ok().map(|kind| (kind, child)))
            .collect();

        // Statements for the current database first, then database-neutral ones.
        let current = configuration.database_id().map(str::to_string);
        let mut vendor_ids = Vec::new();
        if let Some(current) = current.as_deref() {
            for (kind, node) in &statements {
                if node.string_attribute("databaseId").as_deref() == Some(current) {
                    let id = add_statement(configuration, &namespace, resource, *kind, node)?;
                    vendor_ids.push(id);
                }
            }
        }
        for (kind, node) in &statements {
            if node.string_attribute("databaseId").is_some() {
                continue;
            }
            let id = format!("{}.{}", namespace, required_id(node, &namespace)?);
            if vendor_ids.contains(&id) {
                continue;
            }
            add_statement(configuration, &namespace, resource, *kind, node)?;
        }

        bind_namespace(configuration, &namespace)?;

        tracing::info!(
            "Loaded mapper {} (namespace {})",
            resource,
            namespace
        );
        Ok(())
    }
}

fn required_id(node: &XNode<'_>, namespace: &str) -> Result<String, ConfigError> {
    node.string_attribute("id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            ConfigError::validation(format!(
                "A {} element in mapper {} has no id",
                node.name(),
                namespace
            ))
        })
}

fn add_statement(
    configuration: &mut Configuration,
    namespace: &str,
    resource: &str,
    kind: StatementKind,
    node: &XNode<'_>,
) -> Result<String, ConfigError> {
    let id = format!("{}.{}", namespace, required_id(node, namespace)?);
    configuration.add_mapped_statement(MappedStatement {
        id: id.clone(),
        kind,
        sql: node.string_attribute_or("body", ""),
        resource: resource.to_string(),
        database_id: node.string_attribute("databaseId"),
    })?;
    Ok(id)
}

/// Bind the interface a mapper's namespace names, if the catalog knows one.
fn bind_namespace(configuration: &mut Configuration, namespace: &str) -> Result<(), ConfigError> {
    let is_interface = configuration
        .catalog()
        .descriptor(namespace)
        .map(|d| d.kind() == TypeKind::Interface)
        .unwrap_or(false);

    if is_interface && !configuration.has_mapper(namespace) {
        configuration.add_loaded_resource(format!("namespace:{}", namespace));
        configuration.add_mapper(namespace)?;
    }
    Ok(())
}
