//! Database identification for vendor-specific statements.

use std::fmt;

use crate::environment::datasource::DataSource;
use crate::error::ConfigError;
use crate::properties::Properties;

/// Legacy alias accepted in place of `DB_VENDOR`.
pub const LEGACY_VENDOR_ALIAS: &str = "VENDOR";

/// Alias of the built-in vendor provider.
pub const VENDOR_ALIAS: &str = "DB_VENDOR";

/// Works out which database a connection source talks to.
pub trait DatabaseIdProvider: fmt::Debug + Send + Sync {
    fn set_properties(&mut self, _properties: &Properties) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Identifier for the database behind `data_source`, if one applies.
    fn database_id(&self, data_source: &dyn DataSource) -> Result<Option<String>, ConfigError>;
}

/// Maps the product name reported by the data source to an identifier.
///
/// Without properties the product name itself is the identifier. With
/// properties, the value of the first property whose key occurs in the
/// product name is used; no match means no identifier.
#[derive(Debug, Clone, Default)]
pub struct VendorDatabaseIdProvider {
    properties: Properties,
}

impl VendorDatabaseIdProvider {
    pub const TYPE_NAME: &'static str = "mapcfg::database_id::VendorDatabaseIdProvider";
}

impl DatabaseIdProvider for VendorDatabaseIdProvider {
    fn set_properties(&mut self, properties: &Properties) -> Result<(), ConfigError> {
        self.properties = properties.clone();
        Ok(())
    }

    fn database_id(&self, data_source: &dyn DataSource) -> Result<Option<String>, ConfigError> {
        let product_name = match data_source.product_name() {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!("Could not get a database id from the data source: {}", e);
                return Ok(None);
            }
        };

        if self.properties.is_empty() {
            return Ok(Some(product_name));
        }

        Ok(self
            .properties
            .iter()
            .find(|(key, _)| product_name.contains(key.as_str()))
            .map(|(_, value)| value.clone()))
    }
}

/// Rewrite the legacy provider alias to its current name.
pub fn normalize_provider_type(type_name: &str) -> &str {
    if type_name == LEGACY_VENDOR_ALIAS {
        VENDOR_ALIAS
    } else {
        type_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::datasource::UnpooledDataSource;

    fn source(url: Option<&str>) -> UnpooledDataSource {
        UnpooledDataSource {
            url: url.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_product_name_without_properties() {
        let provider = VendorDatabaseIdProvider::default();
        let id = provider.database_id(&source(Some("jdbc:mysql://db/app"))).unwrap();
        assert_eq!(id.as_deref(), Some("MySQL"));
    }

    #[test]
    fn test_property_mapping() {
        let mut provider = VendorDatabaseIdProvider::default();
        let mut props = Properties::new();
        props.insert("Oracle".to_string(), "oracle".to_string());
        props.insert("PostgreSQL".to_string(), "pg".to_string());
        provider.set_properties(&props).unwrap();

        let id = provider.database_id(&source(Some("postgres://db/app"))).unwrap();
        assert_eq!(id.as_deref(), Some("pg"));

        let none = provider.database_id(&source(Some("sqlite:app.db"))).unwrap();
        assert_eq!(none, None);
    }

    #[test]
    fn test_missing_url_yields_no_id() {
        let provider = VendorDatabaseIdProvider::default();
        assert_eq!(provider.database_id(&source(None)).unwrap(), None);
    }

    #[test]
    fn test_legacy_alias() {
        assert_eq!(normalize_provider_type("VENDOR"), "DB_VENDOR");
        assert_eq!(normalize_provider_type("app::MyProvider"), "app::MyProvider");
    }
}
