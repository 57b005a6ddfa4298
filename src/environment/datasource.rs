//! Connection sources and the factories that configure them.
//!
//! Factories receive the `dataSource` properties of the selected environment.
//! Property names are checked: an unknown key fails rather than being
//! silently dropped. Keys prefixed with `driver.` are passed through to the
//! driver untouched.

use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::properties::{parse_bool, parse_int, Properties};

/// Prefix of properties handed to the driver as-is.
pub const DRIVER_PROPERTY_PREFIX: &str = "driver.";

/// A source of database connections.
pub trait DataSource: fmt::Debug + Send + Sync {
    /// Connection URL, if configured.
    fn url(&self) -> Option<&str>;

    /// Name of the database product behind this source.
    fn product_name(&self) -> Result<String, ConfigError>;
}

/// Builds a [`DataSource`] from declared properties.
pub trait DataSourceFactory: fmt::Debug + Send + Sync {
    fn set_properties(&mut self, properties: &Properties) -> Result<(), ConfigError>;

    fn data_source(&self) -> Arc<dyn DataSource>;
}

/// Opens a fresh connection for every request.
#[derive(Debug, Clone, Default)]
pub struct UnpooledDataSource {
    pub driver: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub auto_commit: Option<bool>,
    pub default_transaction_isolation_level: Option<i32>,
    pub driver_properties: Properties,
}

impl UnpooledDataSource {
    /// Apply one property. Returns `false` if the key is not recognised.
    fn apply_property(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        if let Some(driver_key) = key.strip_prefix(DRIVER_PROPERTY_PREFIX) {
            self.driver_properties
                .insert(driver_key.to_string(), value.to_string());
            return Ok(true);
        }

        match key {
            "driver" => self.driver = Some(value.to_string()),
            "url" => self.url = Some(value.to_string()),
            "username" => self.username = Some(value.to_string()),
            "password" => self.password = Some(value.to_string()),
            "autoCommit" => self.auto_commit = Some(parse_bool(key, value)?),
            "defaultTransactionIsolationLevel" => {
                self.default_transaction_isolation_level = Some(parse_int(key, value)?)
            }
            _ => return Ok(false),
        }
        Ok(true)
    }
}

impl DataSource for UnpooledDataSource {
    fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn product_name(&self) -> Result<String, ConfigError> {
        let url = self.url.as_deref().ok_or_else(|| {
            ConfigError::resolution("Data source has no url; cannot determine the database product")
        })?;
        product_name_from_url(url)
    }
}

/// Pool sizing and health-check options.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub maximum_active_connections: u32,
    pub maximum_idle_connections: u32,
    pub maximum_checkout_time_ms: u64,
    pub time_to_wait_ms: u64,
    pub ping_query: String,
    pub ping_enabled: bool,
    pub ping_connections_not_used_for_ms: u64,
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            maximum_active_connections: 10,
            maximum_idle_connections: 5,
            maximum_checkout_time_ms: 20_000,
            time_to_wait_ms: 20_000,
            ping_query: "NO PING QUERY SET".to_string(),
            ping_enabled: false,
            ping_connections_not_used_for_ms: 0,
        }
    }
}

/// Reuses connections from a bounded pool.
#[derive(Debug, Clone, Default)]
pub struct PooledDataSource {
    pub unpooled: UnpooledDataSource,
    pub pool: PoolSettings,
}

impl PooledDataSource {
    fn apply_property(&mut self, key: &str, value: &str) -> Result<bool, ConfigError> {
        match key {
            "poolMaximumActiveConnections" => {
                self.pool.maximum_active_connections = parse_int(key, value)?
            }
            "poolMaximumIdleConnections" => {
                self.pool.maximum_idle_connections = parse_int(key, value)?
            }
            "poolMaximumCheckoutTime" => self.pool.maximum_checkout_time_ms = parse_int(key, value)?,
            "poolTimeToWait" => self.pool.time_to_wait_ms = parse_int(key, value)?,
            "poolPingQuery" => self.pool.ping_query = value.to_string(),
            "poolPingEnabled" => self.pool.ping_enabled = parse_bool(key, value)?,
            "poolPingConnectionsNotUsedFor" => {
                self.pool.ping_connections_not_used_for_ms = parse_int(key, value)?
            }
            _ => return self.unpooled.apply_property(key, value),
        }
        Ok(true)
    }
}

impl DataSource for PooledDataSource {
    fn url(&self) -> Option<&str> {
        self.unpooled.url()
    }

    fn product_name(&self) -> Result<String, ConfigError> {
        self.unpooled.product_name()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnpooledDataSourceFactory {
    data_source: UnpooledDataSource,
}

impl UnpooledDataSourceFactory {
    pub const TYPE_NAME: &'static str = "mapcfg::datasource::UnpooledDataSourceFactory";
}

impl DataSourceFactory for UnpooledDataSourceFactory {
    fn set_properties(&mut self, properties: &Properties) -> Result<(), ConfigError> {
        for (key, value) in properties {
            if !self.data_source.apply_property(key, value)? {
                return Err(unknown_property(key));
            }
        }
        Ok(())
    }

    fn data_source(&self) -> Arc<dyn DataSource> {
        Arc::new(self.data_source.clone())
    }
}

#[derive(Debug, Clone, Default)]
pub struct PooledDataSourceFactory {
    data_source: PooledDataSource,
}

impl PooledDataSourceFactory {
    pub const TYPE_NAME: &'static str = "mapcfg::datasource::PooledDataSourceFactory";
}

impl DataSourceFactory for PooledDataSourceFactory {
    fn set_properties(&mut self, properties: &Properties) -> Result<(), ConfigError> {
        for (key, value) in properties {
            if !self.data_source.apply_property(key, value)? {
                return Err(unknown_property(key));
            }
        }
        Ok(())
    }

    fn data_source(&self) -> Arc<dyn DataSource> {
        Arc::new(self.data_source.clone())
    }
}

fn unknown_property(key: &str) -> ConfigError {
    ConfigError::validation(format!("Unknown DataSource property: {}", key))
}

/// Derive a product name from a connection URL's scheme.
///
/// A leading `jdbc:` is ignored. Unrecognised schemes are returned as-is.
pub fn product_name_from_url(url: &str) -> Result<String, ConfigError> {
    let rest = url.strip_prefix("jdbc:").unwrap_or(url);
    let scheme = rest
        .split(':')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ConfigError::resolution(format!("Cannot read a scheme from url '{}'", url)))?;

    let name = match scheme.to_ascii_lowercase().as_str() {
        "postgres" | "postgresql" => "PostgreSQL",
        "mysql" => "MySQL",
        "mariadb" => "MariaDB",
        "sqlite" => "SQLite",
        "h2" => "H2",
        "hsqldb" => "HSQL Database Engine",
        "derby" => "Apache Derby",
        "oracle" => "Oracle",
        "sqlserver" => "Microsoft SQL Server",
        "db2" => "DB2",
        _ => scheme,
    };
    Ok(name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_unpooled_properties_and_driver_passthrough() {
        let mut factory = UnpooledDataSourceFactory::default();
        factory
            .set_properties(&props(&[
                ("driver", "org.postgresql.Driver"),
                ("url", "jdbc:postgresql://localhost/app"),
                ("username", "dev"),
                ("driver.sslmode", "disable"),
            ]))
            .unwrap();

        let ds = factory.data_source();
        assert_eq!(ds.url(), Some("jdbc:postgresql://localhost/app"));
        assert_eq!(ds.product_name().unwrap(), "PostgreSQL");
        assert_eq!(factory.data_source.driver_properties["sslmode"], "disable");
    }

    #[test]
    fn test_unknown_property_rejected() {
        let mut factory = UnpooledDataSourceFactory::default();
        let err = factory
            .set_properties(&props(&[("poolMaximumIdleConnections", "3")]))
            .unwrap_err();
        assert!(err.to_string().contains("Unknown DataSource property: poolMaximumIdleConnections"));
    }

    #[test]
    fn test_pooled_defaults_and_overrides() {
        let mut factory = PooledDataSourceFactory::default();
        assert_eq!(factory.data_source.pool.maximum_active_connections, 10);

        factory
            .set_properties(&props(&[
                ("url", "mysql://db/app"),
                ("poolMaximumActiveConnections", "25"),
                ("poolPingEnabled", "true"),
            ]))
            .unwrap();

        assert_eq!(factory.data_source.pool.maximum_active_connections, 25);
        assert!(factory.data_source.pool.ping_enabled);
        assert_eq!(factory.data_source.pool.maximum_idle_connections, 5);
        assert_eq!(factory.data_source().product_name().unwrap(), "MySQL");
    }

    #[test]
    fn test_bad_pool_number() {
        let mut factory = PooledDataSourceFactory::default();
        let err = factory
            .set_properties(&props(&[("poolTimeToWait", "soon")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_product_name_from_url() {
        assert_eq!(product_name_from_url("jdbc:h2:mem:test").unwrap(), "H2");
        assert_eq!(product_name_from_url("sqlite::memory:").unwrap(), "SQLite");
        assert_eq!(product_name_from_url("cockroach://x").unwrap(), "cockroach");
        assert!(product_name_from_url(":nothing").is_err());
    }
}
