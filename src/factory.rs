//! Object creation strategies installed on the configuration.
//!
//! Each strategy has a default that the configuration starts with; a
//! document may replace it through the `objectFactory`,
//! `objectWrapperFactory` and `reflectorFactory` sections, or the
//! `proxyFactory` setting.

use std::fmt;

use crate::error::ConfigError;
use crate::properties::{parse_bool, Properties};

/// Creates result objects.
pub trait ObjectFactory: fmt::Debug + Send + Sync {
    fn set_properties(&mut self, _properties: &Properties) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Whether instances of `type_name` hold many values.
    fn is_collection(&self, type_name: &str) -> bool;
}

/// Decides which types get a custom property accessor.
pub trait ObjectWrapperFactory: fmt::Debug + Send + Sync {
    fn set_properties(&mut self, _properties: &Properties) -> Result<(), ConfigError> {
        Ok(())
    }

    fn has_wrapper_for(&self, type_name: &str) -> bool;
}

/// Supplies cached type metadata.
pub trait ReflectorFactory: fmt::Debug + Send + Sync {
    fn set_properties(&mut self, _properties: &Properties) -> Result<(), ConfigError> {
        Ok(())
    }

    fn is_class_cache_enabled(&self) -> bool;
}

/// Builds lazy-loading proxies.
pub trait ProxyFactory: fmt::Debug + Send + Sync {
    fn set_properties(&mut self, _properties: &Properties) -> Result<(), ConfigError> {
        Ok(())
    }
}

const COLLECTION_PREFIXES: &[&str] = &[
    "Vec<",
    "VecDeque<",
    "LinkedList<",
    "HashSet<",
    "BTreeSet<",
    "IndexSet<",
];

#[derive(Debug, Clone, Default)]
pub struct DefaultObjectFactory;

impl DefaultObjectFactory {
    pub const TYPE_NAME: &'static str = "mapcfg::factory::DefaultObjectFactory";
}

impl ObjectFactory for DefaultObjectFactory {
    fn is_collection(&self, type_name: &str) -> bool {
        let simple = type_name
            .rsplit("::")
            .next()
            .unwrap_or(type_name);
        COLLECTION_PREFIXES
            .iter()
            .any(|prefix| simple.starts_with(prefix) || type_name.starts_with(prefix))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefaultObjectWrapperFactory;

impl DefaultObjectWrapperFactory {
    pub const TYPE_NAME: &'static str = "mapcfg::factory::DefaultObjectWrapperFactory";
}

impl ObjectWrapperFactory for DefaultObjectWrapperFactory {
    fn has_wrapper_for(&self, _type_name: &str) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct DefaultReflectorFactory {
    class_cache_enabled: bool,
}

impl DefaultReflectorFactory {
    pub const TYPE_NAME: &'static str = "mapcfg::factory::DefaultReflectorFactory";
}

impl Default for DefaultReflectorFactory {
    fn default() -> Self {
        Self {
            class_cache_enabled: true,
        }
    }
}

impl ReflectorFactory for DefaultReflectorFactory {
    fn set_properties(&mut self, properties: &Properties) -> Result<(), ConfigError> {
        if let Some(value) = properties.get("classCacheEnabled") {
            self.class_cache_enabled = parse_bool("classCacheEnabled", value)?;
        }
        Ok(())
    }

    fn is_class_cache_enabled(&self) -> bool {
        self.class_cache_enabled
    }
}

#[derive(Debug, Clone, Default)]
pub struct DefaultProxyFactory;

impl DefaultProxyFactory {
    pub const TYPE_NAME: &'static str = "mapcfg::factory::DefaultProxyFactory";
}

impl ProxyFactory for DefaultProxyFactory {}
