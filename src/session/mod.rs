//! The runtime configuration and its settings.

pub mod configuration;
pub mod settings;

pub use configuration::{Configuration, ConfigurationSummary};
pub use settings::{
    AutoMappingBehavior, AutoMappingUnknownColumnBehavior, ExecutorType, LocalCacheScope, Settings,
    SETTINGS,
};
