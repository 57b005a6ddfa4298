//! Runtime settings and the table of settable names.
//!
//! Every name a document may use under `settings` is listed in [`SETTINGS`]
//! together with the function that writes it onto a [`Configuration`].
//! Validation is a lookup in that table; application calls the function.
//! Names absent from the document keep the defaults of [`Settings::default`].

use indexmap::IndexSet;
use serde::Serialize;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::properties::{parse_bool, parse_int, Properties};
use crate::session::configuration::Configuration;
use crate::types::jdbc_type::JdbcType;

literal_enum! {
    /// How result columns are mapped onto properties automatically.
    pub enum AutoMappingBehavior {
        None => "NONE",
        Partial => "PARTIAL",
        Full => "FULL",
    }
}

literal_enum! {
    /// What to do with a result column that matches no property.
    pub enum AutoMappingUnknownColumnBehavior {
        None => "NONE",
        Warning => "WARNING",
        Failing => "FAILING",
    }
}

literal_enum! {
    pub enum ExecutorType {
        Simple => "SIMPLE",
        Reuse => "REUSE",
        Batch => "BATCH",
    }
}

literal_enum! {
    pub enum LocalCacheScope {
        Session => "SESSION",
        Statement => "STATEMENT",
    }
}

/// Methods that trigger loading of every lazy property.
pub const DEFAULT_LAZY_LOAD_TRIGGER_METHODS: &[&str] = &["equals", "clone", "hashCode", "toString"];

/// Scalar knobs of a configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub auto_mapping_behavior: AutoMappingBehavior,
    pub auto_mapping_unknown_column_behavior: AutoMappingUnknownColumnBehavior,
    pub cache_enabled: bool,
    pub proxy_factory: Option<String>,
    pub lazy_loading_enabled: bool,
    pub aggressive_lazy_loading: bool,
    pub multiple_result_sets_enabled: bool,
    pub use_column_label: bool,
    pub use_generated_keys: bool,
    pub default_executor_type: ExecutorType,
    pub default_statement_timeout: Option<i32>,
    pub default_fetch_size: Option<i32>,
    pub map_underscore_to_camel_case: bool,
    pub safe_row_bounds_enabled: bool,
    pub local_cache_scope: LocalCacheScope,
    pub jdbc_type_for_null: JdbcType,
    pub lazy_load_trigger_methods: IndexSet<String>,
    pub safe_result_handler_enabled: bool,
    pub default_scripting_language: Option<String>,
    pub default_enum_type_handler: Option<String>,
    pub call_setters_on_nulls: bool,
    pub use_actual_param_name: bool,
    pub return_instance_for_empty_row: bool,
    pub log_prefix: Option<String>,
    pub log_impl: Option<String>,
    pub configuration_factory: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_mapping_behavior: AutoMappingBehavior::Partial,
            auto_mapping_unknown_column_behavior: AutoMappingUnknownColumnBehavior::None,
            cache_enabled: true,
            proxy_factory: None,
            lazy_loading_enabled: false,
            aggressive_lazy_loading: false,
            multiple_result_sets_enabled: true,
            use_column_label: true,
            use_generated_keys: false,
            default_executor_type: ExecutorType::Simple,
            default_statement_timeout: None,
            default_fetch_size: None,
            map_underscore_to_camel_case: false,
            safe_row_bounds_enabled: false,
            local_cache_scope: LocalCacheScope::Session,
            jdbc_type_for_null: JdbcType::Other,
            lazy_load_trigger_methods: DEFAULT_LAZY_LOAD_TRIGGER_METHODS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            safe_result_handler_enabled: true,
            default_scripting_language: None,
            default_enum_type_handler: None,
            call_setters_on_nulls: false,
            use_actual_param_name: true,
            return_instance_for_empty_row: false,
            log_prefix: None,
            log_impl: None,
            configuration_factory: None,
        }
    }
}

/// One settable name and its typed setter.
pub struct SettingDef {
    pub name: &'static str,
    pub apply: fn(&mut Configuration, &str) -> Result<(), ConfigError>,
}

fn literal<T: FromStr<Err = String>>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .parse::<T>()
        .map_err(|expected| ConfigError::invalid_value(name, value, expected))
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

macro_rules! settings_table {
    ($( $name:literal => fn $setter:ident($config:ident, $value:ident) $body:block )+) => {
        $(
            fn $setter($config: &mut Configuration, $value: &str) -> Result<(), ConfigError> {
                $body
                Ok(())
            }
        )+

        /// Every setting a document may declare.
        pub static SETTINGS: &[SettingDef] = &[
            $( SettingDef { name: $name, apply: $setter } ),+
        ];
    };
}

settings_table! {
    "autoMappingBehavior" => fn set_auto_mapping_behavior(c, v) {
        c.settings_mut().auto_mapping_behavior = literal("autoMappingBehavior", v)?;
    }
    "autoMappingUnknownColumnBehavior" => fn set_auto_mapping_unknown_column_behavior(c, v) {
        c.settings_mut().auto_mapping_unknown_column_behavior =
            literal("autoMappingUnknownColumnBehavior", v)?;
    }
    "cacheEnabled" => fn set_cache_enabled(c, v) {
        c.settings_mut().cache_enabled = parse_bool("cacheEnabled", v)?;
    }
    "proxyFactory" => fn set_proxy_factory(c, v) {
        let type_name = c.resolve_alias(v)?;
        let mut factory = c.catalog().instantiate_proxy_factory(&type_name)?;
        factory.set_properties(&Properties::new())?;
        c.set_proxy_factory(Arc::from(factory));
        c.settings_mut().proxy_factory = Some(type_name);
    }
    "lazyLoadingEnabled" => fn set_lazy_loading_enabled(c, v) {
        c.settings_mut().lazy_loading_enabled = parse_bool("lazyLoadingEnabled", v)?;
    }
    "aggressiveLazyLoading" => fn set_aggressive_lazy_loading(c, v) {
        c.settings_mut().aggressive_lazy_loading = parse_bool("aggressiveLazyLoading", v)?;
    }
    "multipleResultSetsEnabled" => fn set_multiple_result_sets_enabled(c, v) {
        c.settings_mut().multiple_result_sets_enabled = parse_bool("multipleResultSetsEnabled", v)?;
    }
    "useColumnLabel" => fn set_use_column_label(c, v) {
        c.settings_mut().use_column_label = parse_bool("useColumnLabel", v)?;
    }
    "useGeneratedKeys" => fn set_use_generated_keys(c, v) {
        c.settings_mut().use_generated_keys = parse_bool("useGeneratedKeys", v)?;
    }
    "defaultExecutorType" => fn set_default_executor_type(c, v) {
        c.settings_mut().default_executor_type = literal("defaultExecutorType", v)?;
    }
    "defaultStatementTimeout" => fn set_default_statement_timeout(c, v) {
        c.settings_mut().default_statement_timeout = Some(parse_int("defaultStatementTimeout", v)?);
    }
    "defaultFetchSize" => fn set_default_fetch_size(c, v) {
        c.settings_mut().default_fetch_size = Some(parse_int("defaultFetchSize", v)?);
    }
    "mapUnderscoreToCamelCase" => fn set_map_underscore_to_camel_case(c, v) {
        c.settings_mut().map_underscore_to_camel_case = parse_bool("mapUnderscoreToCamelCase", v)?;
    }
    "safeRowBoundsEnabled" => fn set_safe_row_bounds_enabled(c, v) {
        c.settings_mut().safe_row_bounds_enabled = parse_bool("safeRowBoundsEnabled", v)?;
    }
    "localCacheScope" => fn set_local_cache_scope(c, v) {
        c.settings_mut().local_cache_scope = literal("localCacheScope", v)?;
    }
    "jdbcTypeForNull" => fn set_jdbc_type_for_null(c, v) {
        c.settings_mut().jdbc_type_for_null = literal("jdbcTypeForNull", v)?;
    }
    "lazyLoadTriggerMethods" => fn set_lazy_load_trigger_methods(c, v) {
        c.settings_mut().lazy_load_trigger_methods = v
            .split(',')
            .filter_map(non_empty)
            .collect();
    }
    "safeResultHandlerEnabled" => fn set_safe_result_handler_enabled(c, v) {
        c.settings_mut().safe_result_handler_enabled = parse_bool("safeResultHandlerEnabled", v)?;
    }
    "defaultScriptingLanguage" => fn set_default_scripting_language(c, v) {
        let resolved = c.resolve_class(Some(v))?;
        c.settings_mut().default_scripting_language = resolved;
    }
    "defaultEnumTypeHandler" => fn set_default_enum_type_handler(c, v) {
        let resolved = c.resolve_class(Some(v))?;
        c.settings_mut().default_enum_type_handler = resolved;
    }
    "callSettersOnNulls" => fn set_call_setters_on_nulls(c, v) {
        c.settings_mut().call_setters_on_nulls = parse_bool("callSettersOnNulls", v)?;
    }
    "useActualParamName" => fn set_use_actual_param_name(c, v) {
        c.settings_mut().use_actual_param_name = parse_bool("useActualParamName", v)?;
    }
    "returnInstanceForEmptyRow" => fn set_return_instance_for_empty_row(c, v) {
        c.settings_mut().return_instance_for_empty_row = parse_bool("returnInstanceForEmptyRow", v)?;
    }
    "logPrefix" => fn set_log_prefix(c, v) {
        c.settings_mut().log_prefix = Some(v.to_string());
    }
    "configurationFactory" => fn set_configuration_factory(c, v) {
        let resolved = c.resolve_class(Some(v))?;
        c.settings_mut().configuration_factory = resolved;
    }
    "logImpl" => fn set_log_impl(c, v) {
        let resolved = c.resolve_class(Some(v))?;
        c.settings_mut().log_impl = resolved;
    }
    // Installed before type aliases are read.
    "vfsImpl" => fn skip_vfs_impl(_c, _v) {}
}

pub fn is_known(name: &str) -> bool {
    SETTINGS.iter().any(|def| def.name == name)
}

/// Check that every key names a known setting.
///
/// # Errors
/// [`ConfigError::Validation`] naming the first unknown key.
pub fn validate(props: &Properties) -> Result<(), ConfigError> {
    match props.keys().find(|key| !is_known(key)) {
        Some(key) => Err(ConfigError::validation(format!(
            "The setting {} is not known. Make sure you spelled it correctly (case sensitive).",
            key
        ))),
        None => Ok(()),
    }
}

/// Write every declared setting onto `config`, in table order.
pub fn apply_all(config: &mut Configuration, props: &Properties) -> Result<(), ConfigError> {
    for def in SETTINGS {
        if let Some(value) = props.get(def.name) {
            tracing::debug!("Setting {} = {}", def.name, value);
            (def.apply)(config, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.auto_mapping_behavior, AutoMappingBehavior::Partial);
        assert_eq!(
            settings.auto_mapping_unknown_column_behavior,
            AutoMappingUnknownColumnBehavior::None
        );
        assert!(settings.cache_enabled);
        assert!(!settings.lazy_loading_enabled);
        assert!(!settings.aggressive_lazy_loading);
        assert!(settings.multiple_result_sets_enabled);
        assert!(settings.use_column_label);
        assert!(!settings.use_generated_keys);
        assert_eq!(settings.default_executor_type, ExecutorType::Simple);
        assert!(!settings.map_underscore_to_camel_case);
        assert_eq!(settings.local_cache_scope, LocalCacheScope::Session);
        assert_eq!(settings.jdbc_type_for_null, JdbcType::Other);
        assert_eq!(
            settings.lazy_load_trigger_methods.iter().collect::<Vec<_>>(),
            vec!["equals", "clone", "hashCode", "toString"]
        );
        assert!(settings.safe_result_handler_enabled);
        assert!(settings.use_actual_param_name);
        assert!(!settings.return_instance_for_empty_row);
        assert!(!settings.safe_row_bounds_enabled);
    }

    #[test]
    fn test_validate_rejects_unknown_key() {
        let err = validate(&props(&[("cacheEnabled", "true"), ("fooBarBaz", "1")])).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("fooBarBaz"));
        assert!(err.to_string().contains("case sensitive"));
    }

    #[test]
    fn test_validate_is_case_sensitive() {
        assert!(validate(&props(&[("CacheEnabled", "true")])).is_err());
    }

    #[test]
    fn test_only_tabled_names_are_known() {
        assert_eq!(SETTINGS.len(), 27);
        assert!(is_known("logImpl"));
        assert!(is_known("vfsImpl"));
        assert!(!is_known("shrinkWhitespacesInSql"));
        assert!(!is_known("nullableOnForEach"));
    }

    #[test]
    fn test_log_impl_resolved_when_applied() {
        let mut config = Configuration::new();
        apply_all(&mut config, &props(&[("logImpl", "TRACING")])).unwrap();
        assert_eq!(
            config.settings().log_impl.as_deref(),
            Some(crate::types::catalog::TRACING_LOG)
        );
    }

    #[test]
    fn test_apply_typed_values() {
        let mut config = Configuration::new();
        apply_all(
            &mut config,
            &props(&[
                ("autoMappingBehavior", "FULL"),
                ("defaultExecutorType", "BATCH"),
                ("defaultStatementTimeout", "30"),
                ("lazyLoadTriggerMethods", "equals, toString,"),
                ("jdbcTypeForNull", "NULL"),
                ("logPrefix", "app."),
            ]),
        )
        .unwrap();

        let settings = config.settings();
        assert_eq!(settings.auto_mapping_behavior, AutoMappingBehavior::Full);
        assert_eq!(settings.default_executor_type, ExecutorType::Batch);
        assert_eq!(settings.default_statement_timeout, Some(30));
        assert_eq!(settings.lazy_load_trigger_methods.len(), 2);
        assert_eq!(settings.jdbc_type_for_null, JdbcType::Null);
        assert_eq!(settings.log_prefix.as_deref(), Some("app."));
    }

    #[test]
    fn test_bad_enum_literal_names_value() {
        let mut config = Configuration::new();
        let err = apply_all(&mut config, &props(&[("localCacheScope", "GLOBAL")])).unwrap_err();
        match err {
            ConfigError::InvalidValue { setting, value, expected } => {
                assert_eq!(setting, "localCacheScope");
                assert_eq!(value, "GLOBAL");
                assert!(expected.contains("SESSION"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_scripting_language_resolves_alias() {
        let mut config = Configuration::new();
        apply_all(&mut config, &props(&[("defaultScriptingLanguage", "raw")])).unwrap();
        assert_eq!(
            config.settings().default_scripting_language.as_deref(),
            Some(crate::types::catalog::RAW_LANGUAGE_DRIVER)
        );
    }

    #[test]
    fn test_table_names_are_unique() {
        let names: IndexSet<_> = SETTINGS.iter().map(|d| d.name).collect();
        assert_eq!(names.len(), SETTINGS.len());
    }
}
