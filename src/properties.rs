//! Ordered key/value tables used for variables and component properties.

use indexmap::IndexMap;

use crate::error::ConfigError;

/// Ordered string table. Later inserts of an existing key replace its value
/// in place.
pub type Properties = IndexMap<String, String>;

/// Parse the contents of a property file.
///
/// Lines are `KEY=VALUE`; blank lines and `#` comments are ignored.
/// Values may be quoted. Nothing is exported to the process environment.
///
/// # Arguments
/// * `resource` - Name of the resource, used in error messages
/// * `content` - File contents
pub fn parse_property_file(resource: &str, content: &str) -> Result<Properties, ConfigError> {
    let mut props = Properties::new();

    for item in dotenvy::from_read_iter(content.as_bytes()) {
        let (key, value) = item.map_err(|e| {
            ConfigError::Document(format!("Invalid property file '{}': {}", resource, e))
        })?;
        props.insert(key, value);
    }

    Ok(props)
}

/// Overlay `overrides` onto `base`, overrides winning.
pub fn overlay(base: &mut Properties, overrides: &Properties) {
    for (key, value) in overrides {
        base.insert(key.clone(), value.clone());
    }
}

/// Parse a `true`/`false` literal, ignoring ASCII case.
pub fn parse_bool(name: &str, value: &str) -> Result<bool, ConfigError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConfigError::invalid_value(name, value, "true or false"))
    }
}

/// Parse a decimal integer.
pub fn parse_int<T: std::str::FromStr>(name: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ConfigError::invalid_value(name, value, "an integer"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_property_file() {
        let content = "# database\nusername=dev\npassword=\"s3cret\"\n\nurl=postgres://localhost/app\n";
        let props = parse_property_file("db.properties", content).unwrap();

        assert_eq!(props.get("username").map(String::as_str), Some("dev"));
        assert_eq!(props.get("password").map(String::as_str), Some("s3cret"));
        assert_eq!(props.get("url").map(String::as_str), Some("postgres://localhost/app"));
        assert_eq!(props.len(), 3);
    }

    #[test]
    fn test_parse_bool_and_int() {
        assert!(parse_bool("cacheEnabled", "TRUE").unwrap());
        assert!(!parse_bool("cacheEnabled", "false").unwrap());
        assert!(parse_bool("cacheEnabled", "yes").is_err());
        assert_eq!(parse_int::<i32>("defaultFetchSize", " 25 ").unwrap(), 25);
        assert!(parse_int::<i32>("defaultFetchSize", "ten").is_err());
    }

    #[test]
    fn test_overlay_later_wins_and_keeps_order() {
        let mut base = Properties::new();
        base.insert("a".to_string(), "1".to_string());
        base.insert("b".to_string(), "2".to_string());

        let mut top = Properties::new();
        top.insert("b".to_string(), "20".to_string());
        top.insert("c".to_string(), "30".to_string());

        overlay(&mut base, &top);

        let keys: Vec<_> = base.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        assert_eq!(base["b"], "20");
    }
}
