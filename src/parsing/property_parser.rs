//! `${...}` placeholder substitution.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::properties::Properties;

/// Variable that turns on `${key:default}` handling.
pub const ENABLE_DEFAULT_VALUE: &str = "mapcfg.placeholder.enable-default-value";

/// Variable that overrides the separator between key and default value.
pub const DEFAULT_VALUE_SEPARATOR: &str = "mapcfg.placeholder.default-value-separator";

const DEFAULT_SEPARATOR: &str = ":";

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$\{([^}]*)\}").expect("placeholder pattern is valid"))
}

/// Replace every `${key}` in `text` with its value from `variables`.
///
/// Unknown keys are left untouched, so a document can still carry
/// placeholders meant for a later consumer.
///
/// # Example
/// ```
/// use mapcfg::parsing::property_parser::substitute;
/// use mapcfg::Properties;
///
/// let mut vars = Properties::new();
/// vars.insert("user".to_string(), "dev".to_string());
/// assert_eq!(substitute("name=${user}", &vars), "name=dev");
/// assert_eq!(substitute("${other}", &vars), "${other}");
/// ```
pub fn substitute(text: &str, variables: &Properties) -> String {
    if !text.contains("${") {
        return text.to_string();
    }

    let defaults_enabled = variables
        .get(ENABLE_DEFAULT_VALUE)
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    let separator = variables
        .get(DEFAULT_VALUE_SEPARATOR)
        .map(String::as_str)
        .unwrap_or(DEFAULT_SEPARATOR);

    placeholder_pattern()
        .replace_all(text, |caps: &Captures| {
            let content = &caps[1];

            if defaults_enabled {
                if let Some((key, default)) = content.split_once(separator) {
                    return variables
                        .get(key)
                        .cloned()
                        .unwrap_or_else(|| default.to_string());
                }
            }

            match variables.get(content) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_substitute_multiple_placeholders() {
        let v = vars(&[("host", "db"), ("port", "5432")]);
        assert_eq!(substitute("postgres://${host}:${port}/app", &v), "postgres://db:5432/app");
    }

    #[test]
    fn test_default_value_ignored_unless_enabled() {
        let v = vars(&[]);
        assert_eq!(substitute("${user:sa}", &v), "${user:sa}");
    }

    #[test]
    fn test_default_value_when_enabled() {
        let v = vars(&[(ENABLE_DEFAULT_VALUE, "true"), ("present", "yes")]);
        assert_eq!(substitute("${user:sa}", &v), "sa");
        assert_eq!(substitute("${present:no}", &v), "yes");
    }

    #[test]
    fn test_custom_separator() {
        let v = vars(&[(ENABLE_DEFAULT_VALUE, "true"), (DEFAULT_VALUE_SEPARATOR, "?:")]);
        assert_eq!(substitute("${db:url?:jdbc:h2:mem}", &v), "jdbc:h2:mem");
    }
}
