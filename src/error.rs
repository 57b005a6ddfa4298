//! Error type for configuration assembly.
//!
//! Every failure raised while assembling a [`Configuration`](crate::Configuration)
//! is a [`ConfigError`]. Stage failures are wrapped once in
//! [`ConfigError::Parsing`], which carries the resource being processed when
//! the failure happened.

use std::fmt;
use std::io;

/// Coarse classification of a [`ConfigError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Usage,
    Validation,
    Resolution,
    Selection,
    Io,
    Document,
}

/// Error type for configuration assembly
#[derive(Debug)]
pub enum ConfigError {
    /// A one-shot object was used again.
    Usage(String),
    /// Structural or naming problem in the document.
    Validation(String),
    /// A setting or property value could not be converted to its typed form.
    InvalidValue {
        setting: String,
        value: String,
        expected: String,
    },
    /// An alias or type name could not be resolved or instantiated.
    Resolution(String),
    /// Environment selection failed.
    Selection(String),
    /// A resource or URL could not be read.
    Io {
        resource: String,
        source: io::Error,
    },
    /// The document itself could not be read as a node tree.
    Document(String),
    /// A stage of the assembly failed.
    Parsing {
        resource: String,
        cause: Box<ConfigError>,
    },
}

impl ConfigError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ConfigError::Validation(msg.into())
    }

    pub fn resolution(msg: impl Into<String>) -> Self {
        ConfigError::Resolution(msg.into())
    }

    pub fn selection(msg: impl Into<String>) -> Self {
        ConfigError::Selection(msg.into())
    }

    pub fn io(resource: impl Into<String>, source: io::Error) -> Self {
        ConfigError::Io {
            resource: resource.into(),
            source,
        }
    }

    pub fn invalid_value(
        setting: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        ConfigError::InvalidValue {
            setting: setting.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Wrap a stage failure with the resource that was being processed.
    pub fn parsing(resource: impl Into<String>, cause: ConfigError) -> Self {
        ConfigError::Parsing {
            resource: resource.into(),
            cause: Box::new(cause),
        }
    }

    /// The innermost error, looking through [`ConfigError::Parsing`].
    pub fn root_cause(&self) -> &ConfigError {
        match self {
            ConfigError::Parsing { cause, .. } => cause.root_cause(),
            other => other,
        }
    }

    /// Classification of the root cause.
    pub fn kind(&self) -> ErrorKind {
        match self.root_cause() {
            ConfigError::Usage(_) => ErrorKind::Usage,
            ConfigError::Validation(_) | ConfigError::InvalidValue { .. } => ErrorKind::Validation,
            ConfigError::Resolution(_) => ErrorKind::Resolution,
            ConfigError::Selection(_) => ErrorKind::Selection,
            ConfigError::Io { .. } => ErrorKind::Io,
            ConfigError::Document(_) => ErrorKind::Document,
            ConfigError::Parsing { .. } => unreachable!("root_cause never returns a wrapper"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Usage(msg) => write!(f, "{}", msg),
            ConfigError::Validation(msg) => write!(f, "{}", msg),
            ConfigError::InvalidValue {
                setting,
                value,
                expected,
            } => write!(
                f,
                "Invalid value '{}' for '{}': expected {}",
                value, setting, expected
            ),
            ConfigError::Resolution(msg) => write!(f, "{}", msg),
            ConfigError::Selection(msg) => write!(f, "{}", msg),
            ConfigError::Io { resource, source } => {
                write!(f, "Could not read resource '{}': {}", resource, source)
            }
            ConfigError::Document(msg) => write!(f, "Malformed configuration document: {}", msg),
            ConfigError::Parsing { resource, cause } => write!(
                f,
                "Error parsing configuration. Cause: {}\n### The error may exist in {}",
                cause, resource
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parsing { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}
