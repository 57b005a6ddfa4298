//! Resource and URL reading.

use std::fs;
use std::io;
use std::path::PathBuf;
use url::Url;

use crate::error::ConfigError;

/// Reads named resources and URLs into memory.
///
/// Implementations must release any handle they open before returning,
/// whether the read succeeds or not.
pub trait ResourceLoader: Send + Sync {
    /// Read a resource addressed by a relative path.
    fn resource_as_string(&self, resource: &str) -> Result<String, ConfigError>;

    /// Read a resource addressed by a URL.
    fn url_as_string(&self, url: &str) -> Result<String, ConfigError>;
}

/// Filesystem-backed loader.
///
/// Resources are looked up under each root directory in order, the first
/// existing file wins. URLs must use the `file` scheme.
#[derive(Debug, Clone, Default)]
pub struct FsResourceLoader {
    roots: Vec<PathBuf>,
}

impl FsResourceLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ResourceLoader for FsResourceLoader {
    fn resource_as_string(&self, resource: &str) -> Result<String, ConfigError> {
        let relative = resource.trim_start_matches('/');
        let found = if self.roots.is_empty() {
            Some(PathBuf::from(relative)).filter(|p| p.is_file())
        } else {
            self.roots
                .iter()
                .map(|root| root.join(relative))
                .find(|p| p.is_file())
        };

        let path = found.ok_or_else(|| {
            ConfigError::io(
                resource,
                io::Error::new(io::ErrorKind::NotFound, "resource not found under any root"),
            )
        })?;

        tracing::debug!("Reading resource {} from {}", resource, path.display());
        fs::read_to_string(&path).map_err(|e| ConfigError::io(resource, e))
    }

    fn url_as_string(&self, url: &str) -> Result<String, ConfigError> {
        let parsed = Url::parse(url).map_err(|e| {
            ConfigError::io(url, io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))
        })?;

        if parsed.scheme() != "file" {
            return Err(ConfigError::io(
                url,
                io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!("unsupported URL scheme '{}'", parsed.scheme()),
                ),
            ));
        }

        let path = parsed.to_file_path().map_err(|_| {
            ConfigError::io(
                url,
                io::Error::new(io::ErrorKind::InvalidInput, "URL is not a local file path"),
            )
        })?;

        tracing::debug!("Reading URL {}", url);
        fs::read_to_string(&path).map_err(|e| ConfigError::io(url, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_resource_searched_in_root_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(second.path().join("db.properties"), "user=second").unwrap();

        let loader = FsResourceLoader::new()
            .with_root(first.path())
            .with_root(second.path());

        assert_eq!(loader.resource_as_string("db.properties").unwrap(), "user=second");

        fs::write(first.path().join("db.properties"), "user=first").unwrap();
        assert_eq!(loader.resource_as_string("/db.properties").unwrap(), "user=first");
    }

    #[test]
    fn test_missing_resource_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let loader = FsResourceLoader::new().with_root(dir.path());
        let err = loader.resource_as_string("nope.properties").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn test_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("remote.properties");
        fs::write(&path, "user=url").unwrap();

        let url = Url::from_file_path(&path).unwrap();
        let loader = FsResourceLoader::new();
        assert_eq!(loader.url_as_string(url.as_str()).unwrap(), "user=url");
    }

    #[test]
    fn test_http_url_unsupported() {
        let loader = FsResourceLoader::new();
        let err = loader.url_as_string("http://example.com/db.properties").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert!(err.to_string().contains("unsupported URL scheme"));
    }
}
