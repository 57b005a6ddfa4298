//! Namespace enumeration.

use std::fmt;

use crate::types::catalog::{TypeCatalog, TypeDescriptor};

/// Enumerates the types reachable under a namespace.
///
/// Namespace scans for type aliases, type handlers and mapper interfaces all
/// go through the configuration's active VFS, so a custom implementation
/// installed through the `vfsImpl` setting changes what those scans find.
pub trait Vfs: fmt::Debug + Send + Sync {
    /// Whether this implementation can be used in the current process.
    fn is_valid(&self) -> bool {
        true
    }

    /// Every type under `namespace`, at any depth.
    fn list(&self, catalog: &TypeCatalog, namespace: &str) -> Vec<TypeDescriptor>;
}

/// Lists types straight from the catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogVfs;

impl CatalogVfs {
    pub const TYPE_NAME: &'static str = "mapcfg::io::CatalogVfs";
}

impl Vfs for CatalogVfs {
    fn list(&self, catalog: &TypeCatalog, namespace: &str) -> Vec<TypeDescriptor> {
        catalog.descriptors_under(namespace)
    }
}
