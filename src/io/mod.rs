//! Resource reading and namespace enumeration.

pub mod resources;
pub mod vfs;

pub use resources::{FsResourceLoader, ResourceLoader};
pub use vfs::{CatalogVfs, Vfs};
