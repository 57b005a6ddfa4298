//! Type naming: catalog, aliases, column types and type handlers.

pub mod alias_registry;
pub mod catalog;
pub mod jdbc_type;
pub mod type_handler;

pub use alias_registry::TypeAliasRegistry;
pub use catalog::{Capability, Component, TypeCatalog, TypeDescriptor, TypeKind};
pub use jdbc_type::JdbcType;
pub use type_handler::{HandlerBinding, ScalarTypeHandler, TypeHandler, TypeHandlerRegistry};
