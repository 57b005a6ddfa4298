//! Mapper sources and the statements they contribute.

pub mod mapper_parser;
pub mod mapper_registry;
pub mod statement;

pub use mapper_parser::{MapperDocumentParser, YamlMapperParser};
pub use mapper_registry::MapperRegistry;
pub use statement::{MappedStatement, SqlFragment, StatementDecl, StatementKind, StatementRegistry};
