//! Configuration assembly.

pub mod config_builder;

pub use config_builder::{ConfigBuilder, ROOT_ELEMENT};
