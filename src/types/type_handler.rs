//! Type handlers and the registry that binds them to value/column types.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::types::jdbc_type::JdbcType;

/// Converts between a value type and a column type.
///
/// A handler may declare the value types and column types it handles; these
/// are used when the handler is registered without an explicit binding.
pub trait TypeHandler: fmt::Debug + Send + Sync {
    /// Value types this handler declares it handles.
    fn mapped_types(&self) -> Vec<String> {
        Vec::new()
    }

    /// Column types this handler declares it handles.
    fn mapped_jdbc_types(&self) -> Vec<JdbcType> {
        Vec::new()
    }
}

/// Static description of a built-in scalar handler.
#[derive(Debug)]
pub struct BuiltinTypeHandler {
    pub type_name: &'static str,
    pub value_type: &'static str,
    pub jdbc_types: &'static [JdbcType],
}

pub static BUILTIN_TYPE_HANDLERS: &[BuiltinTypeHandler] = &[
    BuiltinTypeHandler {
        type_name: "mapcfg::types::StringTypeHandler",
        value_type: "String",
        jdbc_types: &[JdbcType::Char, JdbcType::Varchar, JdbcType::LongVarchar],
    },
    BuiltinTypeHandler {
        type_name: "mapcfg::types::ByteTypeHandler",
        value_type: "i8",
        jdbc_types: &[JdbcType::TinyInt],
    },
    BuiltinTypeHandler {
        type_name: "mapcfg::types::ShortTypeHandler",
        value_type: "i16",
        jdbc_types: &[JdbcType::SmallInt],
    },
    BuiltinTypeHandler {
        type_name: "mapcfg::types::IntegerTypeHandler",
        value_type: "i32",
        jdbc_types: &[JdbcType::Integer],
    },
    BuiltinTypeHandler {
        type_name: "mapcfg::types::LongTypeHandler",
        value_type: "i64",
        jdbc_types: &[JdbcType::BigInt],
    },
    BuiltinTypeHandler {
        type_name: "mapcfg::types::FloatTypeHandler",
        value_type: "f32",
        jdbc_types: &[JdbcType::Float, JdbcType::Real],
    },
    BuiltinTypeHandler {
        type_name: "mapcfg::types::DoubleTypeHandler",
        value_type: "f64",
        jdbc_types: &[JdbcType::Double],
    },
    BuiltinTypeHandler {
        type_name: "mapcfg::types::BooleanTypeHandler",
        value_type: "bool",
        jdbc_types: &[JdbcType::Boolean, JdbcType::Bit],
    },
    BuiltinTypeHandler {
        type_name: "mapcfg::types::ByteArrayTypeHandler",
        value_type: "Vec<u8>",
        jdbc_types: &[JdbcType::Binary, JdbcType::VarBinary, JdbcType::Blob],
    },
];

/// Handler for one of the built-in scalar value types.
#[derive(Debug, Clone)]
pub struct ScalarTypeHandler {
    builtin: &'static BuiltinTypeHandler,
}

impl ScalarTypeHandler {
    pub fn new(builtin: &'static BuiltinTypeHandler) -> Self {
        Self { builtin }
    }
}

impl TypeHandler for ScalarTypeHandler {
    fn mapped_types(&self) -> Vec<String> {
        vec![self.builtin.value_type.to_string()]
    }

    fn mapped_jdbc_types(&self) -> Vec<JdbcType> {
        self.builtin.jdbc_types.to_vec()
    }
}

/// A handler together with the type name it was created from.
#[derive(Debug, Clone)]
pub struct HandlerBinding {
    pub handler_type: String,
    pub handler: Arc<dyn TypeHandler>,
}

/// Registry of (value type, optional column type) → handler bindings.
///
/// A binding without a column type is the default handler for its value type.
#[derive(Debug, Default)]
pub struct TypeHandlerRegistry {
    bindings: IndexMap<String, IndexMap<Option<JdbcType>, HandlerBinding>>,
    all_handlers: IndexMap<String, Arc<dyn TypeHandler>>,
}

impl TypeHandlerRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with the built-in scalar handlers, each also the
    /// default handler for its value type.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for builtin in BUILTIN_TYPE_HANDLERS {
            let handler: Arc<dyn TypeHandler> = Arc::new(ScalarTypeHandler::new(builtin));
            registry.register(builtin.value_type, None, builtin.type_name, Arc::clone(&handler));
            registry.register_handler(builtin.type_name, handler);
        }
        registry
    }

    /// Register a handler using the value types it declares.
    ///
    /// A handler that declares no value type is only recorded by its type name.
    pub fn register_handler(&mut self, handler_type: &str, handler: Arc<dyn TypeHandler>) {
        let mapped = handler.mapped_types();
        if mapped.is_empty() {
            tracing::debug!("Type handler {} declares no value type; registered unbound", handler_type);
            self.all_handlers
                .insert(handler_type.to_string(), handler);
            return;
        }
        for value_type in mapped {
            self.register_for_type(&value_type, handler_type, Arc::clone(&handler));
        }
    }

    /// Register a handler for `value_type` using the column types it declares.
    pub fn register_for_type(
        &mut self,
        value_type: &str,
        handler_type: &str,
        handler: Arc<dyn TypeHandler>,
    ) {
        let jdbc_types = handler.mapped_jdbc_types();
        if jdbc_types.is_empty() {
            self.register(value_type, None, handler_type, handler);
        } else {
            for jdbc_type in jdbc_types {
                self.register(value_type, Some(jdbc_type), handler_type, Arc::clone(&handler));
            }
        }
    }

    /// Register an explicit binding.
    pub fn register(
        &mut self,
        value_type: &str,
        jdbc_type: Option<JdbcType>,
        handler_type: &str,
        handler: Arc<dyn TypeHandler>,
    ) {
        tracing::debug!(
            "Binding {} ({}) -> {}",
            value_type,
            jdbc_type.map(|t| t.as_str()).unwrap_or("default"),
            handler_type
        );
        self.all_handlers
            .insert(handler_type.to_string(), Arc::clone(&handler));
        self.bindings
            .entry(value_type.to_string())
            .or_default()
            .insert(
                jdbc_type,
                HandlerBinding {
                    handler_type: handler_type.to_string(),
                    handler,
                },
            );
    }

    /// Handler for `value_type` and `jdbc_type`, falling back to the value
    /// type's default handler.
    pub fn handler(&self, value_type: &str, jdbc_type: Option<JdbcType>) -> Option<&HandlerBinding> {
        let by_jdbc = self.bindings.get(value_type)?;
        by_jdbc
            .get(&jdbc_type)
            .or_else(|| by_jdbc.get(&None))
    }

    pub fn has_handler(&self, value_type: &str) -> bool {
        self.bindings.contains_key(value_type)
    }

    pub fn has_handler_type(&self, handler_type: &str) -> bool {
        self.all_handlers.contains_key(handler_type)
    }

    /// Type names of every registered handler, in registration order.
    pub fn handler_types(&self) -> Vec<&str> {
        self.all_handlers.keys().map(String::as_str).collect()
    }

    /// Number of (value type, column type) bindings.
    pub fn binding_count(&self) -> usize {
        self.bindings.values().map(IndexMap::len).sum()
    }
}
