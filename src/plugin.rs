//! Interceptors and the ordered interceptor chain.

use std::fmt;
use std::sync::Arc;

use crate::error::ConfigError;
use crate::properties::Properties;

/// Callable that executes a statement by id and returns its outcome.
pub type Invocation = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Wraps statement execution.
///
/// The default implementation passes every call straight through.
pub trait Interceptor: fmt::Debug + Send + Sync {
    /// Apply the properties declared alongside the plugin.
    fn set_properties(&mut self, _properties: &Properties) -> Result<(), ConfigError> {
        Ok(())
    }

    /// Handle one call. `proceed` runs the rest of the chain.
    fn intercept(&self, statement: &str, proceed: &dyn Fn(&str) -> String) -> String {
        proceed(statement)
    }
}

/// Interceptors in declaration order.
#[derive(Debug, Default, Clone)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, interceptor: Arc<dyn Interceptor>) {
        self.interceptors.push(interceptor);
    }

    pub fn interceptors(&self) -> &[Arc<dyn Interceptor>] {
        &self.interceptors
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Wrap `target` with every interceptor.
    ///
    /// Each interceptor wraps the result of the previous one, so the last
    /// declared interceptor sees a call first.
    pub fn plugin_all(&self, target: Invocation) -> Invocation {
        self.interceptors.iter().fold(target, |inner, interceptor| {
            let interceptor = Arc::clone(interceptor);
            let wrapped: Invocation =
                Box::new(move |statement: &str| interceptor.intercept(statement, &*inner));
            wrapped
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Tag(&'static str);

    impl Interceptor for Tag {
        fn intercept(&self, statement: &str, proceed: &dyn Fn(&str) -> String) -> String {
            format!("{}({})", self.0, proceed(statement))
        }
    }

    #[test]
    fn test_last_declared_is_outermost() {
        let mut chain = InterceptorChain::new();
        chain.add(Arc::new(Tag("first")));
        chain.add(Arc::new(Tag("second")));

        let run = chain.plugin_all(Box::new(|id: &str| id.to_string()));
        assert_eq!(run("selectUser"), "second(first(selectUser))");
    }

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = InterceptorChain::new();
        let run = chain.plugin_all(Box::new(|id: &str| format!("ran {}", id)));
        assert_eq!(run("x"), "ran x");
        assert!(chain.is_empty());
    }
}
