//! Function registry for `${fun:arg}` placeholders

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::error::RenderError;

use super::resolver::Template;

/// Signature of a user supplied function
///
/// The function receives the template it is rendered in, the arguments (the
/// colon argument first) and the output. It returns whether it matched.
pub type CustomFunction<C> =
    Rc<dyn Fn(&mut Template<C>, &[String], &mut String) -> Result<bool, RenderError>>;

/// A registered function
pub enum Function<C> {
    /// Localized string lookup
    Tr,
    /// Macro block expansion
    Block,
    /// Repeated macro block expansion while a condition holds
    While,
    /// Identifier of a bound component
    Id,
    Custom(CustomFunction<C>),
}

impl<C> Clone for Function<C> {
    fn clone(&self) -> Self {
        match self {
            Function::Tr => Function::Tr,
            Function::Block => Function::Block,
            Function::While => Function::While,
            Function::Id => Function::Id,
            Function::Custom(f) => Function::Custom(Rc::clone(f)),
        }
    }
}

impl<C> fmt::Debug for Function<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Function::Tr => write!(f, "Tr"),
            Function::Block => write!(f, "Block"),
            Function::While => write!(f, "While"),
            Function::Id => write!(f, "Id"),
            Function::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Registry mapping function names to functions
#[derive(Debug)]
pub struct FunctionRegistry<C> {
    functions: BTreeMap<String, Function<C>>,
}

impl<C> Default for FunctionRegistry<C> {
    fn default() -> Self {
        Self {
            functions: BTreeMap::new(),
        }
    }
}

impl<C> FunctionRegistry<C> {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with `tr`, `block`, `while` and `id`
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.add("tr", Function::Tr);
        registry.add("block", Function::Block);
        registry.add("while", Function::While);
        registry.add("id", Function::Id);
        registry
    }

    /// Register a function, replacing any function with the same name
    pub fn add(&mut self, name: impl Into<String>, function: Function<C>) {
        self.functions.insert(name.into(), function);
    }

    /// Register a closure
    pub fn add_fn<F>(&mut self, name: impl Into<String>, f: F)
    where
        F: Fn(&mut Template<C>, &[String], &mut String) -> Result<bool, RenderError> + 'static,
    {
        self.add(name, Function::Custom(Rc::new(f)));
    }

    /// Remove a function, returning it
    pub fn remove(&mut self, name: &str) -> Option<Function<C>> {
        self.functions.remove(name)
    }

    /// Get a function by name
    ///
    /// Functions are cheap to clone, which lets the caller invoke them while
    /// holding the template mutably.
    pub fn get(&self, name: &str) -> Option<Function<C>> {
        self.functions.get(name).cloned()
    }

    /// Check if a function exists
    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Get all function names, in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Markup;

    #[test]
    fn test_builtins_registered() {
        let registry: FunctionRegistry<Markup> = FunctionRegistry::with_builtins();
        assert_eq!(
            registry.names().collect::<Vec<_>>(),
            vec!["block", "id", "tr", "while"]
        );
        assert!(matches!(registry.get("tr"), Some(Function::Tr)));
    }

    #[test]
    fn test_add_overwrites() {
        let mut registry: FunctionRegistry<Markup> = FunctionRegistry::with_builtins();
        registry.add_fn("tr", |_, _, out| {
            out.push_str("custom");
            Ok(true)
        });
        assert!(matches!(registry.get("tr"), Some(Function::Custom(_))));
        assert_eq!(registry.names().count(), 4);
    }

    #[test]
    fn test_remove_and_missing() {
        let mut registry: FunctionRegistry<Markup> = FunctionRegistry::with_builtins();
        assert!(registry.remove("while").is_some());
        assert!(!registry.contains("while"));
        assert!(registry.get("nope").is_none());
    }
}
