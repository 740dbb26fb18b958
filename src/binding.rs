//! Binding store and condition set
//!
//! The store owns every bound component. A component leaves the store only
//! through [`BindingStore::unbind`] or [`BindingStore::unbind_component`];
//! replacing or clearing a binding drops it.

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::component::{Component, ComponentId};
use crate::format::TextFormat;

/// Errors from binding operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    /// The component is already bound under another name
    #[error("component '{id}' is already bound to '{bound_as}'")]
    AlreadyBound { id: ComponentId, bound_as: String },
}

/// A component that could not be bound, handed back to the caller
#[derive(Debug)]
pub struct Rejected<C> {
    pub error: BindingError,
    pub component: C,
}

impl<C> Rejected<C> {
    pub fn into_component(self) -> C {
        self.component
    }
}

/// Value bound to a variable name
#[derive(Debug, Clone, PartialEq)]
pub enum Binding<C> {
    Text { value: String, format: TextFormat },
    Component { id: ComponentId, component: C },
    Empty,
}

impl<C> Binding<C> {
    fn component_id(&self) -> Option<&ComponentId> {
        match self {
            Binding::Component { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Named bindings, at most one per name
#[derive(Debug)]
pub struct BindingStore<C> {
    bindings: BTreeMap<String, Binding<C>>,
}

impl<C> Default for BindingStore<C> {
    fn default() -> Self {
        Self {
            bindings: BTreeMap::new(),
        }
    }
}

impl<C: Component> BindingStore<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a string; returns whether the binding changed
    pub fn bind_string(&mut self, name: &str, value: impl Into<String>, format: TextFormat) -> bool {
        let value = value.into();
        if let Some(Binding::Text {
            value: old,
            format: old_format,
        }) = self.bindings.get(name)
        {
            if *old == value && *old_format == format {
                return false;
            }
        }
        self.bindings
            .insert(name.to_string(), Binding::Text { value, format });
        true
    }

    /// Bind an explicit empty value; returns whether the binding changed
    pub fn bind_empty(&mut self, name: &str) -> bool {
        if matches!(self.bindings.get(name), Some(Binding::Empty)) {
            return false;
        }
        self.bindings.insert(name.to_string(), Binding::Empty);
        true
    }

    /// Bind a component, taking ownership
    ///
    /// Whatever was bound to `name` before is dropped. Fails when a component
    /// with the same identity is bound under another name.
    pub fn bind_component(&mut self, name: &str, component: C) -> Result<(), Rejected<C>> {
        let id = ComponentId::new(component.id());

        if let Some(bound_as) = self.var_name(&id) {
            if bound_as != name {
                let error = BindingError::AlreadyBound {
                    id,
                    bound_as: bound_as.to_string(),
                };
                return Err(Rejected { error, component });
            }
        }

        self.bindings
            .insert(name.to_string(), Binding::Component { id, component });
        Ok(())
    }

    /// Remove the component bound to `name`, returning ownership
    pub fn unbind(&mut self, name: &str) -> Option<C> {
        match self.bindings.get(name) {
            Some(Binding::Component { .. }) => match self.bindings.remove(name) {
                Some(Binding::Component { component, .. }) => Some(component),
                _ => None,
            },
            _ => None,
        }
    }

    /// Remove a component by identity, returning ownership
    pub fn unbind_component(&mut self, id: &ComponentId) -> Option<C> {
        let name = self.var_name(id)?.to_string();
        self.unbind(&name)
    }

    /// Drop all bindings and owned components
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn get(&self, name: &str) -> Option<&Binding<C>> {
        self.bindings.get(name)
    }

    pub fn component(&self, name: &str) -> Option<&C> {
        match self.bindings.get(name) {
            Some(Binding::Component { component, .. }) => Some(component),
            _ => None,
        }
    }

    pub fn component_mut(&mut self, name: &str) -> Option<&mut C> {
        self.bound_mut(name).map(|(_, component)| component)
    }

    /// The component bound to `name` together with its identity
    pub fn bound_mut(&mut self, name: &str) -> Option<(&ComponentId, &mut C)> {
        match self.bindings.get_mut(name) {
            Some(Binding::Component { id, component }) => Some((&*id, component)),
            _ => None,
        }
    }

    /// Name under which the component with identity `id` is bound
    pub fn var_name(&self, id: &ComponentId) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, b)| b.component_id() == Some(id))
            .map(|(name, _)| name.as_str())
    }

    /// All bound components with their names, ordered by name
    pub fn components(&self) -> impl Iterator<Item = (&str, &C)> {
        self.bindings.iter().filter_map(|(name, b)| match b {
            Binding::Component { component, .. } => Some((name.as_str(), component)),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Named boolean conditions, `false` unless set
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionSet {
    set: BTreeSet<String>,
}

impl ConditionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a condition; returns whether its value changed
    pub fn set(&mut self, name: &str, value: bool) -> bool {
        if value {
            self.set.insert(name.to_string())
        } else {
            self.set.remove(name)
        }
    }

    pub fn value(&self, name: &str) -> bool {
        self.set.contains(name)
    }

    /// Names of the conditions that are true
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.set.iter().map(|s| s.as_str())
    }

    pub fn clear(&mut self) {
        self.set.clear();
    }
}
