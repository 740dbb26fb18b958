//! Collaborators of the template engine
//!
//! The engine never builds markup for components itself. It asks a
//! [`Component`] for its markup and identifier, a [`Localizer`] for message
//! strings and macro blocks, and a [`Resolver`] for placeholders that have no
//! binding.

use std::collections::HashMap;

use crate::parser::ast::{find_argument, Argument};

/// Identity of a bound component, stable across renders
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(pub String);

impl ComponentId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An independently owned, render-producing unit bound to a variable
pub trait Component {
    /// Unique identifier, written by `${id:name}`
    fn id(&self) -> &str;

    /// Append the markup representation of this component
    fn render(&self, out: &mut String);

    /// Apply the arguments of the placeholder that references this component
    ///
    /// Only `class` is understood by default: each whitespace separated class
    /// is added with [`Component::add_style_class`].
    fn apply_arguments(&mut self, args: &[Argument]) {
        if let Some(classes) = find_argument(args, "class") {
            for class in classes.split_whitespace() {
                self.add_style_class(class);
            }
        }
    }

    fn add_style_class(&mut self, _class: &str) {}

    fn set_object_name(&mut self, _name: &str) {}

    fn set_id(&mut self, _id: &str) {}
}

/// A component with fixed markup
///
/// The markup may contain `{id}`, `{class}` and `{name}` markers which are
/// filled in when rendering.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Markup {
    pub id: String,
    pub html: String,
    pub classes: Vec<String>,
    pub object_name: Option<String>,
}

impl Markup {
    pub fn new(id: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            html: html.into(),
            ..Self::default()
        }
    }
}

impl Component for Markup {
    fn id(&self) -> &str {
        &self.id
    }

    fn render(&self, out: &mut String) {
        let html = self
            .html
            .replace("{id}", &self.id)
            .replace("{class}", &self.classes.join(" "))
            .replace("{name}", self.object_name.as_deref().unwrap_or(""));
        out.push_str(&html);
    }

    fn add_style_class(&mut self, class: &str) {
        if !self.classes.iter().any(|c| c == class) {
            self.classes.push(class.to_string());
        }
    }

    fn set_object_name(&mut self, name: &str) {
        self.object_name = Some(name.to_string());
    }

    fn set_id(&mut self, id: &str) {
        self.id = id.to_string();
    }
}

/// Source of localized strings and macro blocks
pub trait Localizer {
    /// Look up a message by key
    fn translate(&self, key: &str) -> Option<String>;
}

impl Localizer for HashMap<String, String> {
    fn translate(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Localizer without any messages
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMessages;

impl Localizer for NoMessages {
    fn translate(&self, _key: &str) -> Option<String> {
        None
    }
}

/// What a [`Resolver`] may supply for an unbound placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<C> {
    /// Markup written as-is
    Text(String),
    /// A component, bound under the placeholder name from then on
    Component(C),
}

/// Hook for placeholders without a binding
pub trait Resolver<C> {
    /// Supply a value on demand; `None` leaves the placeholder unresolved
    fn resolve_unbound(&mut self, _name: &str, _args: &[Argument]) -> Option<Resolved<C>> {
        None
    }

    /// Write a custom marker for an unresolved placeholder
    ///
    /// Returning `false` lets the engine write its configured marker instead.
    fn handle_unresolved(&self, _name: &str, _args: &[Argument], _out: &mut String) -> bool {
        false
    }
}

/// Resolver that never supplies anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFallback;

impl<C> Resolver<C> for NoFallback {}
