//! Template resolution - walks scanned template text and resolves placeholders

use crate::binding::{Binding, BindingStore, ConditionSet, Rejected};
use crate::component::{
    Component, ComponentId, Localizer, NoFallback, NoMessages, Resolved, Resolver,
};
use crate::config::{ComponentIdMode, TemplateConfig};
use crate::error::{RenderError, RenderWarning};
use crate::format::{write_formatted, PathEncoder, QueryPathEncoder, TextFormat};
use crate::parser::ast::{Argument, Directive, Identifier, Reference, Segment, Span};
use crate::parser::Scanner;
use crate::tracker::RenderTracker;

use super::registry::{Function, FunctionRegistry};

/// Outcome of [`Template::render`]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rendered {
    /// The substituted document; empty when the render failed
    pub output: String,
    /// Components in the output, in order of first occurrence
    pub rendered: Vec<ComponentId>,
    /// Components rendered last time that are no longer in the output
    pub removed: Vec<ComponentId>,
    pub warnings: Vec<RenderWarning>,
    pub error: Option<RenderError>,
}

impl Rendered {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// An open conditional block
struct BlockFrame {
    name: Identifier,
    span: Span,
    included: bool,
}

/// A template with its bindings, conditions and functions
///
/// # Example
///
/// ```rust
/// use markup_template::{Markup, Template, TextFormat};
///
/// let mut t = Template::new("<div> How old are you, ${friend} ? ${age-input} </div>");
/// t.bind_string("friend", "Ann & Bob", TextFormat::Plain);
/// t.bind_component("age-input", Markup::new("w1", "<input id=\"{id}\"/>"))
///     .map_err(|r| r.error)
///     .unwrap();
///
/// let result = t.render();
/// assert_eq!(
///     result.output,
///     "<div> How old are you, Ann &amp; Bob ? <input id=\"w1\"/> </div>"
/// );
/// ```
pub struct Template<C> {
    text: String,
    text_format: TextFormat,
    pub(super) bindings: BindingStore<C>,
    pub(super) conditions: ConditionSet,
    functions: FunctionRegistry<C>,
    tracker: RenderTracker,
    pub(super) config: TemplateConfig,
    pub(super) localizer: Box<dyn Localizer>,
    resolver: Box<dyn Resolver<C>>,
    path_encoder: Box<dyn PathEncoder>,
    error_text: String,
    changed: bool,
    last: Option<Rendered>,
    /// Nesting of macro block expansions in the current render
    pub(super) depth: usize,
    pub(super) warnings: Vec<RenderWarning>,
}

impl<C: Component> Default for Template<C> {
    fn default() -> Self {
        Self::new("")
    }
}

impl<C: Component> Template<C> {
    /// Create a template with the built-in functions registered
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            text_format: TextFormat::Xhtml,
            bindings: BindingStore::new(),
            conditions: ConditionSet::new(),
            functions: FunctionRegistry::with_builtins(),
            tracker: RenderTracker::new(),
            config: TemplateConfig::default(),
            localizer: Box::new(NoMessages),
            resolver: Box::new(NoFallback),
            path_encoder: Box::new(QueryPathEncoder),
            error_text: String::new(),
            changed: true,
            last: None,
            depth: 0,
            warnings: Vec::new(),
        }
    }

    /// Set the configuration
    pub fn with_config(mut self, config: TemplateConfig) -> Self {
        self.set_config(config);
        self
    }

    /// Set the source of localized strings and macro blocks
    pub fn with_localizer(mut self, localizer: impl Localizer + 'static) -> Self {
        self.set_localizer(localizer);
        self
    }

    /// Set the hook for placeholders without a binding
    pub fn with_resolver(mut self, resolver: impl Resolver<C> + 'static) -> Self {
        self.set_resolver(resolver);
        self
    }

    /// Set the internal path encoder
    pub fn with_path_encoder(mut self, encoder: impl PathEncoder + 'static) -> Self {
        self.path_encoder = Box::new(encoder);
        self.changed = true;
        self
    }

    pub fn config(&self) -> &TemplateConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: TemplateConfig) {
        self.config = config;
        self.changed = true;
    }

    pub fn set_localizer(&mut self, localizer: impl Localizer + 'static) {
        self.localizer = Box::new(localizer);
        self.changed = true;
    }

    pub fn set_resolver(&mut self, resolver: impl Resolver<C> + 'static) {
        self.resolver = Box::new(resolver);
        self.changed = true;
    }

    pub fn template_text(&self) -> &str {
        &self.text
    }

    pub fn text_format(&self) -> TextFormat {
        self.text_format
    }

    /// Replace the template text
    ///
    /// Bindings are kept; the components of earlier renders are forgotten.
    pub fn set_template_text(&mut self, text: impl Into<String>, format: TextFormat) {
        self.text = text.into();
        self.text_format = format;
        self.reset();
    }

    /// Bind a string value to a variable
    pub fn bind_string(&mut self, name: &str, value: impl Into<String>, format: TextFormat) {
        if self.bindings.bind_string(name, value, format) {
            self.changed = true;
        }
    }

    /// Bind an integer value to a variable
    pub fn bind_int(&mut self, name: &str, value: i64) {
        self.bind_string(name, value.to_string(), TextFormat::Xhtml);
    }

    /// Bind an explicit empty value to a variable
    pub fn bind_empty(&mut self, name: &str) {
        if self.bindings.bind_empty(name) {
            self.changed = true;
        }
    }

    /// Bind a component to a variable, taking ownership
    ///
    /// A component already bound under another name is handed back.
    pub fn bind_component(&mut self, name: &str, mut component: C) -> Result<(), Rejected<C>> {
        match self.config.component_id_mode {
            ComponentIdMode::None => {}
            ComponentIdMode::SetObjectName => component.set_object_name(name),
            ComponentIdMode::SetId => component.set_id(name),
        }

        match self.bindings.bind_component(name, component) {
            Ok(()) => {
                self.changed = true;
                Ok(())
            }
            Err(rejected) => {
                tracing::warn!(name, error = %rejected.error, "component not bound");
                Err(rejected)
            }
        }
    }

    /// Unbind the component bound to `name`, returning ownership
    pub fn unbind(&mut self, name: &str) -> Option<C> {
        let component = self.bindings.unbind(name)?;
        self.tracker.forget(&ComponentId::new(component.id()));
        self.changed = true;
        Some(component)
    }

    /// Unbind a component by identity, returning ownership
    pub fn unbind_component(&mut self, id: &ComponentId) -> Option<C> {
        let component = self.bindings.unbind_component(id)?;
        self.tracker.forget(id);
        self.changed = true;
        Some(component)
    }

    /// Register a function, replacing any function with the same name
    pub fn add_function<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&mut Template<C>, &[String], &mut String) -> Result<bool, RenderError> + 'static,
    {
        self.functions.add_fn(name, f);
        self.changed = true;
    }

    /// Register a built-in or prepared function under `name`
    pub fn set_function(&mut self, name: &str, function: Function<C>) {
        self.functions.add(name, function);
        self.changed = true;
    }

    pub fn remove_function(&mut self, name: &str) -> Option<Function<C>> {
        let removed = self.functions.remove(name);
        if removed.is_some() {
            self.changed = true;
        }
        removed
    }

    pub fn functions(&self) -> &FunctionRegistry<C> {
        &self.functions
    }

    /// Enable or disable a conditional block
    pub fn set_condition(&mut self, name: &str, value: bool) {
        if self.conditions.set(name, value) {
            self.changed = true;
        }
    }

    /// Value of a condition, `false` when never set
    pub fn condition_value(&self, name: &str) -> bool {
        self.conditions.value(name)
    }

    /// Names of the conditions that are true
    pub fn conditions_set(&self) -> impl Iterator<Item = &str> {
        self.conditions.names()
    }

    pub fn bindings(&self) -> &BindingStore<C> {
        &self.bindings
    }

    /// The component bound to `name`, without consulting the resolver
    pub fn component(&self, name: &str) -> Option<&C> {
        self.bindings.component(name)
    }

    /// All bound components with their variable names
    pub fn components(&self) -> impl Iterator<Item = (&str, &C)> {
        self.bindings.components()
    }

    /// Variable name of a bound component
    pub fn var_name(&self, id: &ComponentId) -> Option<&str> {
        self.bindings.var_name(id)
    }

    /// Resolve the component for a variable
    ///
    /// Unbound names are offered to the resolver; a component it supplies is
    /// bound under `name`.
    pub fn resolve_component(&mut self, name: &str) -> Option<&C> {
        self.resolve_unbound_component(name);
        self.bindings.component(name)
    }

    /// Mutable access to the component for a variable
    ///
    /// The template is marked changed, so the next render shows the edits.
    pub fn resolve_component_mut(&mut self, name: &str) -> Option<&mut C> {
        self.resolve_unbound_component(name);
        let component = self.bindings.component_mut(name)?;
        self.changed = true;
        Some(component)
    }

    fn resolve_unbound_component(&mut self, name: &str) {
        if self.bindings.get(name).is_some() {
            return;
        }
        if let Some(Resolved::Component(component)) = self.resolver.resolve_unbound(name, &[]) {
            self.bind_component(name, component).ok();
        }
    }

    /// Remove all bindings and conditions; functions are kept
    pub fn clear(&mut self) {
        self.bindings.clear();
        self.conditions.clear();
        self.changed = true;
    }

    /// Mark the template as changed and forget the components of earlier renders
    ///
    /// Needed when a custom resolver changes what it resolves to.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.changed = true;
    }

    /// Force the next render to re-walk the text, e.g. after a locale change
    pub fn refresh(&mut self) {
        self.changed = true;
    }

    /// Whether the next render re-walks the template text
    pub fn needs_render(&self) -> bool {
        self.changed || self.last.is_none()
    }

    /// Error text of the last render, empty after a successful render
    pub fn error_text(&self) -> &str {
        &self.error_text
    }

    /// Components emitted by the last render
    pub fn rendered_components(&self) -> &[ComponentId] {
        self.tracker.previously_rendered()
    }

    /// Render the template text
    ///
    /// An unchanged template returns its previous output with nothing removed.
    pub fn render(&mut self) -> Rendered {
        if !self.changed {
            if let Some(last) = &self.last {
                tracing::debug!("template unchanged, reusing last render");
                return last.clone();
            }
        }

        tracing::debug!(len = self.text.len(), "rendering template");
        self.tracker.begin();
        self.warnings.clear();
        self.depth = 0;
        // Changes made by functions during this walk leave the template stale
        self.changed = false;

        let encode = self.config.encode_internal_paths;
        let text = if encode && self.config.encode_template_text {
            self.path_encoder.encode(&self.text)
        } else {
            self.text.clone()
        };

        let mut output = String::new();
        let result = self.render_text(&text, &mut output);
        let removed = self.tracker.finish();

        let error = match result {
            Ok(()) => {
                if encode && !self.config.encode_template_text {
                    output = self.path_encoder.encode(&output);
                }
                self.error_text.clear();
                None
            }
            Err(e) => {
                tracing::debug!(error = %e, "render failed");
                self.error_text = e.to_string();
                output.clear();
                Some(e)
            }
        };

        let rendered = Rendered {
            output,
            rendered: self.tracker.previously_rendered().to_vec(),
            removed,
            warnings: std::mem::take(&mut self.warnings),
            error,
        };
        tracing::debug!(
            rendered = rendered.rendered.len(),
            removed = rendered.removed.len(),
            "render finished"
        );

        self.last = Some(Rendered {
            removed: Vec::new(),
            ..rendered.clone()
        });
        rendered
    }

    /// Render `text` into `out` with this template's bindings
    ///
    /// This is the routine `block` and `while` re-enter for macro blocks.
    pub fn render_text(&mut self, text: &str, out: &mut String) -> Result<(), RenderError> {
        let mut stack: Vec<BlockFrame> = Vec::new();

        for segment in Scanner::new(text) {
            let segment = segment?;
            let included = stack.last().map_or(true, |frame| frame.included);

            match segment.node {
                Segment::Literal(literal) => {
                    if included {
                        out.push_str(&literal);
                    }
                }
                Segment::Directive { directive, source } => match directive {
                    Directive::OpenBlock(name) => {
                        let value = included && self.conditions.value(name.node.as_str());
                        stack.push(BlockFrame {
                            name: name.node,
                            span: segment.span,
                            included: value,
                        });
                    }
                    Directive::CloseBlock(name) => match stack.pop() {
                        Some(frame) if frame.name == name.node => {}
                        Some(frame) => {
                            return Err(RenderError::unbalanced(
                                segment.span,
                                format!("'{}' closes block '{}'", name.node, frame.name),
                            ))
                        }
                        None => {
                            return Err(RenderError::unbalanced(
                                segment.span,
                                format!("no open block named '{}'", name.node),
                            ))
                        }
                    },
                    Directive::Reference(reference) => {
                        if included {
                            self.resolve_reference(&reference, &source, out)?;
                        }
                    }
                },
            }
        }

        match stack.pop() {
            Some(frame) => Err(RenderError::unbalanced(
                frame.span,
                format!("block '{}' is never closed", frame.name),
            )),
            None => Ok(()),
        }
    }

    fn resolve_reference(
        &mut self,
        reference: &Reference,
        source: &str,
        out: &mut String,
    ) -> Result<(), RenderError> {
        let name = reference.name.node.as_str();
        tracing::trace!(name, function = reference.is_function(), "resolving placeholder");

        if !reference.is_function() {
            self.resolve_string(name, &reference.arguments, out);
            return Ok(());
        }

        if !self.resolve_function(name, &reference.function_args(), out)? {
            tracing::debug!(name, "unresolved function");
            self.warnings.push(RenderWarning::UnresolvedFunction {
                name: name.to_string(),
            });
            out.push_str(source);
        }
        Ok(())
    }

    /// Resolve a variable into `out`
    ///
    /// Order: string or empty binding, bound component, the resolver hook,
    /// and finally the unresolved marker.
    pub fn resolve_string(&mut self, name: &str, args: &[Argument], out: &mut String) {
        let bound_component = match self.bindings.get(name) {
            Some(Binding::Text { value, format }) => {
                write_formatted(out, value, *format);
                return;
            }
            Some(Binding::Empty) => return,
            Some(Binding::Component { .. }) => true,
            None => false,
        };

        if bound_component {
            self.render_component(name, args, out);
            return;
        }

        match self.resolver.resolve_unbound(name, args) {
            Some(Resolved::Text(text)) => out.push_str(&text),
            Some(Resolved::Component(component)) => match self.bind_component(name, component) {
                Ok(()) => {
                    self.render_component(name, args, out);
                }
                Err(_) => self.handle_unresolved(name, args, out),
            },
            None => self.handle_unresolved(name, args, out),
        }
    }

    /// Apply a function to its arguments; returns whether a function matched
    pub fn resolve_function(
        &mut self,
        name: &str,
        args: &[String],
        out: &mut String,
    ) -> Result<bool, RenderError> {
        let Some(function) = self.functions.get(name) else {
            return Ok(false);
        };
        match function {
            Function::Tr => Ok(self.tr(args, out)),
            Function::Block => self.block(args, out),
            Function::While => self.while_loop(args, out),
            Function::Id => Ok(self.id(args, out)),
            Function::Custom(f) => f(self, args, out),
        }
    }

    fn render_component(&mut self, name: &str, args: &[Argument], out: &mut String) -> bool {
        let Some((id, component)) = self.bindings.bound_mut(name) else {
            return false;
        };
        if !args.is_empty() {
            component.apply_arguments(args);
        }
        component.render(out);
        self.tracker.record(id);
        true
    }

    fn handle_unresolved(&mut self, name: &str, args: &[Argument], out: &mut String) {
        tracing::debug!(name, "unresolved variable");
        self.warnings.push(RenderWarning::UnresolvedVariable {
            name: name.to_string(),
        });
        if !self.resolver.handle_unresolved(name, args, out) {
            self.write_unresolved_marker(name, out);
        }
    }

    pub(super) fn write_unresolved_marker(&self, name: &str, out: &mut String) {
        out.push_str(&self.config.unresolved_prefix);
        out.push_str(name);
        out.push_str(&self.config.unresolved_suffix);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Markup;
    use pretty_assertions::assert_eq;

    fn widget(id: &str) -> Markup {
        Markup::new(id, "<w id=\"{id}\" class=\"{class}\"/>")
    }

    fn render(t: &mut Template<Markup>) -> String {
        let result = t.render();
        assert!(result.is_ok(), "render failed: {:?}", result.error);
        result.output
    }

    fn ids(names: &[&str]) -> Vec<ComponentId> {
        names.iter().map(|n| ComponentId::new(*n)).collect()
    }

    #[test]
    fn test_text_without_placeholders_is_unchanged() {
        let text = "<div class=\"a\">$5 and $$10 {braces}</div>\n";
        let mut t: Template<Markup> = Template::new(text);
        assert_eq!(render(&mut t), text);
    }

    #[test]
    fn test_escaped_placeholder() {
        let mut t: Template<Markup> = Template::new("$${foo}");
        t.bind_string("foo", "bar", TextFormat::Plain);
        assert_eq!(render(&mut t), "${foo}");
    }

    #[test]
    fn test_string_formats() {
        let mut t: Template<Markup> = Template::new("${a}|${b}|${c}|${n}|${e}");
        t.bind_string("a", "<b>", TextFormat::Plain);
        t.bind_string("b", "<b>", TextFormat::Xhtml);
        t.bind_string("c", "<b>", TextFormat::UnsafeXhtml);
        t.bind_int("n", -42);
        t.bind_empty("e");
        assert_eq!(render(&mut t), "&lt;b&gt;|<b>|<b>|-42|");
    }

    #[test]
    fn test_component_substitution() {
        let mut t = Template::new("<p>${w}</p>");
        t.bind_component("w", widget("c1")).expect("Should bind");
        let result = t.render();
        assert_eq!(result.output, "<p><w id=\"c1\" class=\"\"/></p>");
        assert_eq!(result.rendered, ids(&["c1"]));
        assert!(result.removed.is_empty());
    }

    #[test]
    fn test_component_arguments_add_classes() {
        let mut t = Template::new(r#"${w class="btn primary"}"#);
        t.bind_component("w", widget("c1")).expect("Should bind");
        assert_eq!(render(&mut t), "<w id=\"c1\" class=\"btn primary\"/>");
    }

    #[test]
    fn test_conditional_blocks() {
        let mut t: Template<Markup> =
            Template::new("a${<x>}b${<y>}c${</y>}d${</x>}e");
        assert_eq!(render(&mut t), "ae");

        t.set_condition("x", true);
        assert_eq!(render(&mut t), "abde");

        t.set_condition("y", true);
        assert_eq!(render(&mut t), "abcde");

        t.set_condition("x", false);
        assert_eq!(render(&mut t), "ae");
    }

    #[test]
    fn test_excluded_component_is_not_rendered() {
        let mut t = Template::new("${<show>}${w}${</show>}");
        t.bind_component("w", widget("c1")).expect("Should bind");
        let result = t.render();
        assert_eq!(result.output, "");
        assert!(result.rendered.is_empty());

        t.set_condition("show", true);
        let result = t.render();
        assert_eq!(result.rendered, ids(&["c1"]));

        t.set_condition("show", false);
        let result = t.render();
        assert_eq!(result.removed, ids(&["c1"]));
    }

    #[test]
    fn test_excluded_functions_do_not_run() {
        let mut t: Template<Markup> = Template::new("${<x>}${count:}${</x>}");
        t.add_function("count", |t, _, _| {
            t.set_condition("ran", true);
            Ok(true)
        });
        render(&mut t);
        assert!(!t.condition_value("ran"));
    }

    #[test]
    fn test_mismatched_close_fails() {
        let mut t: Template<Markup> = Template::new("ok ${<a>}x${</b>}");
        t.set_condition("a", true);
        let result = t.render();
        assert!(matches!(
            result.error,
            Some(RenderError::UnbalancedBlock { .. })
        ));
        assert_eq!(result.output, "");
        assert!(t.error_text().contains("'b' closes block 'a'"));
    }

    #[test]
    fn test_missing_close_fails() {
        let mut t: Template<Markup> = Template::new("${<a>}x");
        let result = t.render();
        assert!(matches!(
            result.error,
            Some(RenderError::UnbalancedBlock { ref span, .. }) if *span == (0..6)
        ));
    }

    #[test]
    fn test_stray_close_fails() {
        let mut t: Template<Markup> = Template::new("x${</a>}");
        assert!(!t.render().is_ok());
        assert!(t.error_text().contains("no open block named 'a'"));
    }

    #[test]
    fn test_malformed_placeholder_fails() {
        let mut t: Template<Markup> = Template::new("a ${b");
        let result = t.render();
        assert!(matches!(result.error, Some(RenderError::Parse(_))));
        assert!(!t.error_text().is_empty());
    }

    #[test]
    fn test_error_text_cleared_after_success() {
        let mut t: Template<Markup> = Template::new("${<a>}");
        assert!(!t.render().is_ok());
        t.set_template_text("fine", TextFormat::Xhtml);
        assert!(t.render().is_ok());
        assert_eq!(t.error_text(), "");
    }

    #[test]
    fn test_else_is_an_independent_condition() {
        let mut t: Template<Markup> =
            Template::new("<div>${<if>}Yes${</if>}${<else>}No${</else>}</div>");
        assert_eq!(render(&mut t), "<div></div>");

        t.set_condition("if", true);
        assert_eq!(render(&mut t), "<div>Yes</div>");

        t.set_condition("else", true);
        assert_eq!(render(&mut t), "<div>YesNo</div>");
    }

    #[test]
    fn test_unresolved_variable() {
        let mut t: Template<Markup> = Template::new("${mystery}");
        let result = t.render();
        assert_eq!(result.output, "??mystery??");
        assert_eq!(
            result.warnings,
            vec![RenderWarning::UnresolvedVariable {
                name: "mystery".to_string()
            }]
        );
    }

    #[test]
    fn test_configured_unresolved_marker() {
        let mut t: Template<Markup> = Template::new("${mystery}")
            .with_config(TemplateConfig::new().with_unresolved_marker("[missing:", "]"));
        assert_eq!(render(&mut t), "[missing:mystery]");
    }

    #[test]
    fn test_unresolved_function_left_verbatim() {
        let mut t: Template<Markup> = Template::new(r#"a ${nope:x k="v"} b"#);
        let result = t.render();
        assert_eq!(result.output, r#"a ${nope:x k="v"} b"#);
        assert_eq!(
            result.warnings,
            vec![RenderWarning::UnresolvedFunction {
                name: "nope".to_string()
            }]
        );
    }

    struct Fallback;

    impl Resolver<Markup> for Fallback {
        fn resolve_unbound(&mut self, name: &str, _args: &[Argument]) -> Option<Resolved<Markup>> {
            match name {
                "lazy" => Some(Resolved::Component(widget("lazy-1"))),
                "missing" => None,
                other => Some(Resolved::Text(format!("<{}>", other))),
            }
        }

        fn handle_unresolved(&self, name: &str, _args: &[Argument], out: &mut String) -> bool {
            out.push_str(&format!("(no {})", name));
            true
        }
    }

    #[test]
    fn test_string_binding_beats_resolver() {
        let mut t = Template::new("${name}").with_resolver(Fallback);
        assert_eq!(render(&mut t), "<name>");
        t.bind_string("name", "bound", TextFormat::Plain);
        assert_eq!(render(&mut t), "bound");
    }

    #[test]
    fn test_resolver_component_is_bound() {
        let mut t = Template::new("${lazy} ${missing}").with_resolver(Fallback);
        let result = t.render();
        assert_eq!(result.output, "<w id=\"lazy-1\" class=\"\"/> (no missing)");
        assert_eq!(result.rendered, ids(&["lazy-1"]));
        assert_eq!(t.component("lazy").map(|c| c.id.as_str()), Some("lazy-1"));
        assert_eq!(t.var_name(&ComponentId::new("lazy-1")), Some("lazy"));
    }

    #[test]
    fn test_resolve_component_uses_resolver() {
        let mut t = Template::new("").with_resolver(Fallback);
        assert!(t.component("lazy").is_none());
        assert_eq!(t.resolve_component("lazy").map(|c| c.id.clone()), Some("lazy-1".to_string()));
        assert!(t.resolve_component("text-only").is_none());
        t.resolve_component_mut("lazy")
            .expect("Should resolve")
            .add_style_class("big");
        assert_eq!(t.component("lazy").map(|c| c.classes.clone()), Some(vec!["big".to_string()]));
    }

    #[test]
    fn test_consecutive_renders_are_idempotent() {
        let mut t = Template::new("${a} ${b}");
        t.bind_component("a", widget("c1")).expect("Should bind");
        t.bind_string("b", "x", TextFormat::Plain);
        let first = t.render();
        assert!(!t.needs_render());
        let second = t.render();
        assert_eq!(first.output, second.output);
        assert_eq!(second.rendered, ids(&["c1"]));
        assert!(second.removed.is_empty());

        t.refresh();
        let third = t.render();
        assert_eq!(third.output, first.output);
        assert!(third.removed.is_empty());
    }

    #[test]
    fn test_changes_made_during_render_leave_template_stale() {
        let mut t: Template<Markup> = Template::new("${n}${<go>}${bump:}${</go>}");
        t.bind_int("n", 0);
        t.set_condition("go", true);
        t.add_function("bump", |t, _, _| {
            t.bind_int("n", 1);
            t.set_condition("go", false);
            Ok(true)
        });

        assert_eq!(render(&mut t), "0");
        assert!(t.needs_render());
        assert_eq!(render(&mut t), "1");
        assert!(!t.needs_render());
        assert_eq!(render(&mut t), "1");
    }

    #[test]
    fn test_component_edited_in_place_is_rerendered() {
        let mut t = Template::new("${w}");
        t.bind_component("w", Markup::new("w1", "<w class=\"{class}\"/>"))
            .expect("Should bind");
        assert_eq!(render(&mut t), "<w class=\"\"/>");

        t.resolve_component_mut("w")
            .expect("Should resolve")
            .add_style_class("big");
        assert!(t.needs_render());
        assert_eq!(render(&mut t), "<w class=\"big\"/>");

        assert!(t.resolve_component_mut("nothing").is_none());
        assert!(!t.needs_render());
    }

    #[test]
    fn test_rebinding_reports_removed_component() {
        let mut t = Template::new("${a}");
        t.bind_component("a", widget("c1")).expect("Should bind");
        t.render();

        t.bind_component("a", widget("c2")).expect("Should bind");
        let result = t.render();
        assert_eq!(result.removed, ids(&["c1"]));
        assert_eq!(result.rendered, ids(&["c2"]));
    }

    #[test]
    fn test_already_bound_component_rejected() {
        let mut t = Template::new("${a}${b}");
        t.bind_component("a", widget("c1")).expect("Should bind");
        let rejected = t.bind_component("b", widget("c1")).unwrap_err();
        assert_eq!(rejected.component.id, "c1");
        assert!(t.component("b").is_none());
    }

    #[test]
    fn test_unbind_is_not_reported_removed() {
        let mut t = Template::new("${a}${b}");
        t.bind_component("a", widget("c1")).expect("Should bind");
        t.bind_component("b", widget("c2")).expect("Should bind");
        t.render();

        let c1 = t.unbind("a").expect("Should unbind");
        assert_eq!(c1.id, "c1");
        let c2 = t
            .unbind_component(&ComponentId::new("c2"))
            .expect("Should unbind");
        assert_eq!(c2.id, "c2");
        assert!(t.unbind("a").is_none());

        let result = t.render();
        assert!(result.removed.is_empty());
        assert_eq!(result.output, "??a????b??");
    }

    #[test]
    fn test_new_template_text_resets_tracking() {
        let mut t = Template::new("${a}");
        t.bind_component("a", widget("c1")).expect("Should bind");
        t.render();

        t.set_template_text("nothing here", TextFormat::UnsafeXhtml);
        let result = t.render();
        assert_eq!(result.output, "nothing here");
        assert!(result.removed.is_empty());
        assert_eq!(t.text_format(), TextFormat::UnsafeXhtml);
        assert!(t.component("a").is_some());
    }

    #[test]
    fn test_reset_forces_rematerialization() {
        let mut t = Template::new("${a}");
        t.bind_component("a", widget("c1")).expect("Should bind");
        t.render();
        t.reset();
        t.bind_component("a", widget("c2")).expect("Should bind");
        let result = t.render();
        assert!(result.removed.is_empty());
        assert_eq!(result.rendered, ids(&["c2"]));
    }

    #[test]
    fn test_clear_keeps_functions() {
        let mut t = Template::new("${<x>}${a}${</x>}${hi:}");
        t.add_function("hi", |_, _, out| {
            out.push_str("hi");
            Ok(true)
        });
        t.bind_component("a", widget("c1")).expect("Should bind");
        t.set_condition("x", true);
        t.render();

        t.clear();
        let result = t.render();
        assert_eq!(result.output, "hi");
        assert_eq!(result.removed, ids(&["c1"]));
        assert_eq!(t.conditions_set().count(), 0);
        assert_eq!(t.components().count(), 0);
    }

    #[test]
    fn test_component_id_modes() {
        let mut t = Template::new("${field}")
            .with_config(TemplateConfig::new().with_component_id_mode(ComponentIdMode::SetId));
        t.bind_component("field", widget("auto-7")).expect("Should bind");
        let result = t.render();
        assert_eq!(result.rendered, ids(&["field"]));

        let mut t = Template::new("${field}").with_config(
            TemplateConfig::new().with_component_id_mode(ComponentIdMode::SetObjectName),
        );
        t.bind_component("field", widget("auto-7")).expect("Should bind");
        assert_eq!(
            t.component("field").and_then(|c| c.object_name.clone()),
            Some("field".to_string())
        );
    }

    #[test]
    fn test_internal_path_encoding_before_resolution() {
        let mut t: Template<Markup> = Template::new(r##"<a href="#/docs">${link}</a>"##)
            .with_config(TemplateConfig::new().with_internal_path_encoding(true));
        t.bind_string("link", r##"<a href="#/raw">r</a>"##, TextFormat::Xhtml);
        assert_eq!(
            render(&mut t),
            r##"<a href="?_=/docs"><a href="#/raw">r</a></a>"##
        );
    }

    #[test]
    fn test_internal_path_encoding_after_resolution() {
        let mut t: Template<Markup> = Template::new(r#"<a href="${target}">x</a>"#).with_config(
            TemplateConfig::new()
                .with_internal_path_encoding(true)
                .with_encode_template_text(false),
        );
        t.bind_string("target", "#/about", TextFormat::Xhtml);
        assert_eq!(render(&mut t), r#"<a href="?_=/about">x</a>"#);
    }
}
