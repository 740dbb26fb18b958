//! markup-template - placeholder templates with incremental component binding
//!
//! Template text contains `${name}` variables, `${fun:arg}` function calls and
//! `${<cond>}...${</cond>}` conditional blocks. Variables are bound to strings
//! or to components; each render reports which components appeared and which
//! disappeared since the previous render.
//!
//! # Example
//!
//! ```rust
//! use markup_template::{Markup, MessageBundle, Template, TextFormat};
//!
//! let mut t = Template::new(
//!     "<p>${tr:greeting}, ${user}!</p>${<admin>}${panel}${</admin>}",
//! )
//! .with_localizer(MessageBundle::new().with_message("greeting", "Hello"));
//! t.bind_string("user", "<Ann>", TextFormat::Plain);
//! t.bind_component("panel", Markup::new("p1", "<div id=\"{id}\"></div>"))
//!     .map_err(|r| r.error)
//!     .unwrap();
//!
//! let result = t.render();
//! assert_eq!(result.output, "<p>Hello, &lt;Ann&gt;!</p>");
//! assert!(result.rendered.is_empty());
//!
//! t.set_condition("admin", true);
//! let result = t.render();
//! assert!(result.output.ends_with("<div id=\"p1\"></div>"));
//! assert_eq!(result.rendered[0].as_str(), "p1");
//! ```

pub mod binding;
pub mod component;
pub mod config;
pub mod error;
pub mod format;
pub mod messages;
pub mod parser;
pub mod template;
pub mod tracker;

pub use binding::{Binding, BindingError, BindingStore, ConditionSet, Rejected};
pub use component::{
    Component, ComponentId, Localizer, Markup, NoFallback, NoMessages, Resolved, Resolver,
};
pub use config::{ComponentIdMode, ConfigError, TemplateConfig};
pub use error::{ParseError, RenderError, RenderWarning};
pub use format::{PathEncoder, QueryPathEncoder, TextFormat};
pub use messages::MessageBundle;
pub use parser::{scan, Argument, Scanner};
pub use template::{Function, FunctionRegistry, Rendered, Template};

/// Render template text with plain string bindings and default configuration
///
/// # Example
///
/// ```rust
/// use markup_template::render;
///
/// let html = render("<b>${who}</b> $${kept}", &[("who", "R&D")]).unwrap();
/// assert_eq!(html, "<b>R&amp;D</b> ${kept}");
/// ```
pub fn render(text: &str, strings: &[(&str, &str)]) -> Result<String, RenderError> {
    render_with_messages(text, strings, NoMessages)
}

/// Render template text with plain string bindings and a message source
///
/// # Example
///
/// ```rust
/// use markup_template::{render_with_messages, MessageBundle};
///
/// let messages = MessageBundle::new().with_message("greeting", "Hello");
/// let html = render_with_messages("${tr:greeting}", &[], messages).unwrap();
/// assert_eq!(html, "Hello");
/// ```
pub fn render_with_messages(
    text: &str,
    strings: &[(&str, &str)],
    localizer: impl Localizer + 'static,
) -> Result<String, RenderError> {
    let mut template: Template<Markup> = Template::new(text).with_localizer(localizer);
    for (name, value) in strings {
        template.bind_string(name, *value, TextFormat::Plain);
    }

    let rendered = template.render();
    match rendered.error {
        Some(e) => Err(e),
        None => Ok(rendered.output),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_plain_bindings() {
        let html = render("${a}-${b}", &[("a", "1"), ("b", "<2>")]).unwrap();
        assert_eq!(html, "1-&lt;2&gt;");
    }

    #[test]
    fn test_render_reports_unbalanced_blocks() {
        let err = render("${<open>}", &[]).unwrap_err();
        assert!(matches!(err, RenderError::UnbalancedBlock { .. }));
    }

    #[test]
    fn test_render_unbound_marker() {
        assert_eq!(render("${x}", &[]).unwrap(), "??x??");
    }
}
