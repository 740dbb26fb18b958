//! Built-in functions: `tr`, `block`, `while` and `id`

use crate::component::Component;
use crate::error::{RenderError, RenderWarning};

use super::resolver::Template;

impl<C: Component> Template<C> {
    /// `${tr:key}` writes the localized string for `key`
    ///
    /// A missing message writes the unresolved marker around the key.
    pub(super) fn tr(&mut self, args: &[String], out: &mut String) -> bool {
        let Some(key) = args.first() else {
            return false;
        };
        match self.localizer.translate(key) {
            Some(message) => out.push_str(&message),
            None => {
                tracing::debug!(key = %key, "no message for key");
                self.write_unresolved_marker(key, out);
            }
        }
        true
    }

    /// `${block:key arg1 arg2}` renders the message `key` as template text
    /// after substituting `{1}`, `{2}`, ... with the remaining arguments
    pub(super) fn block(&mut self, args: &[String], out: &mut String) -> Result<bool, RenderError> {
        let Some((key, params)) = args.split_first() else {
            return Ok(false);
        };
        let text = self.macro_text(key, params);
        self.render_nested(key, &text, out)?;
        Ok(true)
    }

    /// `${while:condition key args...}` renders the block `key` as long as
    /// `condition` holds
    ///
    /// The condition is re-read before every pass so that functions inside the
    /// block can end the loop. Looping stops at the configured cap.
    pub(super) fn while_loop(
        &mut self,
        args: &[String],
        out: &mut String,
    ) -> Result<bool, RenderError> {
        let [condition, key, params @ ..] = args else {
            return Ok(false);
        };
        let text = self.macro_text(key, params);

        let mut iterations = 0;
        while self.conditions.value(condition) {
            if iterations >= self.config.max_while_iterations {
                tracing::warn!(condition = %condition, iterations, "while loop hit iteration cap");
                self.warnings.push(RenderWarning::LoopLimit {
                    condition: condition.clone(),
                    iterations,
                });
                break;
            }
            self.render_nested(key, &text, out)?;
            iterations += 1;
        }
        Ok(true)
    }

    /// `${id:name}` writes the identifier of the component bound to `name`
    pub(super) fn id(&mut self, args: &[String], out: &mut String) -> bool {
        let Some(name) = args.first() else {
            return false;
        };
        match self.resolve_component(name) {
            Some(component) => {
                out.push_str(component.id());
                true
            }
            None => false,
        }
    }

    fn macro_text(&self, key: &str, params: &[String]) -> String {
        match self.localizer.translate(key) {
            Some(text) => substitute_positional(&text, params),
            None => {
                tracing::debug!(key, "no macro block for key");
                let mut marker = String::new();
                self.write_unresolved_marker(key, &mut marker);
                marker
            }
        }
    }

    fn render_nested(&mut self, key: &str, text: &str, out: &mut String) -> Result<(), RenderError> {
        if self.depth >= self.config.max_block_depth {
            return Err(RenderError::RecursionLimit {
                key: key.to_string(),
                depth: self.config.max_block_depth,
            });
        }
        self.depth += 1;
        let result = self.render_text(text, out);
        self.depth -= 1;
        result.map_err(|e| match e {
            RenderError::Parse(_) | RenderError::UnbalancedBlock { .. } => RenderError::MacroBlock {
                key: key.to_string(),
                error: Box::new(e),
            },
            other => other,
        })
    }
}

/// Replace `{1}`, `{2}`, ... with the matching parameter
///
/// Markers without a parameter are left as written. Substituted values are not
/// scanned again.
pub fn substitute_positional(text: &str, params: &[String]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let index = if digits > 0 && after[digits..].starts_with('}') {
            after[..digits].parse::<usize>().ok()
        } else {
            None
        };

        match index
            .and_then(|i| i.checked_sub(1))
            .and_then(|i| params.get(i))
        {
            Some(value) => {
                out.push_str(value);
                rest = &after[digits + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
