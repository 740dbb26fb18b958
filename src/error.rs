//! Error types for parsing and rendering

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::ast::Span;
use crate::parser::lexer::Token;

/// A placeholder that cannot be parsed
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("malformed placeholder at {span:?}: {message}")]
    MalformedDirective {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    /// Create a malformed placeholder error without expectations
    pub fn malformed(span: Span, message: impl Into<String>) -> Self {
        Self::MalformedDirective {
            span,
            message: message.into(),
            expected: Vec::new(),
        }
    }

    pub fn span(&self) -> &Span {
        match self {
            Self::MalformedDirective { span, .. } => span,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            ParseError::MalformedDirective {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                report(
                    source,
                    filename,
                    span.clone(),
                    message,
                    &format!("{}{}", message, expected_str),
                )
            }
        }
    }
}

/// Fatal errors that abort a render
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A close marker without a matching open marker, or open blocks left at the end
    #[error("unbalanced block at {span:?}: {message}")]
    UnbalancedBlock { span: Span, message: String },

    /// Nested `block`/`while` expansion went too deep
    #[error("macro block '{key}' exceeds the nesting limit of {depth}")]
    RecursionLimit { key: String, depth: usize },

    /// An error in the text of a macro block; its span points into that text
    #[error("in macro block '{key}': {error}")]
    MacroBlock { key: String, error: Box<RenderError> },
}

impl RenderError {
    pub fn unbalanced(span: Span, message: impl Into<String>) -> Self {
        Self::UnbalancedBlock {
            span,
            message: message.into(),
        }
    }

    /// Get the span in the template text, if the error has one
    ///
    /// Errors inside macro blocks have none, their spans belong to the block.
    pub fn span(&self) -> Option<&Span> {
        match self {
            Self::Parse(e) => Some(e.span()),
            Self::UnbalancedBlock { span, .. } => Some(span),
            Self::RecursionLimit { .. } | Self::MacroBlock { .. } => None,
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        match self {
            Self::Parse(e) => e.format(source, filename),
            Self::UnbalancedBlock { span, message } => {
                report(source, filename, span.clone(), "unbalanced block", message)
            }
            Self::RecursionLimit { .. } | Self::MacroBlock { .. } => self.to_string(),
        }
    }
}

/// Problems that do not abort a render
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderWarning {
    /// Replaced by the unresolved marker
    #[error("unresolved variable '{name}'")]
    UnresolvedVariable { name: String },

    /// Left in the output as written
    #[error("unresolved function '{name}'")]
    UnresolvedFunction { name: String },

    #[error("while loop on '{condition}' stopped after {iterations} iterations")]
    LoopLimit { condition: String, iterations: usize },
}

fn report(source: &str, filename: &str, span: Span, message: &str, label: &str) -> String {
    let mut buf = Vec::new();
    let written = Report::build(ReportKind::Error, filename, span.start)
        .with_message(message)
        .with_label(
            Label::new((filename, span))
                .with_message(label)
                .with_color(Color::Red),
        )
        .finish()
        .write((filename, Source::from(source)), &mut buf);
    match written {
        Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
        Err(_) => format!("{}: {}", message, label),
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of placeholder".to_string(),
                };
                format!("unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("'}'".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::MalformedDirective {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Name(s) => format!("name '{}'", s),
        Token::Bare(s) => format!("value '{}'", s),
        Token::Quoted(s) => format!("string \"{}\"", s),
        Token::Close => "'}'".to_string(),
        Token::CloseTag => "'</'".to_string(),
        Token::Lt => "'<'".to_string(),
        Token::Gt => "'>'".to_string(),
        Token::Colon => "':'".to_string(),
        Token::Equals => "'='".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_display() {
        let err = ParseError::malformed(2..5, "unterminated placeholder");
        assert!(err.to_string().contains("unterminated placeholder"));
        assert_eq!(err.span(), &(2..5));
    }

    #[test]
    fn test_unbalanced_display() {
        let err = RenderError::unbalanced(0..8, "'b' closes 'a'");
        assert!(err.to_string().contains("unbalanced block"));
        assert_eq!(err.span(), Some(&(0..8)));
    }

    #[test]
    fn test_macro_block_error_has_no_template_span() {
        let inner = RenderError::unbalanced(0..6, "block 'x' is never closed");
        let err = RenderError::MacroBlock {
            key: "row".to_string(),
            error: Box::new(inner),
        };
        assert_eq!(err.span(), None);
        assert_eq!(
            err.format("${<y>}${</y>}", "page.html"),
            "in macro block 'row': unbalanced block at 0..6: block 'x' is never closed"
        );
    }

    #[test]
    fn test_format_includes_source_context() {
        let source = "<p>${</x>}</p>";
        let err = RenderError::unbalanced(3..10, "no open block named 'x'");
        let formatted = err.format(source, "page.html");
        assert!(formatted.contains("page.html"));
        assert!(formatted.contains("no open block named 'x'"));
    }
}
