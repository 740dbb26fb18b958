//! Scanner and parser for template text

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::parse_directive;

use logos::{Lexer, Logos};

use crate::error::ParseError;
use lexer::{TextToken, Token};

/// Splits template text into literal runs and placeholders
///
/// Adjacent literal tokens are merged, so a directive-free text yields a single
/// [`Segment::Literal`]. Scanning stops after the first error.
pub struct Scanner<'a> {
    lexer: Option<Lexer<'a, TextToken>>,
    pending: Option<Spanned<Segment>>,
}

impl<'a> Scanner<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::at(source, 0)
    }

    /// Start scanning at a byte offset into `source`
    pub fn at(source: &'a str, offset: usize) -> Self {
        let mut offset = offset.min(source.len());
        while !source.is_char_boundary(offset) {
            offset -= 1;
        }
        let mut lexer = TextToken::lexer(source);
        lexer.bump(offset);
        Self {
            lexer: Some(lexer),
            pending: None,
        }
    }
}

impl Iterator for Scanner<'_> {
    type Item = Result<Spanned<Segment>, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(segment) = self.pending.take() {
            return Some(Ok(segment));
        }

        let mut lexer = self.lexer.take()?;
        let mut literal = String::new();
        let mut literal_span: Option<Span> = None;

        loop {
            let Some(token) = lexer.next() else {
                break;
            };
            let span = lexer.span();
            match token {
                Ok(TextToken::Open) => {
                    let (rest, directive) = scan_directive(lexer, span.start);
                    let directive = match directive {
                        Ok(d) => d,
                        // Leave the lexer behind, nothing after an error is scanned
                        Err(e) => return Some(Err(e)),
                    };
                    self.lexer = Some(rest);
                    return Some(Ok(match literal_span {
                        Some(span) => {
                            self.pending = Some(directive);
                            Spanned::new(Segment::Literal(literal), span)
                        }
                        None => directive,
                    }));
                }
                Ok(TextToken::EscapedOpen) => literal.push_str("${"),
                Ok(TextToken::Text) | Ok(TextToken::Dollar) | Err(()) => {
                    literal.push_str(lexer.slice())
                }
            }
            literal_span = Some(match literal_span {
                Some(s) => s.start..span.end,
                None => span,
            });
        }

        literal_span.map(|span| Ok(Spanned::new(Segment::Literal(literal), span)))
    }
}

/// Scan a placeholder body after its `${` opener
///
/// Returns the lexer in text mode, positioned after the closing `}`.
fn scan_directive(
    lexer: Lexer<'_, TextToken>,
    start: usize,
) -> (Lexer<'_, TextToken>, Result<Spanned<Segment>, ParseError>) {
    let mut inner = lexer.morph::<Token>();
    let mut tokens = Vec::new();

    let closed = loop {
        match inner.next() {
            Some(Ok(Token::Close)) => break Ok(inner.span()),
            Some(Ok(tok)) => tokens.push((tok, inner.span())),
            Some(Err(())) => {
                let span = inner.span();
                let message = if inner.slice().starts_with(['"', '\'']) {
                    "unterminated quoted argument".to_string()
                } else {
                    format!("unexpected '{}' in placeholder", inner.slice())
                };
                break Err(ParseError::malformed(span, message));
            }
            None => {
                break Err(ParseError::malformed(
                    start..inner.source().len(),
                    "unterminated placeholder, missing '}'",
                ))
            }
        }
    };

    let lexer: Lexer<'_, TextToken> = inner.morph();
    let result = closed.and_then(|close| {
        let directive = parse_directive(tokens, close.start)?;
        let source = lexer.source()[start..close.end].to_string();
        Ok(Spanned::new(
            Segment::Directive { directive, source },
            start..close.end,
        ))
    });
    (lexer, result)
}

/// Scan a whole template text
pub fn scan(source: &str) -> Result<Vec<Spanned<Segment>>, ParseError> {
    Scanner::new(source).collect()
}
