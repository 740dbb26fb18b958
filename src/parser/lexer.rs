//! Lexers for template text using logos
//!
//! Template text is lexed in two modes. [`TextToken`] splits the document into
//! literal runs and placeholder openers; once a `${` is seen the lexer morphs
//! into [`Token`] for the placeholder body and back again after the closing `}`.

use logos::Logos;

pub use super::ast::Span;

/// Tokens of the literal (outer) text mode
#[derive(Logos, Debug, Clone, PartialEq, Eq)]
pub enum TextToken {
    /// `$${`, an escaped placeholder opener
    #[token("$${")]
    EscapedOpen,

    /// `${`
    #[token("${")]
    Open,

    /// A lone `$`
    #[token("$")]
    Dollar,

    #[regex(r"[^$]+")]
    Text,
}

/// Tokens of a placeholder body, between `${` and `}`
#[derive(Logos, Debug, Clone, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n]+")]
pub enum Token {
    #[token("}")]
    Close,

    // Block markers (longer first)
    #[token("</")]
    CloseTag,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,

    #[token(":")]
    Colon,
    #[token("=")]
    Equals,

    /// Placeholder and argument names
    #[regex(r"[A-Za-z0-9_.\-]+", |lex| lex.slice().to_string(), priority = 3)]
    Name(String),

    /// Unquoted argument value that is not a valid name
    #[regex(r#"[^ \t\r\n}"'=:<>]+"#, |lex| lex.slice().to_string(), priority = 1)]
    Bare(String),

    /// Single or double quoted value, quotes stripped
    #[regex(r#""[^"]*""#, |lex| unquote(lex.slice()))]
    #[regex(r"'[^']*'", |lex| unquote(lex.slice()))]
    Quoted(String),
}

fn unquote(s: &str) -> String {
    s[1..s.len() - 1].to_string()
}

/// Lex a placeholder body into tokens with spans, skipping invalid input
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}
