//! Placeholder body parser using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::parser::ast::*;
use crate::parser::lexer::Token;

/// Parse the tokens of one placeholder body into a [`Directive`]
///
/// `end` is the offset reported when the body runs out of tokens.
pub fn parse_directive(tokens: Vec<(Token, Span)>, end: usize) -> Result<Directive, ParseError> {
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((end..end).into(), |(t, s): (_, _)| (t, s));

    directive_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| match errs.into_iter().next() {
            Some(err) => err.into(),
            None => ParseError::malformed(end..end, "invalid placeholder"),
        })
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn directive_parser<'a, I>() -> impl Parser<'a, I, Directive, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let name = select! {
        Token::Name(s) => Identifier::new(s),
    }
    .labelled("placeholder name")
    .map_with(|id, e| Spanned::new(id, span_range(&e.span())));

    let value = select! {
        Token::Name(s) => s,
        Token::Bare(s) => s,
        Token::Quoted(s) => s,
    }
    .labelled("argument value");

    // ${<name>}
    let open_block = just(Token::Lt)
        .ignore_then(name.clone())
        .then_ignore(just(Token::Gt))
        .map(Directive::OpenBlock);

    // ${</name>}
    let close_block = just(Token::CloseTag)
        .ignore_then(name.clone())
        .then_ignore(just(Token::Gt))
        .map(Directive::CloseBlock);

    // key=value or a positional value
    let argument = choice((
        select! { Token::Name(s) => s }
            .then_ignore(just(Token::Equals))
            .then(value.clone())
            .map(|(key, value)| Argument::named(key, value)),
        value.clone().map(Argument::positional),
    ));

    // ${name args...} or ${fun:arg args...}
    let function_arg = just(Token::Colon).ignore_then(value.or_not().map(Option::unwrap_or_default));

    let reference = name
        .then(function_arg.or_not())
        .then(argument.repeated().collect::<Vec<_>>())
        .map(|((name, function_arg), arguments)| {
            Directive::Reference(Reference {
                name,
                function_arg,
                arguments,
            })
        });

    choice((open_block, close_block, reference)).then_ignore(end())
}
