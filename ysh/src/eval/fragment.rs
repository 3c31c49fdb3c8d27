//! Expression text to fragments.
//!
//! Every punctuation character is its own fragment, except the multi-character
//! operators and decimal literals, which are kept whole so the operator table
//! can see them. Double-quoted string literals are one fragment including the
//! quotes.

use chumsky::prelude::*;

use super::GrammarError;

fn fragmenter() -> impl Parser<char, Vec<String>, Error = Simple<char>> {
    let escape = just('\\')
        .then(any())
        .map(|(slash, c): (char, char)| format!("{slash}{c}"));
    let plain = filter(|c: &char| *c != '"' && *c != '\\').map(|c: char| c.to_string());
    let string = escape
        .or(plain)
        .repeated()
        .delimited_by(just('"'), just('"'))
        .map(|parts: Vec<String>| format!("\"{}\"", parts.concat()));

    let number = text::digits(10)
        .then(just('.').ignore_then(text::digits(10)).or_not())
        .map(|(int, frac): (String, Option<String>)| match frac {
            Some(frac) => format!("{int}.{frac}"),
            None => int,
        });

    let word = filter(|c: &char| c.is_alphanumeric() || *c == '_')
        .repeated()
        .at_least(1)
        .collect::<String>();

    // longest first
    let operator = choice((
        just("<=>"),
        just("<-"),
        just("->"),
        just("<="),
        just(">="),
        just("!="),
        just("<<"),
        just(">>"),
        just("++"),
    ))
    .map(|op: &str| op.to_string());

    let punctuation = filter(|c: &char| {
        !c.is_whitespace() && !c.is_alphanumeric() && *c != '_' && *c != '"'
    })
    .map(|c: char| c.to_string());

    choice((string, number, word, operator, punctuation))
        .padded()
        .repeated()
        .then_ignore(end())
}

/// Split expression text into fragments for the shunting-yard pass.
pub fn fragments(expr: &str) -> Result<Vec<String>, GrammarError> {
    fragmenter().parse(expr).map_err(|errors| {
        let detail = errors
            .first()
            .map_or_else(|| "unreadable expression".to_string(), ToString::to_string);
        GrammarError::Fragment(detail)
    })
}
