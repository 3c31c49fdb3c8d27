//! Line tokenizer for ysh
//!
//! Splits one line into classified lexemes. Whitespace separates lexemes,
//! except inside string literals and bracketed groups, which are tracked on a
//! nesting stack and kept whole. Group contents are not tokenized here.
//!
//! [`Tokenizer`] is a lazy iterator: each call to `next` scans exactly one
//! lexeme, and dropping it part way through is always fine.

use std::fmt;

use thiserror::Error;
use tracing::trace;

/// Grammar failures that make a line impossible to tokenize.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected '{found}' at offset {offset} with no matching opener")]
    UnbalancedBracket { found: char, offset: usize },

    #[error("expected '{expected}' but found '{found}' at offset {offset}")]
    MismatchedBracket {
        expected: char,
        found: char,
        offset: usize,
    },

    #[error("unterminated group opened by '{opener}'")]
    UnterminatedGroup { opener: char },

    #[error("escape character at end of line")]
    DanglingEscape,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Comment,
    Empty,
    Expression,
    Name,
    Operator,
    Option,
    Pack,
    Script,
    String,
}

impl TokenKind {
    /// Classify a finished lexeme by its first character.
    pub fn classify(lexeme: &str) -> Self {
        match lexeme.chars().next() {
            None => Self::Empty,
            Some('#') => Self::Comment,
            Some('(') => Self::Expression,
            Some('-') => Self::Option,
            Some('[') => Self::Pack,
            Some('{') => Self::Script,
            Some('"') => Self::String,
            Some(c) if is_operator_char(c) => Self::Operator,
            Some(_) => Self::Name,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
}

impl Token {
    pub fn new(lexeme: impl Into<String>) -> Self {
        let lexeme = lexeme.into();
        Self {
            kind: TokenKind::classify(&lexeme),
            lexeme,
        }
    }
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '|' | '&')
}

fn is_quote(c: char) -> bool {
    matches!(c, '"' | '\'' | '`')
}

/// Characters that always start a new lexeme.
fn is_opener(c: char) -> bool {
    matches!(c, '(' | '{' | '[') || is_quote(c)
}

fn closer_of(opener: char) -> char {
    match opener {
        '(' => ')',
        '{' => '}',
        '[' => ']',
        other => other,
    }
}

pub struct Tokenizer<'a> {
    line: &'a str,
    pos: usize,
    stack: Vec<char>,
    finished: bool,
}

impl<'a> Tokenizer<'a> {
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            pos: 0,
            stack: Vec::new(),
            finished: false,
        }
    }

    fn peek(&self) -> Option<char> {
        self.line[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn in_quote(&self) -> bool {
        self.stack.last().copied().is_some_and(is_quote)
    }

    fn close(&mut self, found: char, offset: usize) -> Result<(), LexError> {
        match self.stack.last().copied() {
            None => Err(LexError::UnbalancedBracket { found, offset }),
            Some(top) if closer_of(top) != found => Err(LexError::MismatchedBracket {
                expected: closer_of(top),
                found,
                offset,
            }),
            Some(_) => {
                self.stack.pop();
                Ok(())
            }
        }
    }

    fn lex(&mut self) -> Result<Option<Token>, LexError> {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
        let start = self.pos;
        let Some(first) = self.peek() else {
            return Ok(None);
        };
        if first == '#' {
            self.pos = self.line.len();
            return Ok(Some(Token::new(&self.line[start..])));
        }

        let operator_run = is_operator_char(first);
        while let Some(c) = self.peek() {
            if self.stack.is_empty()
                && self.pos > start
                && (c.is_whitespace() || is_opener(c) || is_operator_char(c) != operator_run)
            {
                break;
            }

            let offset = self.pos;
            self.bump();
            let depth = self.stack.len();
            match c {
                '\\' => {
                    if self.bump().is_none() {
                        return Err(LexError::DanglingEscape);
                    }
                }
                '"' | '\'' | '`' => match self.stack.last().copied() {
                    Some(top) if top == c => {
                        self.stack.pop();
                    }
                    Some(top) if is_quote(top) => {}
                    _ => self.stack.push(c),
                },
                '(' | '{' | '[' if !self.in_quote() => self.stack.push(c),
                ')' | '}' | ']' if !self.in_quote() => self.close(c, offset)?,
                _ => {}
            }

            // a group that just closed is a whole lexeme
            if depth > 0 && self.stack.is_empty() {
                break;
            }
        }

        if let Some(&opener) = self.stack.first() {
            return Err(LexError::UnterminatedGroup { opener });
        }
        Ok(Some(Token::new(&self.line[start..self.pos])))
    }
}

impl Iterator for Tokenizer<'_> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.lex() {
            Ok(Some(token)) => {
                trace!(kind = %token.kind, lexeme = %token.lexeme, "token");
                Some(Ok(token))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// The text of a string literal: outer quotes removed and escapes resolved.
pub fn unquote(lexeme: &str) -> String {
    let inner = lexeme
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(lexeme);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

/// Tokenize a whole line, stopping at the first grammar failure.
pub fn tokenize(line: &str) -> Result<Vec<Token>, LexError> {
    Tokenizer::new(line).collect()
}
