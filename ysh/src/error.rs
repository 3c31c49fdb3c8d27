//! Error types for ysh
//!
//! Two tiers exist. Recoverable problems travel in-band as `Value::Error`
//! (see [`crate::value`]); the types here are the fatal ones that abort the
//! current expression or line.

use thiserror::Error;

use crate::lexer::LexError;

/// Result type alias for shell-level operations
pub type YshResult<T> = Result<T, YshError>;

/// Fatal faults raised by the value algebra.
///
/// A fault terminates evaluation of the current expression. It is never
/// turned into a value by the evaluator; the caller decides how far it unwinds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    /// Equality or ordering between incompatible variant kinds
    #[error("Type mismatch: cannot compare {lhs} with {rhs}")]
    TypeMismatch { lhs: &'static str, rhs: &'static str },

    /// A coercion with no defined meaning
    #[error("Invalid operation: cannot convert {from} to {to}")]
    InvalidOperation { from: &'static str, to: &'static str },
}

/// Error types for ysh shell operations
#[derive(Error, Debug)]
pub enum YshError {
    /// The line could not be tokenized
    #[error("Grammar error: {0}")]
    Lex(#[from] LexError),

    /// A fatal fault escaped expression evaluation
    #[error("{0}")]
    Fault(#[from] Fault),

    /// IO error (streams, history, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Command not found
    #[error("Command not found: {0}")]
    CommandNotFound(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Option not known to the command
    #[error("Unknown option: {0}")]
    UnknownOption(String),

    /// Exit requested (not really an error)
    #[error("Exit with code {0}")]
    Exit(i32),
}
