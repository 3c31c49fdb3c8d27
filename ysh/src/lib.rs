//! ysh - A small shell with a broadcasting expression language
//!
//! This crate provides:
//! - A seven-variant value algebra where lists broadcast element-wise
//! - A line tokenizer that splits commands into typed tokens
//! - A shunting-yard evaluator for parenthesised expressions
//! - A line-oriented shell with a handful of built-in commands

mod builtins;
pub mod error;
pub mod eval;
pub mod help;
pub mod lexer;
pub mod options;
pub mod shell;
pub mod streams;
pub mod tuple;
pub mod value;

pub use error::{Fault, YshError, YshResult};
pub use eval::{evaluate, shunting_yard, Env, Evaluator};
pub use lexer::{tokenize, Token, TokenKind};
pub use shell::Shell;
pub use tuple::Tuple;
pub use value::Value;
