//! Expression evaluator for ysh
//!
//! Expression text goes through three stages: [`fragments`] splits it,
//! [`shunting_yard`] reorders the fragments into postfix order, and the
//! evaluator runs the postfix sequence on an operand stack against the
//! caller's environment.
//!
//! Malformed expressions come back as in-band `Grammar Error` values. Only
//! [`Fault`]s escape as `Err`.

use std::cmp::Ordering;
use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;
use ysh_config::{EvalConfig, UnboundNames};

use crate::error::Fault;
use crate::lexer::unquote;
use crate::value::Value;

mod fragment;
mod postfix;

pub use fragment::fragments;
pub use postfix::{is_postfix_symbol, operator, shunting_yard, Assoc, OpInfo};

/// Variable bindings visible to an expression.
pub type Env = HashMap<String, Value>;

/// Reasons an expression is malformed. Rendered in-band as a grammar error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("{0}")]
    Fragment(String),

    #[error("unbalanced parentheses")]
    UnbalancedParen,

    #[error("missing operand for '{0}'")]
    MissingOperand(String),

    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    #[error("invalid literal '{0}'")]
    InvalidLiteral(String),

    #[error("cannot assign to {0}")]
    NotAssignable(&'static str),

    #[error("empty expression")]
    Empty,

    #[error("{0} operands left without an operator")]
    Leftover(usize),
}

/// Why evaluation stopped early.
enum Halt {
    Grammar(GrammarError),
    Fault(Fault),
}

impl From<GrammarError> for Halt {
    fn from(e: GrammarError) -> Self {
        Self::Grammar(e)
    }
}

impl From<Fault> for Halt {
    fn from(e: Fault) -> Self {
        Self::Fault(e)
    }
}

/// An operand stack entry. Remembers the variable it was read from so that
/// `<-` can assign through it.
struct Slot {
    value: Value,
    name: Option<String>,
}

impl Slot {
    const fn value(value: Value) -> Self {
        Self { value, name: None }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator {
    unbound: UnboundNames,
}

impl Evaluator {
    pub const fn new(unbound: UnboundNames) -> Self {
        Self { unbound }
    }

    pub fn from_config(config: &EvalConfig) -> Self {
        Self::new(config.unbound_names)
    }

    /// Evaluate `expr` against `env`.
    ///
    /// Grammar problems yield `Ok` with an error value; a fault from the value
    /// algebra aborts and is returned as `Err`.
    pub fn evaluate(&self, expr: &str, env: &mut Env) -> Result<Value, Fault> {
        match self.run(expr, env) {
            Ok(value) => Ok(value),
            Err(Halt::Grammar(e)) => {
                debug!(expr, error = %e, "grammar error");
                Ok(Value::grammar_error(e))
            }
            Err(Halt::Fault(fault)) => {
                debug!(expr, %fault, "evaluation aborted");
                Err(fault)
            }
        }
    }

    fn run(&self, expr: &str, env: &mut Env) -> Result<Value, Halt> {
        let fragments = fragments(expr)?;
        let postfix = shunting_yard(&fragments)?;

        let mut stack: Vec<Slot> = Vec::new();
        for token in postfix {
            let slot = if operator(&token).is_some() {
                let rhs = pop(&mut stack, &token)?;
                let lhs = pop(&mut stack, &token)?;
                Slot::value(binary(&token, lhs, rhs, env)?)
            } else if token == "!" {
                Slot::value(pop(&mut stack, &token)?.value.not())
            } else if is_postfix_symbol(&token) {
                return Err(GrammarError::UnknownOperator(token).into());
            } else if token.starts_with('"') {
                Slot::value(Value::Str(unquote(&token)))
            } else if token.starts_with(|c: char| c.is_ascii_digit()) {
                Slot::value(literal(&token)?)
            } else if is_identifier(&token) {
                self.lookup(token, env)
            } else {
                return Err(GrammarError::InvalidLiteral(token).into());
            };
            stack.push(slot);
        }

        let result = stack.pop().ok_or(GrammarError::Empty)?;
        if !stack.is_empty() {
            return Err(GrammarError::Leftover(stack.len() + 1).into());
        }
        Ok(result.value)
    }

    fn lookup(&self, name: String, env: &mut Env) -> Slot {
        let value = match self.unbound {
            UnboundNames::BindZero => env.entry(name.clone()).or_default().clone(),
            UnboundNames::Error => env
                .get(&name)
                .cloned()
                .unwrap_or_else(|| Value::standard_error(format!("Unbound variable: {name}"))),
        };
        Slot {
            value,
            name: Some(name),
        }
    }
}

/// Evaluate with the default settings: unbound names bind to `Int(0)`.
pub fn evaluate(expr: &str, env: &mut Env) -> Result<Value, Fault> {
    Evaluator::default().evaluate(expr, env)
}

/// `[A-Za-z_][A-Za-z0-9_]*`
pub fn is_identifier(token: &str) -> bool {
    let mut chars = token.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn pop(stack: &mut Vec<Slot>, op: &str) -> Result<Slot, GrammarError> {
    stack
        .pop()
        .ok_or_else(|| GrammarError::MissingOperand(op.to_string()))
}

fn literal(token: &str) -> Result<Value, GrammarError> {
    let parsed = if token.contains('.') {
        token.parse().ok().map(Value::Real)
    } else {
        token.parse().ok().map(Value::Int)
    };
    parsed.ok_or_else(|| GrammarError::InvalidLiteral(token.to_string()))
}

fn ordered(lhs: &Value, rhs: &Value, test: fn(Ordering) -> bool) -> Result<Value, Fault> {
    Ok(Value::from(lhs.try_partial_cmp(rhs)?.is_some_and(test)))
}

fn binary(symbol: &str, lhs: Slot, rhs: Slot, env: &mut Env) -> Result<Value, Halt> {
    let (l, r) = (&lhs.value, &rhs.value);
    let value = match symbol {
        "<-" => {
            let Some(name) = lhs.name else {
                return Err(GrammarError::NotAssignable(l.type_name()).into());
            };
            debug!(%name, value = %rhs.value, "assign");
            env.insert(name, rhs.value.clone());
            rhs.value
        }
        ";" => rhs.value,
        "$" => l.apply(r),
        ":" => l.cons(r),
        "^" => l.pow(r),
        "*" => l * r,
        "/" => l / r,
        "%" => l % r,
        "+" => l + r,
        "-" => l - r,
        "++" => l.concat(r),
        "=" => Value::from(l.try_eq(r)?),
        "!=" => Value::from(!l.try_eq(r)?),
        "<" => ordered(l, r, Ordering::is_lt)?,
        ">" => ordered(l, r, Ordering::is_gt)?,
        "<=" => ordered(l, r, Ordering::is_le)?,
        ">=" => ordered(l, r, Ordering::is_ge)?,
        "<=>" => l.compare(r)?,
        "&" => l & r,
        "|" => l | r,
        "<<" => l << r,
        ">>" => l >> r,
        "," => l.zip(r),
        "->" => {
            let param = lhs.name.map_or_else(|| l.clone(), Value::Str);
            param.abstraction(r)
        }
        other => return Err(GrammarError::UnknownOperator(other.to_string()).into()),
    };
    Ok(value)
}
