//! The ysh value algebra
//!
//! Every runtime datum is a [`Value`] with exactly one of seven variants.
//! Operators never panic on bad operands: unsupported combinations come back
//! as in-band `Value::Error`s. Only equality, ordering and coercions can raise
//! a fatal [`Fault`](crate::error::Fault).

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use crate::tuple::Tuple;

mod coerce;
mod compare;
mod ops;

pub use ops::BinaryOp;

/// The variant tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Real,
    Str,
    List,
    Tuple,
    Func,
    Error,
}

impl Kind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int => "Int",
            Self::Real => "Real",
            Self::Str => "Str",
            Self::List => "List",
            Self::Tuple => "Tuple",
            Self::Func => "Func",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug)]
pub enum Value {
    Int(i64),
    Real(f64),
    Str(String),
    List(Vec<Value>),
    Tuple(Tuple),
    Func(Func),
    Error(ErrorValue),
}

/// An opaque closure from value to value. Comparable by identity only.
#[derive(Clone)]
pub struct Func(Rc<dyn Fn(Value) -> Value>);

impl Func {
    pub fn new(f: impl Fn(Value) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, arg: Value) -> Value {
        (self.0)(arg)
    }
}

impl fmt::Debug for Func {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Func(<closure>)")
    }
}

/// The payload of an in-band error: a diagnostic message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ErrorValue(String);

impl ErrorValue {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Value {
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Int(_) => Kind::Int,
            Self::Real(_) => Kind::Real,
            Self::Str(_) => Kind::Str,
            Self::List(_) => Kind::List,
            Self::Tuple(_) => Kind::Tuple,
            Self::Func(_) => Kind::Func,
            Self::Error(_) => Kind::Error,
        }
    }

    pub const fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    /// `Int` or `Real`.
    pub const fn is_arithmetic(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Real(_))
    }

    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The message of an `Error` value.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Error(e) => Some(e.message()),
            _ => None,
        }
    }

    /// A plain diagnostic.
    pub fn standard_error(msg: impl Into<String>) -> Self {
        Self::Error(ErrorValue::new(msg))
    }

    /// A diagnostic about malformed expression text.
    pub fn grammar_error(msg: impl fmt::Display) -> Self {
        Self::standard_error(format!("Grammar Error: {msg}"))
    }

    /// An operator or function was applied to operand types it does not support.
    ///
    /// `type_name` is the primary operand's type (or the function's), `arg_types`
    /// the remaining operand types and `op` the operator name, e.g. `(+)`.
    pub fn operation_error(type_name: &str, arg_types: &[&str], op: &str, msg: &str) -> Self {
        let mut text = format!(
            "Operation Error: {msg}\n\twith primary object's type: {type_name}\n\tOperator: {op}"
        );
        if !arg_types.is_empty() {
            text.push_str("\n\tArguments: ");
            text.push_str(&arg_types.join(", "));
        }
        Self::standard_error(text)
    }

    /// Build a value from an arbitrary native value.
    ///
    /// The variant is chosen by a fixed priority: integral, floating point,
    /// string, list, tuple, closure, error; anything else becomes
    /// `Error("Unsupported type")`.
    #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
    pub fn from_any(value: &dyn Any) -> Self {
        macro_rules! try_int {
            ($($t:ty),*) => {
                $(
                    if let Some(v) = value.downcast_ref::<$t>() {
                        return Self::Int(*v as i64);
                    }
                )*
            };
        }
        try_int!(i64, i32, i16, i8, isize, u64, u32, u16, u8, usize);
        if let Some(v) = value.downcast_ref::<bool>() {
            return Self::Int(i64::from(*v));
        }
        if let Some(v) = value.downcast_ref::<char>() {
            return Self::Int(i64::from(u32::from(*v)));
        }
        if let Some(v) = value.downcast_ref::<f64>() {
            return Self::Real(*v);
        }
        if let Some(v) = value.downcast_ref::<f32>() {
            return Self::Real(f64::from(*v));
        }
        if let Some(v) = value.downcast_ref::<String>() {
            return Self::Str(v.clone());
        }
        if let Some(v) = value.downcast_ref::<&str>() {
            return Self::Str((*v).to_string());
        }
        if let Some(v) = value.downcast_ref::<Vec<Self>>() {
            return Self::List(v.clone());
        }
        if let Some(v) = value.downcast_ref::<Tuple>() {
            return Self::Tuple(v.clone());
        }
        if let Some(v) = value.downcast_ref::<Func>() {
            return Self::Func(v.clone());
        }
        if let Some(v) = value.downcast_ref::<ErrorValue>() {
            return Self::Error(v.clone());
        }
        Self::standard_error("Unsupported type")
    }

    /// JSON rendering used by `vars -j`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::{json, Value as Json};
        match self {
            Self::Int(i) => json!(i),
            Self::Real(r) => serde_json::Number::from_f64(*r).map_or(Json::Null, Json::Number),
            Self::Str(s) => json!(s),
            Self::List(items) => Json::Array(items.iter().map(Self::to_json).collect()),
            Self::Tuple(t) => json!({ "tuple": t.iter().map(Self::to_json).collect::<Vec<_>>() }),
            Self::Func(_) => json!("<func>"),
            Self::Error(e) => json!({ "error": e.message() }),
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s:?}"),
            other => write!(f, "{other}"),
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::Int(0)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r:.6}"),
            Self::Str(s) => f.write_str(s),
            Self::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str("]")
            }
            Self::Tuple(tuple) => {
                f.write_str("(")?;
                for (i, item) in tuple.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    item.fmt_nested(f)?;
                }
                f.write_str(")")
            }
            Self::Func(_) => f.write_str("<func>"),
            Self::Error(e) => write!(f, "{e}"),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i64, i32, i16, i8, u32, u16, u8, bool);

impl From<char> for Value {
    fn from(v: char) -> Self {
        Self::Int(i64::from(u32::from(v)))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Real(f64::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl From<Tuple> for Value {
    fn from(v: Tuple) -> Self {
        Self::Tuple(v)
    }
}

impl From<Func> for Value {
    fn from(v: Func) -> Self {
        Self::Func(v)
    }
}

impl From<ErrorValue> for Value {
    fn from(v: ErrorValue) -> Self {
        Self::Error(v)
    }
}
