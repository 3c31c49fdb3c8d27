//! Arithmetic, bitwise, logical and named operators.
//!
//! All binary operators share one dispatch shape: list/list pairs element-wise
//! (lengths must agree), scalar/list broadcasts, and scalar/scalar falls
//! through to the per-operator table. Anything unsupported is an in-band
//! operation error.

use std::ops;

use tracing::trace;

use super::{Func, Value};
use crate::tuple::Tuple;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    BitAnd,
    BitOr,
    Shl,
    Shr,
    And,
    Or,
}

impl BinaryOp {
    /// Operator name as it appears in operation errors.
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "(+)",
            Self::Sub => "(-)",
            Self::Mul => "(*)",
            Self::Div => "(/)",
            Self::Mod => "(%)",
            Self::Pow => "(^)",
            Self::BitAnd => "(&)",
            Self::BitOr => "(|)",
            Self::Shl => "(<<)",
            Self::Shr => "(>>)",
            Self::And => "(&&)",
            Self::Or => "(||)",
        }
    }

    /// Whether `scalar` is broadcast across a list operand.
    fn broadcasts(self, scalar: &Value) -> bool {
        match self {
            Self::Mod | Self::BitAnd | Self::BitOr | Self::Shl | Self::Shr => {
                matches!(scalar, Value::Int(_))
            }
            _ => scalar.is_arithmetic(),
        }
    }
}

enum Numeric {
    Ints(i64, i64),
    Reals(f64, f64),
}

#[allow(clippy::cast_precision_loss)]
fn numeric(lhs: &Value, rhs: &Value) -> Option<Numeric> {
    match (lhs, rhs) {
        (Value::Int(a), Value::Int(b)) => Some(Numeric::Ints(*a, *b)),
        (Value::Int(a), Value::Real(b)) => Some(Numeric::Reals(*a as f64, *b)),
        (Value::Real(a), Value::Int(b)) => Some(Numeric::Reals(*a, *b as f64)),
        (Value::Real(a), Value::Real(b)) => Some(Numeric::Reals(*a, *b)),
        _ => None,
    }
}

fn unsupported(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    Value::operation_error(lhs.type_name(), &[rhs.type_name()], op.symbol(), "")
}

/// Largest string `*` will build, in bytes.
const MAX_REPEAT_LEN: usize = 1 << 30;

fn repeat(s: &str, n: i64) -> Value {
    let Ok(n) = usize::try_from(n) else {
        return Value::Str(String::new());
    };
    match s.len().checked_mul(n) {
        Some(len) if len <= MAX_REPEAT_LEN => Value::Str(s.repeat(n)),
        _ => Value::standard_error("String repetition too large."),
    }
}

fn scalar(op: BinaryOp, lhs: &Value, rhs: &Value) -> Value {
    use Value::{Int, Real, Str};

    match (op, lhs, rhs) {
        (BinaryOp::Add, Str(a), Str(b)) => return Str(format!("{a}{b}")),
        (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => return Value::Tuple(a.concat(b)),
        (BinaryOp::Mul, Int(n), Str(s)) | (BinaryOp::Mul, Str(s), Int(n)) => return repeat(s, *n),
        (BinaryOp::Mod | BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::Shl | BinaryOp::Shr, Int(a), Int(b)) => {
            return integral(op, *a, *b);
        }
        _ => {}
    }

    let Some(pair) = numeric(lhs, rhs) else {
        return unsupported(op, lhs, rhs);
    };

    match (op, pair) {
        (BinaryOp::Add, Numeric::Ints(a, b)) => Int(a.wrapping_add(b)),
        (BinaryOp::Add, Numeric::Reals(a, b)) => Real(a + b),
        (BinaryOp::Sub, Numeric::Ints(a, b)) => Int(a.wrapping_sub(b)),
        (BinaryOp::Sub, Numeric::Reals(a, b)) => Real(a - b),
        (BinaryOp::Mul, Numeric::Ints(a, b)) => Int(a.wrapping_mul(b)),
        (BinaryOp::Mul, Numeric::Reals(a, b)) => Real(a * b),
        (BinaryOp::Div, Numeric::Ints(_, 0)) => Value::standard_error("Division by zero."),
        (BinaryOp::Div, Numeric::Ints(a, b)) => Int(a.wrapping_div(b)),
        (BinaryOp::Div, Numeric::Reals(_, b)) if b == 0.0 => {
            Value::standard_error("Division by zero.")
        }
        (BinaryOp::Div, Numeric::Reals(a, b)) => Real(a / b),
        #[allow(clippy::cast_precision_loss)]
        (BinaryOp::Pow, Numeric::Ints(a, b)) => Real((a as f64).powf(b as f64)),
        (BinaryOp::Pow, Numeric::Reals(a, b)) => Real(a.powf(b)),
        (BinaryOp::And, Numeric::Ints(a, b)) => Int(i64::from(a != 0 && b != 0)),
        (BinaryOp::And, Numeric::Reals(a, b)) => Int(i64::from(a != 0.0 && b != 0.0)),
        (BinaryOp::Or, Numeric::Ints(a, b)) => Int(i64::from(a != 0 || b != 0)),
        (BinaryOp::Or, Numeric::Reals(a, b)) => Int(i64::from(a != 0.0 || b != 0.0)),
        _ => unsupported(op, lhs, rhs),
    }
}

fn integral(op: BinaryOp, a: i64, b: i64) -> Value {
    let shift = || u32::try_from(b).ok();
    match op {
        BinaryOp::Mod if b == 0 => Value::standard_error("Division by zero."),
        BinaryOp::Mod => Value::Int(a.wrapping_rem(b)),
        BinaryOp::BitAnd => Value::Int(a & b),
        BinaryOp::BitOr => Value::Int(a | b),
        BinaryOp::Shl => shift()
            .and_then(|s| a.checked_shl(s))
            .map_or_else(|| Value::standard_error("Shift amount out of range."), Value::Int),
        BinaryOp::Shr => shift()
            .and_then(|s| a.checked_shr(s))
            .map_or_else(|| Value::standard_error("Shift amount out of range."), Value::Int),
        _ => unsupported(op, &Value::Int(a), &Value::Int(b)),
    }
}

impl Value {
    /// Apply a binary operator with list pairing and scalar broadcast.
    pub fn binary(&self, op: BinaryOp, rhs: &Self) -> Self {
        match (self, rhs) {
            (Self::List(l), Self::List(r)) => {
                if l.len() != r.len() {
                    return Self::standard_error("List size mismatch.");
                }
                Self::List(l.iter().zip(r).map(|(a, b)| a.binary(op, b)).collect())
            }
            (Self::List(l), r) if op.broadcasts(r) => {
                Self::List(l.iter().map(|a| a.binary(op, r)).collect())
            }
            (l, Self::List(r)) if op.broadcasts(l) => {
                Self::List(r.iter().map(|b| l.binary(op, b)).collect())
            }
            _ => scalar(op, self, rhs),
        }
    }

    pub fn pow(&self, rhs: &Self) -> Self {
        self.binary(BinaryOp::Pow, rhs)
    }

    pub fn and(&self, rhs: &Self) -> Self {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(&self, rhs: &Self) -> Self {
        self.binary(BinaryOp::Or, rhs)
    }

    /// Logical negation: `Int` maps nonzero to 0 and zero to 1; lists map
    /// element-wise.
    pub fn not(&self) -> Self {
        match self {
            Self::Int(i) => Self::Int(i64::from(*i == 0)),
            Self::List(items) => Self::List(items.iter().map(Self::not).collect()),
            other => Self::operation_error(other.type_name(), &["empty"], "(!)", ""),
        }
    }

    /// `param -> body`: build a closure from a parameter name and body text.
    pub fn abstraction(&self, body: &Self) -> Self {
        match (self, body) {
            (Self::Str(param), Self::Str(body)) => {
                let abstraction = Abstraction {
                    param: param.clone(),
                    body: body.clone(),
                };
                Self::Func(Func::new(move |arg| abstraction.apply(arg)))
            }
            _ => Self::operation_error(self.type_name(), &[body.type_name()], "(->)", ""),
        }
    }

    /// `f $ x`: call a closure.
    pub fn apply(&self, arg: &Self) -> Self {
        match self {
            Self::Func(f) => f.call(arg.clone()),
            _ => Self::operation_error(self.type_name(), &[arg.type_name()], "($)", ""),
        }
    }

    /// `a ++ b`. Lists come out as `rhs` followed by `self`.
    pub fn concat(&self, rhs: &Self) -> Self {
        match (self, rhs) {
            (Self::Str(a), Self::Str(b)) => Self::Str(format!("{a}{b}")),
            (Self::List(a), Self::List(b)) => {
                let mut result = b.clone();
                result.extend(a.iter().cloned());
                Self::List(result)
            }
            (Self::Tuple(a), Self::Tuple(b)) => Self::Tuple(a.concat(b)),
            _ => Self::operation_error(self.type_name(), &[rhs.type_name()], "(++)", ""),
        }
    }

    /// `x : xs`: appends `self` to the end of the list `xs`.
    pub fn cons(&self, rhs: &Self) -> Self {
        match rhs {
            Self::List(items) => {
                let mut result = items.clone();
                result.push(self.clone());
                Self::List(result)
            }
            _ => Self::operation_error(self.type_name(), &[rhs.type_name()], "(:)", ""),
        }
    }

    /// `a , b`: a tuple headed by `self`, followed by `rhs` (flattened when it
    /// is already a tuple).
    pub fn zip(&self, rhs: &Self) -> Self {
        let mut result = match rhs {
            Self::Tuple(t) => t.clone(),
            other => {
                let mut t = Tuple::new();
                t.push(other.clone());
                t
            }
        };
        result.push(self.clone());
        Self::Tuple(result)
    }
}

struct Abstraction {
    param: String,
    body: String,
}

impl Abstraction {
    // TODO: bind `param` to the argument and evaluate `body`; the closure has
    // no environment handle to evaluate in yet, so it answers 0.
    fn apply(&self, _arg: Value) -> Value {
        trace!(param = %self.param, body = %self.body, "abstraction applied");
        Value::Int(0)
    }
}

macro_rules! impl_binary_ops {
    ($($trait:ident :: $method:ident => $op:ident),* $(,)?) => {
        $(
            impl ops::$trait for &Value {
                type Output = Value;

                fn $method(self, rhs: &Value) -> Value {
                    self.binary(BinaryOp::$op, rhs)
                }
            }
        )*
    };
}

impl_binary_ops! {
    Add::add => Add,
    Sub::sub => Sub,
    Mul::mul => Mul,
    Div::div => Div,
    Rem::rem => Mod,
    BitXor::bitxor => Pow,
    BitAnd::bitand => BitAnd,
    BitOr::bitor => BitOr,
    Shl::shl => Shl,
    Shr::shr => Shr,
}

impl ops::Not for &Value {
    type Output = Value;

    fn not(self) -> Value {
        Value::not(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(values: &[i64]) -> Value {
        Value::List(values.iter().copied().map(Value::Int).collect())
    }

    #[test]
    fn test_scalar_broadcast_over_list() {
        assert_eq!(&Value::Int(2) + &list(&[1, 2, 3]), list(&[3, 4, 5]));
        assert_eq!(&list(&[10, 20]) - &Value::Int(1), list(&[9, 19]));
    }

    #[test]
    fn test_list_pairing() {
        assert_eq!(&list(&[1, 2]) * &list(&[3, 4]), list(&[3, 8]));
    }

    #[test]
    fn test_list_size_mismatch() {
        let result = &list(&[1, 2]) + &list(&[1, 2, 3]);
        assert!(result.error_message().unwrap().contains("size mismatch"));
    }

    #[test]
    fn test_division_by_zero() {
        let result = &Value::Int(5) / &Value::Int(0);
        assert_eq!(result.error_message(), Some("Division by zero."));
        let result = &Value::Real(5.0) / &Value::Real(0.0);
        assert_eq!(result.error_message(), Some("Division by zero."));
        let result = &Value::Int(5) % &Value::Int(0);
        assert_eq!(result.error_message(), Some("Division by zero."));
    }

    #[test]
    fn test_broadcast_errors_stay_per_element() {
        let Value::List(items) = &list(&[1, 0, 2]).binary(BinaryOp::Div, &Value::Int(0)) else {
            panic!("expected list");
        };
        assert!(items.iter().all(Value::is_error));

        let Value::List(items) = &Value::Int(6) / &list(&[2, 0, 3]) else {
            panic!("expected list");
        };
        assert_eq!(items[0], Value::Int(3));
        assert!(items[1].is_error());
        assert_eq!(items[2], Value::Int(2));
    }

    #[test]
    fn test_mixed_numeric() {
        assert!(matches!(&Value::Int(1) + &Value::Real(0.5), Value::Real(r) if (r - 1.5).abs() < 1e-12));
        assert_eq!(&Value::Int(7) / &Value::Int(2), Value::Int(3));
    }

    #[test]
    fn test_pow_is_real() {
        assert!(matches!(&Value::Int(2) ^ &Value::Int(10), Value::Real(r) if (r - 1024.0).abs() < 1e-9));
    }

    #[test]
    fn test_string_ops() {
        assert_eq!(&Value::from("ab") + &Value::from("cd"), Value::from("abcd"));
        assert_eq!(&Value::Int(3) * &Value::from("ab"), Value::from("ababab"));
        assert_eq!(&Value::from("ab") * &Value::Int(2), Value::from("abab"));
        assert_eq!(&Value::from("ab") * &Value::Int(-1), Value::from(""));
    }

    #[test]
    fn test_huge_repeat_is_in_band() {
        let result = &Value::Int(i64::MAX) * &Value::from("ab");
        assert_eq!(result.error_message(), Some("String repetition too large."));
        let result = &Value::from("x") * &Value::Int(1 << 40);
        assert!(result.is_error());
        assert_eq!(&Value::from("") * &Value::Int(i64::MAX), Value::from(""));
    }

    #[test]
    fn test_unsupported_is_operation_error() {
        let result = &Value::from("a") - &Value::Int(1);
        let msg = result.error_message().unwrap();
        assert!(msg.starts_with("Operation Error"));
        assert!(msg.contains("Str"));
        assert!(msg.contains("(-)"));
        assert!(msg.contains("Int"));
        assert!((&Value::Real(1.0) % &Value::Int(1)).is_error());
    }

    #[test]
    fn test_bitwise_and_shifts() {
        assert_eq!(&Value::Int(6) & &Value::Int(3), Value::Int(2));
        assert_eq!(&Value::Int(6) | &Value::Int(3), Value::Int(7));
        assert_eq!(&Value::Int(1) << &Value::Int(4), Value::Int(16));
        assert_eq!(&Value::Int(16) >> &Value::Int(2), Value::Int(4));
        assert!((&Value::Int(1) << &Value::Int(99)).is_error());
    }

    #[test]
    fn test_logical() {
        assert_eq!(Value::Int(2).and(&Value::Real(0.0)), Value::Int(0));
        assert_eq!(Value::Int(0).or(&Value::Int(3)), Value::Int(1));
        assert_eq!(!&Value::Int(0), Value::Int(1));
        assert_eq!(!&list(&[0, 5]), list(&[1, 0]));
        assert!((!&Value::Real(1.0)).is_error());
    }

    #[test]
    fn test_tuple_add_concatenates() {
        let a = Value::Int(1).zip(&Value::Int(2));
        let b = Value::Int(3).zip(&Value::Int(4));
        let Value::Tuple(t) = &a + &b else {
            panic!("expected tuple");
        };
        assert_eq!(t.to_list(), vec![Value::Int(1), Value::Int(2), Value::Int(3), Value::Int(4)]);
    }

    #[test]
    fn test_apply() {
        let double = Value::Func(Func::new(|v| &v * &Value::Int(2)));
        assert_eq!(double.apply(&Value::Int(21)), Value::Int(42));
        assert!(Value::Int(1).apply(&Value::Int(2)).is_error());
    }

    #[test]
    fn test_abstraction_answers_zero() {
        let f = Value::from("x").abstraction(&Value::from("x + 1"));
        assert!(matches!(f, Value::Func(_)));
        assert_eq!(f.apply(&Value::Int(41)), Value::Int(0));
        assert!(Value::Int(1).abstraction(&Value::from("x")).is_error());
    }

    #[test]
    fn test_concat_puts_rhs_first_for_lists() {
        assert_eq!(list(&[1, 2]).concat(&list(&[3, 4])), list(&[3, 4, 1, 2]));
        assert_eq!(Value::from("a").concat(&Value::from("b")), Value::from("ab"));
        assert!(Value::Int(1).concat(&Value::Int(2)).is_error());
    }

    #[test]
    fn test_cons_appends() {
        assert_eq!(Value::Int(9).cons(&list(&[1, 2])), list(&[1, 2, 9]));
        assert!(Value::Int(9).cons(&Value::Int(1)).is_error());
    }

    #[test]
    fn test_zip() {
        let Value::Tuple(t) = Value::Int(1).zip(&Value::Int(2)) else {
            panic!("expected tuple");
        };
        assert_eq!(t.to_list(), vec![Value::Int(1), Value::Int(2)]);

        let Value::Tuple(t) = Value::Int(0).zip(&Value::Tuple(t)) else {
            panic!("expected tuple");
        };
        assert_eq!(t.to_list(), vec![Value::Int(0), Value::Int(1), Value::Int(2)]);
    }
}
