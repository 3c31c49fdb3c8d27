//! Explicit conversions out of a [`Value`].
//!
//! Each conversion widens or parses where that has a meaning and fails with
//! [`Fault::InvalidOperation`] otherwise.

use std::cmp::Ordering;

use super::{ErrorValue, Func, Value};
use crate::error::Fault;
use crate::tuple::Tuple;

/// Longest prefix of `s` that reads as a number: `-?digits`, optionally
/// followed by a fraction and exponent when `real` is set.
fn numeric_prefix(s: &str, real: bool) -> &str {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = usize::from(bytes.first() == Some(&b'-'));
    let int_end = digits_from(end);
    if int_end == end {
        return "";
    }
    end = int_end;

    if real {
        if bytes.get(end) == Some(&b'.') {
            let frac_end = digits_from(end + 1);
            if frac_end > end + 1 {
                end = frac_end;
            }
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            let mut exp = end + 1;
            if matches!(bytes.get(exp), Some(b'+' | b'-')) {
                exp += 1;
            }
            let exp_end = digits_from(exp);
            if exp_end > exp {
                end = exp_end;
            }
        }
    }
    &s[..end]
}

impl Value {
    fn invalid(&self, to: &'static str) -> Fault {
        Fault::InvalidOperation {
            from: self.type_name(),
            to,
        }
    }

    /// Truthiness. Every value has one.
    pub fn truthy(&self) -> bool {
        match self {
            Self::Int(i) => *i != 0,
            Self::Real(r) => *r != 0.0,
            Self::Str(s) => !s.is_empty(),
            Self::List(items) => !items.is_empty(),
            Self::Tuple(t) => !t.is_empty(),
            Self::Func(_) | Self::Error(_) => true,
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn to_int(&self) -> Result<i64, Fault> {
        match self {
            Self::Int(i) => Ok(*i),
            Self::Real(r) => Ok(*r as i64),
            Self::Str(s) => numeric_prefix(s, false)
                .parse()
                .map_err(|_| self.invalid("Int")),
            _ => Err(self.invalid("Int")),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn to_real(&self) -> Result<f64, Fault> {
        match self {
            Self::Int(i) => Ok(*i as f64),
            Self::Real(r) => Ok(*r),
            Self::Str(s) => numeric_prefix(s, true)
                .parse()
                .map_err(|_| self.invalid("Real")),
            _ => Err(self.invalid("Real")),
        }
    }

    /// Text of a scalar. Reals are written with six fractional digits.
    pub fn to_str(&self) -> Result<String, Fault> {
        match self {
            Self::Int(i) => Ok(i.to_string()),
            Self::Real(r) => Ok(format!("{r:.6}")),
            Self::Str(s) => Ok(s.clone()),
            _ => Err(self.invalid("Str")),
        }
    }

    /// Lists are copied, tuples flattened, anything else wrapped as a singleton.
    pub fn to_list(&self) -> Vec<Self> {
        match self {
            Self::List(items) => items.clone(),
            Self::Tuple(t) => t.to_list(),
            other => vec![other.clone()],
        }
    }

    /// Tuples are copied, lists converted in order, anything else wrapped.
    pub fn to_tuple(&self) -> Tuple {
        match self {
            Self::Tuple(t) => t.clone(),
            Self::List(items) => items.iter().cloned().collect(),
            other => {
                let mut t = Tuple::new();
                t.push(other.clone());
                t
            }
        }
    }

    /// Closures are copied; anything else becomes a constant closure.
    pub fn to_func(&self) -> Func {
        match self {
            Self::Func(f) => f.clone(),
            other => {
                let constant = other.clone();
                Func::new(move |_| constant.clone())
            }
        }
    }

    pub fn to_error(&self) -> Result<ErrorValue, Fault> {
        match self {
            Self::Error(e) => Ok(e.clone()),
            _ => Err(self.invalid("Error")),
        }
    }

    /// The sign of an `Int` as an ordering.
    pub fn to_ordering(&self) -> Result<Ordering, Fault> {
        match self {
            Self::Int(i) => Ok(i.cmp(&0)),
            _ => Err(self.invalid("Ordering")),
        }
    }
}

impl TryFrom<&Value> for i64 {
    type Error = Fault;

    fn try_from(value: &Value) -> Result<Self, Fault> {
        value.to_int()
    }
}

impl TryFrom<&Value> for f64 {
    type Error = Fault;

    fn try_from(value: &Value) -> Result<Self, Fault> {
        value.to_real()
    }
}

impl TryFrom<&Value> for String {
    type Error = Fault;

    fn try_from(value: &Value) -> Result<Self, Fault> {
        value.to_str()
    }
}
