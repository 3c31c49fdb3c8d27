//! Equality and ordering.
//!
//! Both raise [`Fault::TypeMismatch`] for operands of unrelated kinds. `Func`
//! and `Error` values are never equal to anything, and order only against
//! themselves.

use std::cmp::Ordering;
use std::ptr;

use super::Value;
use crate::error::Fault;

#[allow(clippy::cast_precision_loss)]
fn as_real(value: &Value) -> Option<f64> {
    match value {
        Value::Int(i) => Some(*i as f64),
        Value::Real(r) => Some(*r),
        _ => None,
    }
}

fn mismatch(lhs: &Value, rhs: &Value) -> Fault {
    Fault::TypeMismatch {
        lhs: lhs.type_name(),
        rhs: rhs.type_name(),
    }
}

/// Element-wise, then shorter-first.
fn cmp_lists(lhs: &[Value], rhs: &[Value]) -> Result<Option<Ordering>, Fault> {
    for (l, r) in lhs.iter().zip(rhs) {
        match l.try_partial_cmp(r)? {
            Some(Ordering::Equal) => {}
            other => return Ok(other),
        }
    }
    Ok(Some(lhs.len().cmp(&rhs.len())))
}

impl Value {
    pub fn try_eq(&self, other: &Self) -> Result<bool, Fault> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Ok(a == b),
            (Self::Str(a), Self::Str(b)) => Ok(a == b),
            (Self::List(a), Self::List(b)) => {
                if a.len() != b.len() {
                    return Ok(false);
                }
                for (l, r) in a.iter().zip(b) {
                    if !l.try_eq(r)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            (Self::Tuple(a), Self::Tuple(b)) => a.try_eq(b),
            (Self::Func(_), Self::Func(_)) | (Self::Error(_), Self::Error(_)) => Ok(false),
            _ => match (as_real(self), as_real(other)) {
                #[allow(clippy::float_cmp)]
                (Some(a), Some(b)) => Ok(a == b),
                _ => Err(mismatch(self, other)),
            },
        }
    }

    /// `<=>`. `Ok(None)` means the operands are unordered.
    pub fn try_partial_cmp(&self, other: &Self) -> Result<Option<Ordering>, Fault> {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Ok(Some(a.cmp(b))),
            (Self::Str(a), Self::Str(b)) => Ok(Some(a.cmp(b))),
            (Self::List(a), Self::List(b)) => cmp_lists(a, b),
            (Self::Tuple(a), Self::Tuple(b)) => a.try_partial_cmp(b),
            (Self::Func(_), Self::Func(_)) | (Self::Error(_), Self::Error(_)) => {
                Ok(ptr::eq(self, other).then_some(Ordering::Equal))
            }
            _ => match (as_real(self), as_real(other)) {
                (Some(a), Some(b)) => Ok(a.partial_cmp(&b)),
                _ => Err(mismatch(self, other)),
            },
        }
    }

    /// The three-way compare operator: `Int(-1)`, `Int(0)` or `Int(1)`.
    ///
    /// Unlike `<=>` it refuses closures and errors with an operation error, and
    /// operands of different kinds (`Int` and `Real` included) are an
    /// operation error rather than a fault.
    /// A fault can still come from comparing mismatched list elements.
    pub fn compare(&self, other: &Self) -> Result<Self, Fault> {
        let comparable = match (self, other) {
            (Self::Func(_) | Self::Error(_), _) | (_, Self::Func(_) | Self::Error(_)) => false,
            _ => self.kind() == other.kind(),
        };
        if !comparable {
            return Ok(Self::operation_error(
                self.type_name(),
                &[other.type_name()],
                "(<=>)",
                "",
            ));
        }
        Ok(match self.try_partial_cmp(other)? {
            Some(ordering) => Self::Int(ordering as i64),
            None => Self::standard_error("Unordered comparison."),
        })
    }
}

/// Structural equality as a plain `bool`; a type mismatch compares unequal.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.try_eq(other).unwrap_or(false)
    }
}
