//! Output contract: the function must return a finite real, an integer or
//! a complex number.

mod error;

#[cfg(test)]
mod result_test;

pub use error::ResultError;

use core::fmt;

use num_bigint::BigInt;
use num_complex::Complex64;

use crate::values::{Value, format_complex, format_float};

/// A validated function result.
#[derive(Debug, Clone, PartialEq)]
pub enum NumericResult {
    Int(BigInt),
    Bool(bool),
    Float(f64),
    Complex(Complex64),
}

impl fmt::Display for NumericResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumericResult::Int(n) => write!(f, "{}", n),
            NumericResult::Bool(true) => write!(f, "True"),
            NumericResult::Bool(false) => write!(f, "False"),
            NumericResult::Float(x) => write!(f, "{}", format_float(*x)),
            NumericResult::Complex(c) => write!(f, "{}", format_complex(*c)),
        }
    }
}

/// Check the value a function returned.
///
/// Only real values are constrained to be finite; a complex result with an
/// infinite part is accepted as is.
pub fn validate(value: Value<'_>) -> Result<NumericResult, ResultError> {
    match value {
        Value::Int(n) => Ok(NumericResult::Int(n)),
        Value::Bool(b) => Ok(NumericResult::Bool(b)),
        Value::Float(x) if x.is_finite() => Ok(NumericResult::Float(x)),
        Value::Float(x) => Err(ResultError::InvalidNumeric { value: x }),
        Value::Complex(c) => Ok(NumericResult::Complex(c)),
        other => Err(ResultError::NonNumeric {
            type_name: other.type_name(),
        }),
    }
}
