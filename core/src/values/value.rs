use std::rc::Rc;

use num_bigint::BigInt;
use num_complex::Complex64;
use num_traits::{ToPrimitive, Zero};

use crate::evaluator::RuntimeError;
use crate::parser::FunctionDef;
use crate::stdlib::Builtin;

/// A runtime value.
///
/// Values borrow the syntax tree (`'a`) for user-defined functions; every
/// other variant is self-contained.
#[derive(Debug, Clone)]
pub enum Value<'a> {
    None,
    Bool(bool),
    Int(BigInt),
    Float(f64),
    Complex(Complex64),
    Tuple(Rc<[Value<'a>]>),
    List(Rc<[Value<'a>]>),
    Function(Rc<Closure<'a>>),
    Builtin(Builtin),
}

/// A user-defined function together with its evaluated default values.
#[derive(Debug)]
pub struct Closure<'a> {
    pub def: &'a FunctionDef<'a>,
    // One slot per parameter; `None` for parameters without a default.
    pub defaults: Vec<Option<Value<'a>>>,
}

/// Position in the numeric tower, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NumericRank {
    Int,
    Float,
    Complex,
}

impl<'a> Value<'a> {
    pub fn int(n: impl Into<BigInt>) -> Self {
        Value::Int(n.into())
    }

    pub fn complex(re: f64, im: f64) -> Self {
        Value::Complex(Complex64::new(re, im))
    }

    /// Name of the value's type as the source language spells it.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::None => "NoneType",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Complex(_) => "complex",
            Value::Tuple(_) => "tuple",
            Value::List(_) => "list",
            Value::Function(_) => "function",
            Value::Builtin(_) => "builtin_function_or_method",
        }
    }

    pub fn numeric_rank(&self) -> Option<NumericRank> {
        match self {
            Value::Bool(_) | Value::Int(_) => Some(NumericRank::Int),
            Value::Float(_) => Some(NumericRank::Float),
            Value::Complex(_) => Some(NumericRank::Complex),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.numeric_rank().is_some()
    }

    /// The integer value of an `int` or `bool`.
    pub fn as_bigint(&self) -> Option<BigInt> {
        match self {
            Value::Bool(b) => Some(BigInt::from(*b as u8)),
            Value::Int(n) => Some(n.clone()),
            _ => None,
        }
    }

    /// Converts a real number to `f64`; fails for complex and non-numbers.
    pub fn to_f64(&self) -> Result<f64, RuntimeError> {
        match self {
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Int(n) => int_to_f64(n),
            Value::Float(f) => Ok(*f),
            other => Err(RuntimeError::type_error(format!(
                "must be real number, not {}",
                other.type_name()
            ))),
        }
    }

    pub fn to_complex(&self) -> Result<Complex64, RuntimeError> {
        match self {
            Value::Complex(c) => Ok(*c),
            other => other.to_f64().map(|re| Complex64::new(re, 0.0)),
        }
    }

    pub fn truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => !n.is_zero(),
            Value::Float(f) => *f != 0.0,
            Value::Complex(c) => !c.is_zero(),
            Value::Tuple(items) | Value::List(items) => !items.is_empty(),
            Value::Function(_) | Value::Builtin(_) => true,
        }
    }

    /// Elements of a tuple or list.
    pub fn iter_items(&self) -> Result<&[Value<'a>], RuntimeError> {
        match self {
            Value::Tuple(items) | Value::List(items) => Ok(items),
            other => Err(RuntimeError::type_error(format!(
                "'{}' object is not iterable",
                other.type_name()
            ))),
        }
    }
}

/// Converts an integer to the nearest `f64`.
pub fn int_to_f64(n: &BigInt) -> Result<f64, RuntimeError> {
    match n.to_f64() {
        Some(f) if f.is_finite() => Ok(f),
        _ => Err(RuntimeError::overflow("int too large to convert to float")),
    }
}

/// Converts an integral-valued float to an integer.
pub fn f64_to_int(f: f64) -> Result<BigInt, RuntimeError> {
    if f.is_nan() {
        return Err(RuntimeError::value_error("cannot convert float NaN to integer"));
    }
    if f.is_infinite() {
        return Err(RuntimeError::overflow("cannot convert float infinity to integer"));
    }
    num_traits::FromPrimitive::from_f64(f.trunc())
        .ok_or_else(|| RuntimeError::overflow("cannot convert float infinity to integer"))
}
