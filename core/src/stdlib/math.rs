//! Math Package
//!
//! Real-valued functions of the `math` module. Arguments are converted to
//! `f64` (integers and bools included); complex arguments are rejected.
//! A NaN produced from a non-NaN input is a domain error, an infinity
//! produced from a finite input is a range error.

use core::f64::consts::LN_2;

use num_bigint::{BigInt, Sign};
use num_traits::{One, Signed, ToPrimitive};

use crate::evaluator::{Budget, ExecutionError, RuntimeError};
use crate::stdlib::{Builtin, check_arity};
use crate::values::{Value, f64_to_int};

fn checked<'a>(input: f64, result: f64) -> Result<Value<'a>, RuntimeError> {
    if result.is_nan() && !input.is_nan() {
        return Err(RuntimeError::math_domain());
    }
    if result.is_infinite() && input.is_finite() {
        return Err(RuntimeError::math_range());
    }
    Ok(Value::Float(result))
}

/// One real argument in, one float out.
pub fn unary<'a>(
    builtin: Builtin,
    args: &[Value<'a>],
    f: fn(f64) -> f64,
) -> Result<Value<'a>, RuntimeError> {
    check_arity(builtin.name(), args, 1, 1)?;
    let x = args[0].to_f64()?;
    checked(x, f(x))
}

pub fn atan2<'a>(args: &[Value<'a>]) -> Result<Value<'a>, RuntimeError> {
    check_arity("atan2", args, 2, 2)?;
    let y = args[0].to_f64()?;
    let x = args[1].to_f64()?;
    Ok(Value::Float(y.atan2(x)))
}

// ============================================================================
// Logarithms
// ============================================================================

/// Natural logarithm of a positive real; integers of any size are accepted.
fn ln(value: &Value) -> Result<f64, RuntimeError> {
    if let Value::Int(n) = value {
        if n.sign() != Sign::Plus {
            return Err(RuntimeError::math_domain());
        }
        let bits = n.bits();
        if bits > 1000 {
            // Keep the top 64 bits; the rest only shifts the exponent.
            let shift = bits - 64;
            let top = (n >> shift).to_f64().unwrap_or(f64::MAX);
            return Ok(top.ln() + shift as f64 * LN_2);
        }
    }
    let x = value.to_f64()?;
    if x <= 0.0 {
        return Err(RuntimeError::math_domain());
    }
    Ok(x.ln())
}

/// `log(x)` or `log(x, base)`.
pub fn log<'a>(args: &[Value<'a>]) -> Result<Value<'a>, RuntimeError> {
    check_arity("log", args, 1, 2)?;
    let numerator = ln(&args[0])?;
    match args.get(1) {
        None => Ok(Value::Float(numerator)),
        Some(base) => {
            let denominator = ln(base)?;
            if denominator == 0.0 {
                return Err(RuntimeError::zero_division("float division by zero"));
            }
            Ok(Value::Float(numerator / denominator))
        }
    }
}

/// `log10` and `log2`: the dedicated float routine when the argument fits,
/// `ln(x) / ln(base)` for huge integers.
pub fn log_base<'a>(
    builtin: Builtin,
    args: &[Value<'a>],
    f: fn(f64) -> f64,
    ln_base: f64,
) -> Result<Value<'a>, RuntimeError> {
    check_arity(builtin.name(), args, 1, 1)?;
    match &args[0] {
        Value::Int(n) if n.bits() > 1000 => Ok(Value::Float(ln(&args[0])? / ln_base)),
        other => {
            let x = other.to_f64()?;
            if x <= 0.0 {
                return Err(RuntimeError::math_domain());
            }
            Ok(Value::Float(f(x)))
        }
    }
}

// ============================================================================
// Rounding
// ============================================================================

fn round_to_int<'a>(
    name: &str,
    args: &[Value<'a>],
    f: fn(f64) -> f64,
) -> Result<Value<'a>, RuntimeError> {
    check_arity(name, args, 1, 1)?;
    match &args[0] {
        Value::Float(x) => f64_to_int(f(*x)).map(Value::Int),
        Value::Int(n) => Ok(Value::Int(n.clone())),
        Value::Bool(b) => Ok(Value::int(*b as u8)),
        other => Err(RuntimeError::type_error(format!(
            "must be real number, not {}",
            other.type_name()
        ))),
    }
}

/// Smallest integer >= x, as an int.
pub fn ceil<'a>(args: &[Value<'a>]) -> Result<Value<'a>, RuntimeError> {
    round_to_int("ceil", args, f64::ceil)
}

/// Largest integer <= x, as an int.
pub fn floor<'a>(args: &[Value<'a>]) -> Result<Value<'a>, RuntimeError> {
    round_to_int("floor", args, f64::floor)
}

// ============================================================================
// Integers
// ============================================================================

/// `n!` for a non-negative integer, charged one step per multiplication.
pub fn factorial<'a>(
    args: &[Value<'a>],
    budget: &mut Budget<'_>,
) -> Result<Value<'a>, ExecutionError> {
    check_arity("factorial", args, 1, 1)?;
    let n = args[0].as_bigint().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            args[0].type_name()
        ))
    })?;
    if n.is_negative() {
        return Err(RuntimeError::value_error("factorial() not defined for negative values").into());
    }

    let max_bits = budget.max_int_bits();
    let too_large = || {
        RuntimeError::overflow(format!(
            "integer result exceeds the limit of {} bits",
            max_bits
        ))
    };
    let n = n.to_u64().ok_or_else(too_large)?;

    let mut result = BigInt::one();
    let mut k: u64 = 2;
    while k <= n {
        budget.tick()?;
        result *= k;
        if result.bits() > max_bits {
            return Err(too_large().into());
        }
        k += 1;
    }
    Ok(Value::Int(result))
}
