//! Binary, unary and comparison operators over the numeric tower.
//!
//! Integers are exact and bounded only by `max_int_bits`; floats follow
//! IEEE 754 except where the source language raises instead (division by
//! zero, `**` overflow).

use core::cmp::Ordering;
use std::rc::Rc;

use num_bigint::BigInt;
use num_complex::Complex64;
use num_integer::Integer;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive, Zero};

use crate::evaluator::{ExceptionKind, RuntimeError};
use crate::parser::{BinaryOp, ComparisonOp, UnaryOp};
use crate::values::{NumericRank, Value, int_to_f64};

/// Longest tuple or list concatenation can build.
pub(crate) const MAX_SEQUENCE_LEN: usize = 1_000_000;

fn unsupported(op: BinaryOp, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::type_error(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

fn int_too_large(max_bits: u64) -> RuntimeError {
    RuntimeError::overflow(format!(
        "integer result exceeds the limit of {} bits",
        max_bits
    ))
}

/// Rejects integers wider than `max_bits`.
pub(crate) fn check_int_bits<'a>(n: BigInt, max_bits: u64) -> Result<Value<'a>, RuntimeError> {
    if n.bits() > max_bits {
        return Err(int_too_large(max_bits));
    }
    Ok(Value::Int(n))
}

pub(crate) fn binary<'a>(
    op: BinaryOp,
    left: &Value<'a>,
    right: &Value<'a>,
    max_int_bits: u64,
) -> Result<Value<'a>, RuntimeError> {
    let (Some(left_rank), Some(right_rank)) = (left.numeric_rank(), right.numeric_rank()) else {
        return sequence_binary(op, left, right);
    };
    if op == BinaryOp::Pow {
        return power(left, right, max_int_bits);
    }

    match left_rank.max(right_rank) {
        NumericRank::Int => match (left.as_bigint(), right.as_bigint()) {
            (Some(a), Some(b)) => int_binary(op, a, b, max_int_bits),
            _ => Err(unsupported(op, left, right)),
        },
        NumericRank::Float => float_binary(op, left.to_f64()?, right.to_f64()?),
        NumericRank::Complex => {
            if matches!(op, BinaryOp::FloorDiv | BinaryOp::Mod) {
                return Err(unsupported(op, left, right));
            }
            complex_binary(op, left.to_complex()?, right.to_complex()?)
        }
    }
}

fn int_binary<'a>(
    op: BinaryOp,
    a: BigInt,
    b: BigInt,
    max_bits: u64,
) -> Result<Value<'a>, RuntimeError> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => {
            if a.bits() + b.bits() > max_bits + 1 {
                return Err(int_too_large(max_bits));
            }
            a * b
        }
        BinaryOp::Div => {
            if b.is_zero() {
                return Err(RuntimeError::zero_division("division by zero"));
            }
            return int_true_div(&a, &b).map(Value::Float);
        }
        BinaryOp::FloorDiv => {
            if b.is_zero() {
                return Err(RuntimeError::zero_division(
                    "integer division or modulo by zero",
                ));
            }
            a.div_floor(&b)
        }
        BinaryOp::Mod => {
            if b.is_zero() {
                return Err(RuntimeError::zero_division("integer modulo by zero"));
            }
            a.mod_floor(&b)
        }
        BinaryOp::Pow => return int_pow(&a, &b, max_bits),
    };
    check_int_bits(result, max_bits)
}

/// Correctly scaled `a / b` for integers that may not fit in an `f64`.
fn int_true_div(a: &BigInt, b: &BigInt) -> Result<f64, RuntimeError> {
    if a.bits() <= 53 && b.bits() <= 53 {
        return Ok(int_to_f64(a)? / int_to_f64(b)?);
    }

    // Scale so the integer quotient carries 64 significant bits.
    let negative = a.is_negative() != b.is_negative();
    let (a, b) = (a.abs(), b.abs());
    let shift = 64 + b.bits() as i64 - a.bits() as i64;
    let quotient = if shift >= 0 {
        (a << shift as u64) / b
    } else {
        a / (b << (-shift) as u64)
    };
    let magnitude = scale_by_pow2(quotient.to_f64().unwrap_or(f64::INFINITY), -shift);
    if magnitude.is_infinite() {
        return Err(RuntimeError::overflow(
            "integer division result too large for a float",
        ));
    }
    Ok(if negative { -magnitude } else { magnitude })
}

// `x * 2**exp` in steps, so a subnormal result is not lost to an
// intermediate power of two that underflows to zero.
fn scale_by_pow2(mut x: f64, mut exp: i64) -> f64 {
    const STEP: i64 = 1000;
    while exp > STEP && x.is_finite() {
        x *= 2f64.powi(STEP as i32);
        exp -= STEP;
    }
    while exp < -STEP && x != 0.0 {
        x *= 2f64.powi(-STEP as i32);
        exp += STEP;
    }
    x * 2f64.powi(exp.clamp(-STEP, STEP) as i32)
}

fn float_binary<'a>(op: BinaryOp, a: f64, b: f64) -> Result<Value<'a>, RuntimeError> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(RuntimeError::zero_division("float division by zero"));
            }
            a / b
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(RuntimeError::zero_division("float floor division by zero"));
            }
            float_divmod(a, b).0
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(RuntimeError::zero_division("float modulo by zero"));
            }
            float_divmod(a, b).1
        }
        BinaryOp::Pow => return float_pow(a, b),
    };
    Ok(Value::Float(result))
}

/// Floor division and modulo with the sign of the divisor.
fn float_divmod(a: f64, b: f64) -> (f64, f64) {
    let mut rem = a % b;
    let mut div = (a - rem) / b;
    if rem != 0.0 {
        if (b < 0.0) != (rem < 0.0) {
            rem += b;
            div -= 1.0;
        }
    } else {
        rem = 0.0f64.copysign(b);
    }

    let floordiv = if div != 0.0 {
        let mut floor = div.floor();
        if div - floor > 0.5 {
            floor += 1.0;
        }
        floor
    } else {
        0.0f64.copysign(a / b)
    };
    (floordiv, rem)
}

fn complex_binary<'a>(
    op: BinaryOp,
    a: Complex64,
    b: Complex64,
) -> Result<Value<'a>, RuntimeError> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b.is_zero() {
                return Err(RuntimeError::zero_division("complex division by zero"));
            }
            a / b
        }
        BinaryOp::Pow => return complex_pow(a, b, None),
        BinaryOp::FloorDiv | BinaryOp::Mod => {
            return Err(RuntimeError::type_error(format!(
                "unsupported operand type(s) for {}: 'complex' and 'complex'",
                op.symbol()
            )));
        }
    };
    Ok(Value::Complex(result))
}

/// `base ** exp`, shared by the operator and the `pow` builtin.
pub(crate) fn power<'a>(
    base: &Value<'a>,
    exp: &Value<'a>,
    max_int_bits: u64,
) -> Result<Value<'a>, RuntimeError> {
    let (Some(base_rank), Some(exp_rank)) = (base.numeric_rank(), exp.numeric_rank()) else {
        return Err(unsupported(BinaryOp::Pow, base, exp));
    };

    match base_rank.max(exp_rank) {
        NumericRank::Int => match (base.as_bigint(), exp.as_bigint()) {
            (Some(b), Some(e)) => int_pow(&b, &e, max_int_bits),
            _ => Err(unsupported(BinaryOp::Pow, base, exp)),
        },
        NumericRank::Float => float_pow(base.to_f64()?, exp.to_f64()?),
        NumericRank::Complex => {
            let small_int = exp
                .as_bigint()
                .and_then(|n| n.to_i32())
                .filter(|n| n.abs() <= 100);
            complex_pow(base.to_complex()?, exp.to_complex()?, small_int)
        }
    }
}

fn int_pow<'a>(base: &BigInt, exp: &BigInt, max_bits: u64) -> Result<Value<'a>, RuntimeError> {
    if exp.is_negative() {
        if base.is_zero() {
            return Err(RuntimeError::zero_division(
                "0.0 cannot be raised to a negative power",
            ));
        }
        return float_pow(int_to_f64(base)?, int_to_f64(exp)?);
    }

    if base.is_zero() || base.is_one() {
        return Ok(Value::Int(if exp.is_zero() {
            BigInt::one()
        } else {
            base.clone()
        }));
    }
    if *base == BigInt::from(-1) {
        return Ok(Value::int(if exp.is_even() { 1 } else { -1 }));
    }

    // |base| >= 2, so the result has at least (bits - 1) * exp + 1 bits.
    let too_large = || int_too_large(max_bits);
    let exp = exp.to_u64().ok_or_else(too_large)?;
    let min_bits = (base.bits() - 1).saturating_mul(exp).saturating_add(1);
    if min_bits > max_bits {
        return Err(too_large());
    }
    let exp = u32::try_from(exp).map_err(|_| too_large())?;
    check_int_bits(base.pow(exp), max_bits)
}

fn float_pow<'a>(base: f64, exp: f64) -> Result<Value<'a>, RuntimeError> {
    if base == 0.0 && exp < 0.0 {
        return Err(RuntimeError::zero_division(
            "0.0 cannot be raised to a negative power",
        ));
    }
    if base < 0.0 && base.is_finite() && exp.is_finite() && exp.fract() != 0.0 {
        return complex_pow(Complex64::new(base, 0.0), Complex64::new(exp, 0.0), None);
    }

    let result = base.powf(exp);
    if result.is_infinite() && base.is_finite() && exp.is_finite() {
        return Err(RuntimeError::overflow("Numerical result out of range"));
    }
    Ok(Value::Float(result))
}

fn complex_pow<'a>(
    base: Complex64,
    exp: Complex64,
    small_int: Option<i32>,
) -> Result<Value<'a>, RuntimeError> {
    if base.is_zero() {
        if exp.is_zero() {
            return Ok(Value::complex(1.0, 0.0));
        }
        if exp.re < 0.0 || exp.im != 0.0 {
            return Err(RuntimeError::zero_division(
                "0.0 to a negative or complex power",
            ));
        }
        return Ok(Value::complex(0.0, 0.0));
    }

    // Small integral exponents use repeated multiplication, which keeps
    // results like (1+2j)**2 exact.
    let result = match small_int {
        Some(n) => base.powi(n),
        None => base.powc(exp),
    };
    let finite_inputs = base.re.is_finite() && base.im.is_finite() && exp.re.is_finite();
    if finite_inputs && !(result.re.is_finite() && result.im.is_finite()) {
        return Err(RuntimeError::overflow("complex exponentiation"));
    }
    Ok(Value::Complex(result))
}

fn sequence_binary<'a>(
    op: BinaryOp,
    left: &Value<'a>,
    right: &Value<'a>,
) -> Result<Value<'a>, RuntimeError> {
    let concat = |a: &[Value<'a>], b: &[Value<'a>]| -> Result<Rc<[Value<'a>]>, RuntimeError> {
        if a.len() + b.len() > MAX_SEQUENCE_LEN {
            return Err(RuntimeError::new(
                ExceptionKind::MemoryError,
                "sequence too long",
            ));
        }
        Ok(a.iter().chain(b.iter()).cloned().collect())
    };

    match (op, left, right) {
        (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => Ok(Value::Tuple(concat(a, b)?)),
        (BinaryOp::Add, Value::List(a), Value::List(b)) => Ok(Value::List(concat(a, b)?)),
        _ => Err(unsupported(op, left, right)),
    }
}

pub(crate) fn unary<'a>(op: UnaryOp, value: &Value<'a>) -> Result<Value<'a>, RuntimeError> {
    let bad_operand = |symbol: &str| {
        RuntimeError::type_error(format!(
            "bad operand type for unary {}: '{}'",
            symbol,
            value.type_name()
        ))
    };

    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.truthy())),
        UnaryOp::Neg => match value {
            Value::Float(f) => Ok(Value::Float(-f)),
            Value::Complex(c) => Ok(Value::Complex(-c)),
            other => other
                .as_bigint()
                .map(|n| Value::Int(-n))
                .ok_or_else(|| bad_operand("-")),
        },
        UnaryOp::Pos => match value {
            Value::Float(_) | Value::Complex(_) => Ok(value.clone()),
            other => other.as_bigint().map(Value::Int).ok_or_else(|| bad_operand("+")),
        },
        UnaryOp::Invert => value
            .as_bigint()
            .map(|n| Value::Int(-n - BigInt::one()))
            .ok_or_else(|| bad_operand("~")),
    }
}

/// Evaluates one link of a (possibly chained) comparison.
pub(crate) fn compare(op: ComparisonOp, left: &Value, right: &Value) -> Result<bool, RuntimeError> {
    match op {
        ComparisonOp::Eq => Ok(values_equal(left, right)),
        ComparisonOp::Neq => Ok(!values_equal(left, right)),
        _ => {
            let ordering = order(op, left, right)?;
            Ok(match ordering {
                None => false,
                Some(ordering) => match op {
                    ComparisonOp::Lt => ordering == Ordering::Less,
                    ComparisonOp::Le => ordering != Ordering::Greater,
                    ComparisonOp::Gt => ordering == Ordering::Greater,
                    _ => ordering != Ordering::Less,
                },
            })
        }
    }
}

pub(crate) fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::None, Value::None) => true,
        (Value::Tuple(a), Value::Tuple(b)) | (Value::List(a), Value::List(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
        (Value::Builtin(a), Value::Builtin(b)) => a == b,
        _ => match (left.numeric_rank(), right.numeric_rank()) {
            (Some(NumericRank::Complex), Some(_)) | (Some(_), Some(NumericRank::Complex)) => {
                match (left.to_complex(), right.to_complex()) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                }
            }
            (Some(_), Some(_)) => real_cmp(left, right) == Some(Ordering::Equal),
            _ => false,
        },
    }
}

/// Ordering used by `<`, `min` and `max`. `None` means unordered (NaN).
pub(crate) fn order(
    op: ComparisonOp,
    left: &Value,
    right: &Value,
) -> Result<Option<Ordering>, RuntimeError> {
    match (left, right) {
        (Value::Tuple(a), Value::Tuple(b)) | (Value::List(a), Value::List(b)) => {
            for (x, y) in a.iter().zip(b.iter()) {
                if !values_equal(x, y) {
                    return order(op, x, y);
                }
            }
            Ok(Some(a.len().cmp(&b.len())))
        }
        _ => match (left.numeric_rank(), right.numeric_rank()) {
            (Some(l), Some(r)) if l != NumericRank::Complex && r != NumericRank::Complex => {
                Ok(real_cmp(left, right))
            }
            _ => Err(RuntimeError::type_error(format!(
                "'{}' not supported between instances of '{}' and '{}'",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ))),
        },
    }
}

fn real_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
        (Value::Float(f), other) => other.as_bigint().and_then(|n| int_float_cmp(&n, *f)).map(Ordering::reverse),
        (other, Value::Float(f)) => other.as_bigint().and_then(|n| int_float_cmp(&n, *f)),
        _ => match (left.as_bigint(), right.as_bigint()) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        },
    }
}

// Exact comparison of an integer with a float, without rounding the integer.
fn int_float_cmp(n: &BigInt, f: f64) -> Option<Ordering> {
    if f.is_nan() {
        return None;
    }
    if f.is_infinite() {
        return Some(if f > 0.0 { Ordering::Less } else { Ordering::Greater });
    }
    let floor = f.floor();
    let floor_int = BigInt::from_f64(floor)?;
    Some(match n.cmp(&floor_int) {
        Ordering::Equal if f > floor => Ordering::Less,
        ordering => ordering,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BITS: u64 = 100_000;

    fn int(n: i64) -> Value<'static> {
        Value::int(n)
    }

    fn eval(op: BinaryOp, a: Value<'static>, b: Value<'static>) -> Result<String, RuntimeError> {
        binary(op, &a, &b, BITS).map(|v| v.to_string())
    }

    #[test]
    fn test_int_arithmetic_is_exact() {
        assert_eq!(eval(BinaryOp::Add, int(2), int(3)).unwrap(), "5");
        assert_eq!(eval(BinaryOp::Mul, int(i64::MAX), int(2)).unwrap(), "18446744073709551614");
        assert_eq!(eval(BinaryOp::Pow, int(2), int(10)).unwrap(), "1024");
        assert_eq!(eval(BinaryOp::Sub, Value::Bool(true), int(3)).unwrap(), "-2");
    }

    #[test]
    fn test_floor_division_and_modulo_round_toward_negative_infinity() {
        assert_eq!(eval(BinaryOp::FloorDiv, int(-7), int(2)).unwrap(), "-4");
        assert_eq!(eval(BinaryOp::Mod, int(-7), int(2)).unwrap(), "1");
        assert_eq!(eval(BinaryOp::Mod, int(7), int(-2)).unwrap(), "-1");
        assert_eq!(eval(BinaryOp::FloorDiv, Value::Float(-7.5), int(2)).unwrap(), "-4.0");
        assert_eq!(eval(BinaryOp::Mod, Value::Float(-7.5), int(2)).unwrap(), "0.5");
    }

    #[test]
    fn test_true_division() {
        assert_eq!(eval(BinaryOp::Div, int(7), int(2)).unwrap(), "3.5");
        assert_eq!(eval(BinaryOp::Div, int(1), int(3)).unwrap(), "0.3333333333333333");
        let big = Value::Int(BigInt::from(10).pow(400u32));
        let smaller = Value::Int(BigInt::from(10).pow(399u32));
        assert_eq!(binary(BinaryOp::Div, &big, &smaller, BITS).unwrap().to_string(), "10.0");
    }

    #[test]
    fn test_true_division_into_subnormals() {
        let huge = Value::Int(BigInt::from(2).pow(1070u32));
        assert_eq!(eval(BinaryOp::Div, int(1), huge.clone()).unwrap(), "8e-323");
        assert_eq!(eval(BinaryOp::Div, int(-3), huge).unwrap(), "-2.37e-322");

        let beyond = Value::Int(BigInt::from(2).pow(1100u32));
        assert_eq!(eval(BinaryOp::Div, int(1), beyond).unwrap(), "0.0");
    }

    #[test]
    fn test_division_by_zero() {
        for (op, a, b) in [
            (BinaryOp::Div, int(1), int(0)),
            (BinaryOp::FloorDiv, int(1), int(0)),
            (BinaryOp::Mod, int(1), int(0)),
            (BinaryOp::Div, Value::Float(1.0), Value::Float(0.0)),
            (BinaryOp::Div, Value::complex(1.0, 1.0), int(0)),
        ] {
            let err = eval(op, a, b).unwrap_err();
            assert_eq!(err.kind, ExceptionKind::ZeroDivisionError);
        }
    }

    #[test]
    fn test_power_edge_cases() {
        assert_eq!(eval(BinaryOp::Pow, int(2), int(-1)).unwrap(), "0.5");
        match binary(BinaryOp::Pow, &int(-8), &Value::Float(1.0 / 3.0), BITS).unwrap() {
            Value::Complex(c) => {
                assert!((c.re - 1.0).abs() < 1e-12);
                assert!((c.im - 3f64.sqrt()).abs() < 1e-12);
            }
            other => panic!("expected complex, got {}", other),
        }
        assert_eq!(eval(BinaryOp::Pow, Value::complex(1.0, 2.0), int(2)).unwrap(), "(-3+4j)");
        assert_eq!(
            eval(BinaryOp::Pow, int(0), int(-1)).unwrap_err().kind,
            ExceptionKind::ZeroDivisionError
        );
        assert_eq!(
            eval(BinaryOp::Pow, Value::Float(10.0), Value::Float(400.0)).unwrap_err().kind,
            ExceptionKind::OverflowError
        );
    }

    #[test]
    fn test_int_size_limit() {
        let err = binary(BinaryOp::Pow, &int(10), &int(1_000_000), BITS).unwrap_err();
        assert_eq!(err.kind, ExceptionKind::OverflowError);
        assert!(binary(BinaryOp::Pow, &int(2), &int(1000), BITS).is_ok());
    }

    #[test]
    fn test_float_overflow_yields_infinity() {
        assert_eq!(eval(BinaryOp::Mul, Value::Float(1e308), int(10)).unwrap(), "inf");
    }

    #[test]
    fn test_unsupported_operands() {
        let err = eval(BinaryOp::Add, Value::None, int(1)).unwrap_err();
        assert_eq!(err.kind, ExceptionKind::TypeError);
        assert_eq!(err.message, "unsupported operand type(s) for +: 'NoneType' and 'int'");

        let err = eval(BinaryOp::FloorDiv, Value::complex(1.0, 0.0), int(1)).unwrap_err();
        assert_eq!(err.kind, ExceptionKind::TypeError);
    }

    #[test]
    fn test_unary() {
        assert_eq!(unary(UnaryOp::Neg, &int(5)).unwrap().to_string(), "-5");
        assert_eq!(unary(UnaryOp::Invert, &int(5)).unwrap().to_string(), "-6");
        assert_eq!(unary(UnaryOp::Pos, &Value::Bool(true)).unwrap().to_string(), "1");
        assert_eq!(unary(UnaryOp::Not, &int(0)).unwrap().to_string(), "True");
        let err = unary(UnaryOp::Invert, &Value::Float(1.0)).unwrap_err();
        assert_eq!(err.message, "bad operand type for unary ~: 'float'");
    }

    #[test]
    fn test_comparisons() {
        assert!(compare(ComparisonOp::Eq, &int(1), &Value::Float(1.0)).unwrap());
        assert!(compare(ComparisonOp::Eq, &Value::Bool(true), &int(1)).unwrap());
        assert!(compare(ComparisonOp::Lt, &int(2), &Value::Float(2.5)).unwrap());
        assert!(!compare(ComparisonOp::Lt, &Value::Float(f64::NAN), &int(1)).unwrap());
        assert!(compare(ComparisonOp::Neq, &Value::None, &int(0)).unwrap());

        // 2**53 + 1 is not representable as a float but still compares exactly.
        let big = Value::Int(BigInt::from(9_007_199_254_740_993_i64));
        assert!(compare(ComparisonOp::Gt, &big, &Value::Float(9_007_199_254_740_992.0)).unwrap());

        let err = compare(ComparisonOp::Lt, &Value::complex(1.0, 0.0), &int(1)).unwrap_err();
        assert_eq!(err.message, "'<' not supported between instances of 'complex' and 'int'");
    }
}
