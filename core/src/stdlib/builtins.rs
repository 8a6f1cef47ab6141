//! General-purpose numeric builtins: `abs round min max sum pow int float
//! complex`.

use num_bigint::BigInt;
use num_complex::Complex64;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

use crate::evaluator::operators::{self, check_int_bits};
use crate::evaluator::{Budget, ExecutionError, RuntimeError};
use crate::parser::{BinaryOp, ComparisonOp};
use crate::stdlib::check_arity;
use crate::values::{Value, f64_to_int, int_to_f64};

pub fn abs<'a>(args: &[Value<'a>]) -> Result<Value<'a>, RuntimeError> {
    check_arity("abs", args, 1, 1)?;
    match &args[0] {
        Value::Float(x) => Ok(Value::Float(x.abs())),
        Value::Complex(c) => Ok(Value::Float(c.norm())),
        other => other
            .as_bigint()
            .map(|n| Value::Int(n.abs()))
            .ok_or_else(|| {
                RuntimeError::type_error(format!(
                    "bad operand type for abs(): '{}'",
                    other.type_name()
                ))
            }),
    }
}

fn index_arg(value: &Value) -> Result<BigInt, RuntimeError> {
    value.as_bigint().ok_or_else(|| {
        RuntimeError::type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            value.type_name()
        ))
    })
}

/// `round(x)` rounds half to even and returns an int; `round(x, n)` keeps
/// the type of `x`.
pub fn round<'a>(args: &[Value<'a>]) -> Result<Value<'a>, RuntimeError> {
    check_arity("round", args, 1, 2)?;
    let ndigits = match args.get(1) {
        None | Some(Value::None) => None,
        Some(n) => Some(index_arg(n)?),
    };

    match (&args[0], ndigits) {
        (Value::Float(x), None) => f64_to_int(x.round_ties_even()).map(Value::Int),
        (Value::Float(x), Some(n)) => {
            // Out-of-range digit counts saturate; the result is the same.
            let n = n.to_i32().unwrap_or(if n.is_negative() { i32::MIN } else { i32::MAX });
            round_float(*x, n).map(Value::Float)
        }
        (Value::Complex(_), _) => Err(RuntimeError::type_error(
            "type complex doesn't define __round__ method",
        )),
        (other, ndigits) => {
            let value = other.as_bigint().ok_or_else(|| {
                RuntimeError::type_error(format!(
                    "type {} doesn't define __round__ method",
                    other.type_name()
                ))
            })?;
            match ndigits {
                Some(n) if n.is_negative() => Ok(Value::Int(round_int(&value, &n))),
                _ => Ok(Value::Int(value)),
            }
        }
    }
}

fn round_float(x: f64, ndigits: i32) -> Result<f64, RuntimeError> {
    if !x.is_finite() || ndigits > 330 {
        return Ok(x);
    }
    if ndigits >= 0 {
        // Formatting rounds the exact binary value, half to even.
        let text = format!("{:.*}", ndigits as usize, x);
        return text
            .parse::<f64>()
            .map_err(|_| RuntimeError::value_error("could not round value"));
    }
    if ndigits < -308 {
        return Ok(0.0f64.copysign(x));
    }
    let scale = 10f64.powi(-ndigits);
    let rounded = (x / scale).round_ties_even() * scale;
    if rounded.is_infinite() {
        return Err(RuntimeError::overflow("rounded value too large to represent"));
    }
    Ok(rounded)
}

// Rounds to a multiple of 10**-ndigits, ties to even.
fn round_int(value: &BigInt, ndigits: &BigInt) -> BigInt {
    let Some(exponent) = (-ndigits).to_u64() else {
        return BigInt::zero();
    };
    // 10**k >= 2**(3k) > 2 * |value| once 3k exceeds the value's width, so
    // the value is below half the scale and rounds to zero.
    if exponent.saturating_mul(3) > value.bits() {
        return BigInt::zero();
    }
    let Ok(exponent) = u32::try_from(exponent) else {
        return BigInt::zero();
    };
    let scale = BigInt::from(10).pow(exponent);
    let (mut quotient, remainder) = value.div_mod_floor(&scale);
    let twice = remainder * 2;
    if twice > scale || (twice == scale && quotient.is_odd()) {
        quotient += 1;
    }
    quotient * scale
}

fn extremum<'a>(
    name: &str,
    args: &[Value<'a>],
    wanted: ComparisonOp,
    budget: &mut Budget<'_>,
) -> Result<Value<'a>, ExecutionError> {
    if args.is_empty() {
        return Err(RuntimeError::type_error(format!(
            "{} expected at least 1 argument, got 0",
            name
        ))
        .into());
    }
    let items = if args.len() == 1 {
        args[0].iter_items()?
    } else {
        args
    };

    let mut best = items
        .first()
        .ok_or_else(|| RuntimeError::value_error(format!("{}() arg is an empty sequence", name)))?;
    for item in &items[1..] {
        budget.tick()?;
        if operators::compare(wanted, item, best)? {
            best = item;
        }
    }
    Ok(best.clone())
}

pub fn min<'a>(args: &[Value<'a>], budget: &mut Budget<'_>) -> Result<Value<'a>, ExecutionError> {
    extremum("min", args, ComparisonOp::Lt, budget)
}

pub fn max<'a>(args: &[Value<'a>], budget: &mut Budget<'_>) -> Result<Value<'a>, ExecutionError> {
    extremum("max", args, ComparisonOp::Gt, budget)
}

/// `sum(iterable, start=0)`.
///
/// Once the running total is a float, real items are added with Neumaier
/// compensation, so ten `0.1` items sum to exactly `1.0`. Anything else
/// folds with `+`.
pub fn sum<'a>(args: &[Value<'a>], budget: &mut Budget<'_>) -> Result<Value<'a>, ExecutionError> {
    check_arity("sum", args, 1, 2)?;
    let mut total = args.get(1).cloned().unwrap_or_else(|| Value::int(0));
    let mut floats: Option<CompensatedSum> = None;
    for item in args[0].iter_items()? {
        budget.tick()?;
        let real = matches!(item, Value::Int(_) | Value::Bool(_) | Value::Float(_));
        if let Some(run) = floats.as_mut() {
            if real {
                run.add(item.to_f64()?);
                continue;
            }
            total = Value::Float(run.value());
            floats = None;
        } else if let (Value::Float(x), Value::Int(_) | Value::Bool(_) | Value::Float(_)) =
            (item, &total)
        {
            let mut run = CompensatedSum::new(total.to_f64()?);
            run.add(*x);
            floats = Some(run);
            continue;
        }
        total = operators::binary(BinaryOp::Add, &total, item, budget.max_int_bits())?;
    }
    Ok(match floats {
        Some(run) => Value::Float(run.value()),
        None => total,
    })
}

struct CompensatedSum {
    sum: f64,
    compensation: f64,
}

impl CompensatedSum {
    fn new(start: f64) -> Self {
        Self {
            sum: start,
            compensation: 0.0,
        }
    }

    fn add(&mut self, x: f64) {
        let t = self.sum + x;
        if self.sum.abs() >= x.abs() {
            self.compensation += (self.sum - t) + x;
        } else {
            self.compensation += (x - t) + self.sum;
        }
        self.sum = t;
    }

    // An infinite or NaN partial sum leaves a meaningless compensation.
    fn value(&self) -> f64 {
        if self.compensation != 0.0 && self.compensation.is_finite() {
            self.sum + self.compensation
        } else {
            self.sum
        }
    }
}

/// `pow(base, exp)` or the modular `pow(base, exp, mod)` for integers.
pub fn pow<'a>(args: &[Value<'a>], budget: &mut Budget<'_>) -> Result<Value<'a>, ExecutionError> {
    check_arity("pow", args, 2, 3)?;
    let Some(modulus) = args.get(2) else {
        return Ok(operators::power(&args[0], &args[1], budget.max_int_bits())?);
    };

    let (Some(base), Some(exp), Some(modulus)) =
        (args[0].as_bigint(), args[1].as_bigint(), modulus.as_bigint())
    else {
        return Err(RuntimeError::type_error(
            "pow() 3rd argument not allowed unless all arguments are integers",
        )
        .into());
    };
    if modulus.is_zero() {
        return Err(RuntimeError::value_error("pow() 3rd argument cannot be 0").into());
    }

    let (base, exp) = if exp.is_negative() {
        let gcd = base.extended_gcd(&modulus);
        if !gcd.gcd.abs().is_one() {
            return Err(RuntimeError::value_error(
                "base is not invertible for the given modulus",
            )
            .into());
        }
        (gcd.x.mod_floor(&modulus.abs()), -exp)
    } else {
        (base, exp)
    };

    Ok(check_int_bits(mod_pow(&base, &exp, &modulus, budget)?, budget.max_int_bits())?)
}

// Left-to-right square and multiply, reducing with `mod_floor` so the result
// takes the sign of the modulus. Each exponent bit is charged by the size of
// the modulus, which keeps the deadline and step limit in force for huge
// operands.
fn mod_pow(
    base: &BigInt,
    exp: &BigInt,
    modulus: &BigInt,
    budget: &mut Budget<'_>,
) -> Result<BigInt, ExecutionError> {
    let words = modulus.bits() / 64 + 1;
    let cost = words.saturating_mul(words);
    let base = base.mod_floor(modulus);
    let mut result = BigInt::one();
    for bit in (0..exp.bits()).rev() {
        budget.charge(cost)?;
        result = (&result * &result).mod_floor(modulus);
        if exp.bit(bit) {
            result = (&result * &base).mod_floor(modulus);
        }
    }
    Ok(result.mod_floor(modulus))
}

/// `int(x)` truncates toward zero.
pub fn int<'a>(args: &[Value<'a>]) -> Result<Value<'a>, RuntimeError> {
    check_arity("int", args, 0, 1)?;
    let Some(value) = args.first() else {
        return Ok(Value::int(0));
    };
    match value {
        Value::Float(x) => f64_to_int(*x).map(Value::Int),
        other => other.as_bigint().map(Value::Int).ok_or_else(|| {
            RuntimeError::type_error(format!(
                "int() argument must be a string, a bytes-like object or a real number, not '{}'",
                other.type_name()
            ))
        }),
    }
}

pub fn float<'a>(args: &[Value<'a>]) -> Result<Value<'a>, RuntimeError> {
    check_arity("float", args, 0, 1)?;
    let Some(value) = args.first() else {
        return Ok(Value::Float(0.0));
    };
    match value {
        Value::Float(x) => Ok(Value::Float(*x)),
        Value::Int(n) => int_to_f64(n).map(Value::Float),
        Value::Bool(b) => Ok(Value::Float(if *b { 1.0 } else { 0.0 })),
        other => Err(RuntimeError::type_error(format!(
            "float() argument must be a string or a real number, not '{}'",
            other.type_name()
        ))),
    }
}

/// `complex(real=0, imag=0)`; either part may itself be complex.
pub fn complex<'a>(args: &[Value<'a>]) -> Result<Value<'a>, RuntimeError> {
    check_arity("complex", args, 0, 2)?;
    let part = |index: usize, which: &str| -> Result<Complex64, RuntimeError> {
        match args.get(index) {
            None => Ok(Complex64::zero()),
            Some(value) if value.is_numeric() => value.to_complex(),
            Some(value) => Err(RuntimeError::type_error(format!(
                "complex() {} argument must be a number, not '{}'",
                which,
                value.type_name()
            ))),
        }
    };
    let real = part(0, "first")?;
    let imag = part(1, "second")?;
    Ok(Value::complex(real.re - imag.im, real.im + imag.re))
}
