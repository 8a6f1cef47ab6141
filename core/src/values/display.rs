//! Canonical text for values, matching the source language's `repr`.

use core::fmt;

use num_complex::Complex64;

use crate::values::Value;

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => write!(f, "None"),
            Value::Bool(true) => write!(f, "True"),
            Value::Bool(false) => write!(f, "False"),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(x) => write!(f, "{}", format_float(*x)),
            Value::Complex(c) => write!(f, "{}", format_complex(*c)),
            Value::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Value::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
            Value::Function(closure) => write!(f, "<function {}>", closure.def.name.name),
            Value::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name()),
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value<'_>]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

/// Shortest round-trip text for a float, always with a decimal point or an
/// exponent (`5.0`, `0.1`, `1e+16`, `1.5e-05`).
pub fn format_float(x: f64) -> String {
    repr_float(x, true)
}

/// Complex text: `2j`, `(1+2j)`, `(1.5-0j)`.
pub fn format_complex(c: Complex64) -> String {
    let imag = repr_float(c.im.abs(), false);

    if c.re == 0.0 && c.re.is_sign_positive() {
        let sign = if c.im.is_sign_negative() && !c.im.is_nan() { "-" } else { "" };
        return format!("{}{}j", sign, imag);
    }

    let sign = if c.im.is_sign_negative() && !c.im.is_nan() { '-' } else { '+' };
    format!("({}{}{}j)", repr_float(c.re, false), sign, imag)
}

fn repr_float(x: f64, add_dot_zero: bool) -> String {
    if x.is_nan() {
        return "nan".to_string();
    }
    if x.is_infinite() {
        return if x > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let sign = if x.is_sign_negative() { "-" } else { "" };
    if x == 0.0 {
        return format!("{}0{}", sign, if add_dot_zero { ".0" } else { "" });
    }

    // `{:e}` yields the shortest round-trip digits as `d.ddde<exp>`.
    let scientific = format!("{:e}", x.abs());
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();

    let body = if !(-4..16).contains(&exponent) {
        let mut mantissa = digits[..1].to_string();
        if digits.len() > 1 {
            mantissa.push('.');
            mantissa.push_str(&digits[1..]);
        }
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, exp_sign, exponent.abs())
    } else if exponent < 0 {
        format!("0.{}{}", "0".repeat((-exponent - 1) as usize), digits)
    } else {
        let point = exponent as usize + 1;
        if digits.len() <= point {
            let zeros = "0".repeat(point - digits.len());
            if add_dot_zero {
                format!("{}{}.0", digits, zeros)
            } else {
                format!("{}{}", digits, zeros)
            }
        } else {
            format!("{}.{}", &digits[..point], &digits[point..])
        }
    };

    format!("{}{}", sign, body)
}
