use std::rc::Rc;

use num_bigint::BigInt;
use num_complex::Complex64;
use pretty_assertions::assert_eq;

use super::*;

fn rendered(value: Value<'static>) -> String {
    match validate(value) {
        Ok(result) => result.to_string(),
        Err(e) => panic!("unexpected rejection: {}", e),
    }
}

#[test]
fn test_accepts_numbers() {
    assert_eq!(rendered(Value::int(1024)), "1024");
    assert_eq!(rendered(Value::Float(5.0)), "5.0");
    assert_eq!(rendered(Value::Float(1e16)), "1e+16");
    assert_eq!(rendered(Value::Float(1.5e-5)), "1.5e-05");
    assert_eq!(rendered(Value::Float(0.1 + 0.2)), "0.30000000000000004");
    assert_eq!(rendered(Value::complex(0.0, 2.0)), "2j");
    assert_eq!(rendered(Value::complex(1.0, 2.0)), "(1+2j)");
    assert_eq!(rendered(Value::complex(1.5, -0.0)), "(1.5-0j)");
    assert_eq!(rendered(Value::Bool(true)), "True");
    assert_eq!(
        rendered(Value::Int(BigInt::from(2).pow(70))),
        "1180591620717411303424"
    );
}

#[test]
fn test_rejects_non_numbers() {
    assert_eq!(
        validate(Value::None),
        Err(ResultError::NonNumeric {
            type_name: "NoneType"
        })
    );
    let tuple = Value::Tuple(Rc::from(vec![Value::int(1), Value::int(2)]));
    assert_eq!(
        validate(tuple),
        Err(ResultError::NonNumeric { type_name: "tuple" })
    );
    assert_eq!(
        validate(Value::Builtin(crate::stdlib::Builtin::Sqrt)),
        Err(ResultError::NonNumeric {
            type_name: "builtin_function_or_method"
        })
    );
}

#[test]
fn test_rejects_non_finite_reals() {
    assert!(matches!(
        validate(Value::Float(f64::INFINITY)),
        Err(ResultError::InvalidNumeric { .. })
    ));
    assert!(matches!(
        validate(Value::Float(f64::NEG_INFINITY)),
        Err(ResultError::InvalidNumeric { .. })
    ));
    assert!(matches!(
        validate(Value::Float(f64::NAN)),
        Err(ResultError::InvalidNumeric { .. })
    ));
}

#[test]
fn test_complex_is_not_checked_for_finiteness() {
    let value = Value::Complex(Complex64::new(f64::INFINITY, 1.0));
    assert_eq!(rendered(value), "(inf+1j)");
}


#[test]
fn test_diagnostics() {
    let diagnostic = ResultError::InvalidNumeric { value: f64::INFINITY }.to_diagnostic();
    assert_eq!(diagnostic.code, Some("R002".to_string()));
    assert_eq!(diagnostic.message, "function returned inf, which is not a finite number");
    let diagnostic = ResultError::NonNumeric { type_name: "list" }.to_diagnostic();
    assert_eq!(diagnostic.code, Some("R001".to_string()));
}
