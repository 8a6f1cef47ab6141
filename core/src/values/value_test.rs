use num_bigint::BigInt;
use pretty_assertions::assert_eq;

use crate::evaluator::ExceptionKind;
use crate::values::{NumericRank, Value, f64_to_int, int_to_f64};

#[test]
fn test_type_names() {
    assert_eq!(Value::None.type_name(), "NoneType");
    assert_eq!(Value::Bool(true).type_name(), "bool");
    assert_eq!(Value::int(1).type_name(), "int");
    assert_eq!(Value::Float(1.0).type_name(), "float");
    assert_eq!(Value::complex(1.0, 1.0).type_name(), "complex");
}

#[test]
fn test_numeric_rank_puts_bool_with_int() {
    assert_eq!(Value::Bool(true).numeric_rank(), Some(NumericRank::Int));
    assert_eq!(Value::Float(0.5).numeric_rank(), Some(NumericRank::Float));
    assert!(NumericRank::Int < NumericRank::Complex);
    assert_eq!(Value::None.numeric_rank(), None);
}

#[test]
fn test_truthiness() {
    assert!(!Value::None.truthy());
    assert!(!Value::int(0).truthy());
    assert!(Value::int(-1).truthy());
    assert!(!Value::Float(0.0).truthy());
    assert!(Value::complex(0.0, 1.0).truthy());
}

#[test]
fn test_int_float_conversions() {
    assert_eq!(int_to_f64(&BigInt::from(7)).unwrap(), 7.0);
    let huge = BigInt::from(10).pow(400u32);
    assert_eq!(int_to_f64(&huge).unwrap_err().kind, ExceptionKind::OverflowError);

    assert_eq!(f64_to_int(-2.7).unwrap(), BigInt::from(-2));
    assert_eq!(f64_to_int(f64::NAN).unwrap_err().kind, ExceptionKind::ValueError);
    assert_eq!(
        f64_to_int(f64::INFINITY).unwrap_err().kind,
        ExceptionKind::OverflowError
    );
}

#[test]
fn test_to_f64_rejects_complex() {
    let err = Value::complex(1.0, 0.0).to_f64().unwrap_err();
    assert_eq!(err.kind, ExceptionKind::TypeError);
    assert_eq!(err.message, "must be real number, not complex");
}
