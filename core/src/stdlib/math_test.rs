use pretty_assertions::assert_eq;

use crate::api::ExecutionOptions;
use crate::evaluator::{Budget, ExceptionKind, ExecutionError, ResourceExceededError};
use crate::stdlib::Builtin;
use crate::values::Value;

fn call_with(
    options: &ExecutionOptions,
    builtin: Builtin,
    args: Vec<Value<'static>>,
) -> Result<Value<'static>, ExecutionError> {
    let mut budget = Budget::new(options, None);
    builtin.call(&args, &mut budget)
}

fn call(builtin: Builtin, args: Vec<Value<'static>>) -> Result<Value<'static>, ExecutionError> {
    call_with(&ExecutionOptions::default(), builtin, args)
}

fn float(builtin: Builtin, args: Vec<Value<'static>>) -> f64 {
    match call(builtin, args) {
        Ok(Value::Float(x)) => x,
        other => panic!("expected a float, got {:?}", other),
    }
}

fn exception_kind(builtin: Builtin, args: Vec<Value<'static>>) -> ExceptionKind {
    match call(builtin, args) {
        Err(ExecutionError::Runtime(e)) => e.kind,
        other => panic!("expected an exception, got {:?}", other),
    }
}

#[test]
fn test_basic_functions() {
    assert_eq!(float(Builtin::Sqrt, vec![Value::int(16)]), 4.0);
    assert_eq!(float(Builtin::Sin, vec![Value::Float(core::f64::consts::FRAC_PI_2)]), 1.0);
    assert_eq!(float(Builtin::Exp, vec![Value::int(0)]), 1.0);
    assert!((float(Builtin::Degrees, vec![Value::Float(core::f64::consts::PI)]) - 180.0).abs() < 1e-12);
    assert_eq!(float(Builtin::Atan2, vec![Value::int(0), Value::int(-1)]), core::f64::consts::PI);
    assert_eq!(float(Builtin::Cosh, vec![Value::Bool(false)]), 1.0);
}

#[test]
fn test_logarithms() {
    assert_eq!(float(Builtin::Log10, vec![Value::int(1000)]), 3.0);
    assert_eq!(float(Builtin::Log2, vec![Value::int(1024)]), 10.0);
    assert_eq!(float(Builtin::Log, vec![Value::Float(core::f64::consts::E)]), 1.0);
    assert_eq!(float(Builtin::Log, vec![Value::int(8), Value::int(2)]), 3.0);

    // Integers far outside the float range still have a logarithm.
    let huge = Value::Int(num_bigint::BigInt::from(10).pow(400u32));
    let log10 = float(Builtin::Log10, vec![huge]);
    assert!((log10 - 400.0).abs() < 1e-9);
}

#[test]
fn test_domain_errors() {
    assert_eq!(exception_kind(Builtin::Sqrt, vec![Value::int(-1)]), ExceptionKind::ValueError);
    assert_eq!(exception_kind(Builtin::Log, vec![Value::int(0)]), ExceptionKind::ValueError);
    assert_eq!(exception_kind(Builtin::Asin, vec![Value::int(2)]), ExceptionKind::ValueError);
    assert_eq!(
        exception_kind(Builtin::Log, vec![Value::int(10), Value::int(1)]),
        ExceptionKind::ZeroDivisionError
    );
    assert_eq!(
        exception_kind(Builtin::Sqrt, vec![Value::complex(0.0, 1.0)]),
        ExceptionKind::TypeError
    );
}

#[test]
fn test_range_errors() {
    assert_eq!(exception_kind(Builtin::Exp, vec![Value::int(1000)]), ExceptionKind::OverflowError);
    assert_eq!(exception_kind(Builtin::Sinh, vec![Value::int(1000)]), ExceptionKind::OverflowError);
    // Infinity in, infinity out is not an error.
    assert_eq!(float(Builtin::Sqrt, vec![Value::Float(f64::INFINITY)]), f64::INFINITY);
}

#[test]
fn test_ceil_and_floor_return_ints() {
    assert_eq!(call(Builtin::Ceil, vec![Value::Float(1.2)]).unwrap().to_string(), "2");
    assert_eq!(call(Builtin::Floor, vec![Value::Float(-1.2)]).unwrap().to_string(), "-2");
    assert_eq!(call(Builtin::Floor, vec![Value::int(7)]).unwrap().to_string(), "7");
    assert_eq!(exception_kind(Builtin::Ceil, vec![Value::Float(f64::NAN)]), ExceptionKind::ValueError);
}

#[test]
fn test_factorial() {
    assert_eq!(call(Builtin::Factorial, vec![Value::int(0)]).unwrap().to_string(), "1");
    assert_eq!(call(Builtin::Factorial, vec![Value::int(5)]).unwrap().to_string(), "120");
    assert_eq!(
        call(Builtin::Factorial, vec![Value::int(25)]).unwrap().to_string(),
        "15511210043330985984000000"
    );
    assert_eq!(exception_kind(Builtin::Factorial, vec![Value::int(-1)]), ExceptionKind::ValueError);
    assert_eq!(exception_kind(Builtin::Factorial, vec![Value::Float(5.0)]), ExceptionKind::TypeError);
}

#[test]
fn test_factorial_respects_limits() {
    let options = ExecutionOptions {
        max_int_bits: 64,
        ..ExecutionOptions::default()
    };
    match call_with(&options, Builtin::Factorial, vec![Value::int(30)]) {
        Err(ExecutionError::Runtime(e)) => assert_eq!(e.kind, ExceptionKind::OverflowError),
        other => panic!("expected overflow, got {:?}", other),
    }

    let options = ExecutionOptions {
        max_steps: 10,
        ..ExecutionOptions::default()
    };
    match call_with(&options, Builtin::Factorial, vec![Value::int(100)]) {
        Err(ExecutionError::ResourceExceeded(ResourceExceededError::StepLimit { max_steps })) => {
            assert_eq!(max_steps, 10)
        }
        other => panic!("expected step limit, got {:?}", other),
    }
}
