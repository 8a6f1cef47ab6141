mod cases;

test_case!(
    readme_example,
    input: "def myfunc():\n    return sqrt(16) + sin(pi/2)",
    output: "Result: 5.0",
);

test_case!(
    pow_builtin,
    input: "def f(): return pow(2,10)",
    output: "Result: 1024",
);

test_case!(
    empty_source,
    input: "",
    error: EmptyInput,
);

test_case!(
    whitespace_only,
    input: "   \n\t  \n",
    error: EmptyInput,
);

test_case!(
    too_long_even_if_blank,
    input: &" ".repeat(5000),
    error: TooLong,
);

test_case!(
    import_os,
    input: "def f(): import os",
    error: ForbiddenPattern,
);

test_case!(
    syntax_error,
    input: "def f() return 1",
    error: SyntaxError,
);

test_case!(
    no_function,
    input: "x = 1 + 2",
    error: NoFunctionDefined,
);

test_case!(
    two_functions,
    input: "def f(): return 1\ndef g(): return 2",
    error: MultipleFunctionsDefined,
);

test_case!(
    disallowed_identifier,
    input: "def f(): return undefined_name",
    error: DisallowedIdentifier,
);

test_case!(
    runtime_exception,
    input: "def f(): return 1 / 0",
    error: ExecutionFailed,
);

test_case!(
    infinite_loop,
    input: "def f():\n    while True:\n        pass",
    error: ExecutionTimeout,
);

test_case!(
    returns_none,
    input: "def f(): return None",
    error: NonNumericResult,
);

test_case!(
    returns_infinity,
    input: "def f(): return 1e308 * 10",
    error: InvalidNumericResult,
);

test_case!(
    returns_nan,
    input: "def f(): return 1e308 * 10 - 1e308 * 10",
    error: InvalidNumericResult,
);

#[test]
fn test_same_source_twice_gives_same_output() {
    let source = "def f(): return factorial(30) / 7 + log(1000, 10)";
    let first = mathbox::execute_math_function(source);
    let second = mathbox::execute_math_function(source);
    pretty_assertions::assert_eq!(first, second);
}

#[test]
fn test_rejection_stages() {
    use mathbox::{ErrorKind, Stage, execute_math_function};

    let err = execute_math_function("def f(): return open('x')").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ForbiddenPattern);
    assert_eq!(err.stage(), Stage::Guard);
    assert!(err.is_policy_rejection());

    let err = execute_math_function("def f(): return sqrt(-1)").unwrap_err();
    assert_eq!(err.stage(), Stage::Execution);
    assert!(err.is_execution_failure());
    assert_eq!(err.to_string(), "ExecutionFailed: ValueError: math domain error");
}
