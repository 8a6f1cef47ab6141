// Attempts to reach outside the capability table.

mod cases;

test_case!(
    dunder_access,
    input: "def f(): return ().__class__",
    error: ForbiddenPattern,
);

test_case!(
    import_inside_function,
    input: "def f():\n    import sys\n    return 1",
    error: ForbiddenPattern,
);

test_case!(
    from_import_other_module,
    input: "from os import path\ndef f(): return 1",
    error: ForbiddenPattern,
);

test_case!(
    exec_call,
    input: "def f(): return exec('1')",
    error: ForbiddenPattern,
);

test_case!(
    pattern_is_case_insensitive,
    input: "def f(): return EVAL(1)",
    error: ForbiddenPattern,
);

test_case!(
    getattr_call,
    input: "def f(): return getattr(1, 'real')",
    error: ForbiddenPattern,
);

test_case!(
    math_import_is_allowed,
    input: "import math\ndef f(): return math.sqrt(2) ** 2 > 1.99",
    output: "Result: True",
);

test_case!(
    from_math_import_is_allowed,
    input: "from math import sqrt, pi\ndef f(): return sqrt(pi) > 1",
    output: "Result: True",
);

test_case!(
    unlisted_math_member,
    input: "from math import fsum\ndef f(): return 1",
    error: DisallowedIdentifier,
);

test_case!(
    unlisted_builtin,
    input: "def f(): return len([1])",
    error: DisallowedIdentifier,
);

test_case!(
    prefix_of_parameter_name_is_not_enough,
    input: "def f(xvalue=1): return xvalue",
    error: DisallowedIdentifier,
);

test_case!(
    attribute_on_value,
    input: "def f(x=1j): return x.imag",
    error: DisallowedIdentifier,
);

test_case!(
    bare_module_name,
    input: "def f(): return math",
    error: DisallowedIdentifier,
);

test_case!(
    recursion_by_name_is_a_reference,
    input: "def fact(n=5): return 1 if n == 0 else n * fact(n - 1)",
    error: DisallowedIdentifier,
);

test_case!(
    recursion_through_parameter_name,
    input: "def x(n=5): return 1 if n == 0 else n * x(n - 1)",
    output: "Result: 120",
);

test_case!(
    nested_function_definition,
    input: "def f():\n    def g(): return 1\n    return 2",
    error: SyntaxError,
);

test_case!(
    deep_nesting,
    input: &format!("def f(): return {}1{}", "(".repeat(150), ")".repeat(150)),
    error: SyntaxError,
);

test_case!(
    required_parameter,
    input: "def f(x): return x",
    error: ExecutionFailed,
);

test_case!(
    unbounded_recursion,
    input: "def x(n=0): return x(n + 1)",
    error: ExecutionFailed,
);
