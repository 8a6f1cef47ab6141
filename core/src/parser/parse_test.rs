use bumpalo::Bump;
use indoc::indoc;
use pretty_assertions::assert_eq;

use super::*;

// Fully parenthesized rendering of an expression, so precedence can be
// compared independently of spans.
fn sexpr(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Literal(lit) => match lit {
            Literal::Int(n) => n.to_string(),
            Literal::BigInt { digits, radix } => format!("{}r{}", digits, radix),
            Literal::Float(f) => format!("{:?}", f),
            Literal::Imaginary(f) => format!("{:?}j", f),
            Literal::Bool(b) => b.to_string(),
            Literal::None => "None".to_string(),
        },
        ExprKind::Name(name) => name.to_string(),
        ExprKind::Attribute { value, attr } => format!("{}.{}", sexpr(value), attr.name),
        ExprKind::Call { func, args } => {
            let args: Vec<String> = args.iter().map(|a| sexpr(a)).collect();
            format!("{}({})", sexpr(func), args.join(", "))
        }
        ExprKind::Unary { op, operand } => {
            let op = match op {
                UnaryOp::Neg => "-",
                UnaryOp::Pos => "+",
                UnaryOp::Invert => "~",
                UnaryOp::Not => "not ",
            };
            format!("({}{})", op, sexpr(operand))
        }
        ExprKind::Binary { op, left, right } => {
            let op = match op {
                BinaryOp::Pow => "**",
                other => other.symbol(),
            };
            format!("({} {} {})", sexpr(left), op, sexpr(right))
        }
        ExprKind::Boolean { op, left, right } => {
            let op = match op {
                BoolOp::And => "and",
                BoolOp::Or => "or",
            };
            format!("({} {} {})", sexpr(left), op, sexpr(right))
        }
        ExprKind::Comparison { left, links } => {
            let mut out = format!("({}", sexpr(left));
            for (op, operand) in links.iter() {
                out.push_str(&format!(" {} {}", op.symbol(), sexpr(operand)));
            }
            out.push(')');
            out
        }
        ExprKind::IfElse {
            cond,
            then_branch,
            else_branch,
        } => format!(
            "({} if {} else {})",
            sexpr(then_branch),
            sexpr(cond),
            sexpr(else_branch)
        ),
        ExprKind::Tuple(items) => {
            let items: Vec<String> = items.iter().map(|i| sexpr(i)).collect();
            format!("tuple[{}]", items.join(", "))
        }
        ExprKind::List(items) => {
            let items: Vec<String> = items.iter().map(|i| sexpr(i)).collect();
            format!("list[{}]", items.join(", "))
        }
    }
}

// Parses `def f(): return <expr>` and renders the returned expression.
fn expr(source: &str) -> String {
    let arena = Bump::new();
    let wrapped = format!("def f(): return {}", source);
    let module = parse(&arena, &wrapped)
        .unwrap_or_else(|e| panic!("Expression parsing failed: {}\n{}", source, e));
    let def = module.functions().next().expect("one function");
    match &def.body[0].kind {
        StmtKind::Return(Some(value)) => sexpr(value),
        other => panic!("expected return, got {:?}", other),
    }
}

fn parse_err(source: &str) -> ParseError {
    let arena = Bump::new();
    match parse(&arena, source) {
        Ok(module) => panic!("expected parse error for {:?}, got {:?}", source, module),
        Err(e) => e,
    }
}

#[test]
fn test_arithmetic_precedence() {
    assert_eq!(expr("a + b * c"), "(a + (b * c))");
    assert_eq!(expr("a * b + c"), "((a * b) + c)");
    assert_eq!(expr("a - b - c"), "((a - b) - c)");
    assert_eq!(expr("a / b // c % d"), "(((a / b) // c) % d)");
}

#[test]
fn test_power_is_right_associative_and_binds_tighter_than_unary() {
    assert_eq!(expr("a ** b ** c"), "(a ** (b ** c))");
    assert_eq!(expr("-a ** 2"), "(-(a ** 2))");
    assert_eq!(expr("2 ** -1"), "(2 ** (-1))");
    assert_eq!(expr("--a"), "(-(-a))");
    assert_eq!(expr("a + -b"), "(a + (-b))");
}

#[test]
fn test_postfix_binds_tightest() {
    assert_eq!(expr("math.sqrt(x) ** 2"), "(math.sqrt(x) ** 2)");
    assert_eq!(expr("-f(1, 2)"), "(-f(1, 2))");
    assert_eq!(expr("f()"), "f()");
}

#[test]
fn test_boolean_and_comparison() {
    assert_eq!(expr("a or b and c"), "(a or (b and c))");
    assert_eq!(expr("not a == b"), "(not (a == b))");
    assert_eq!(expr("a < b <= c"), "(a < b <= c)");
    assert_eq!(expr("x if x > 0 else -x"), "(x if (x > 0) else (-x))");
}

#[test]
fn test_grouping_and_tuples() {
    assert_eq!(expr("(a + b) * c"), "((a + b) * c)");
    assert_eq!(expr("(a,)"), "tuple[a]");
    assert_eq!(expr("()"), "tuple[]");
    assert_eq!(expr("(1, 2, 3)"), "tuple[1, 2, 3]");
    assert_eq!(expr("[1, 2,]"), "list[1, 2]");
}

#[test]
fn test_number_literals() {
    assert_eq!(expr("1_000"), "1000");
    assert_eq!(expr("0x1F"), "31");
    assert_eq!(expr("0o17"), "15");
    assert_eq!(expr("0b101"), "5");
    assert_eq!(expr("1.5e3"), "1500.0");
    assert_eq!(expr(".5"), "0.5");
    assert_eq!(expr("2j"), "2.0j");
    assert_eq!(expr("True"), "true");
    assert_eq!(expr("None"), "None");
    assert_eq!(
        expr("123456789012345678901234567890"),
        "123456789012345678901234567890r10"
    );
}

#[test]
fn test_invalid_number_literals() {
    let err = parse_err("def f(): return 012");
    assert!(matches!(err.kind, ParseErrorKind::InvalidNumber { .. }));

    let err = parse_err("def f(): return 0b2");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
}

#[test]
fn test_function_with_block_body() {
    let arena = Bump::new();
    let source = indoc! {"
        import math

        def f(x=2, y=3):
            # comment
            total = 0
            for n in range(3):
                if n == 1:
                    continue
                elif n > 5:
                    break
                else:
                    total += n
            while total < 10: total = total * 2
            return math.sqrt(total) + x ** y
    "};
    let module = parse(&arena, source).unwrap();
    assert_eq!(module.body.len(), 2);
    assert!(matches!(module.body[0].kind, StmtKind::Import { .. }));

    let def = module.functions().next().unwrap();
    assert_eq!(def.name.name, "f");
    assert_eq!(def.params.len(), 2);
    assert_eq!(def.params[0].name.name, "x");
    assert!(def.params[1].default.is_some());
    assert_eq!(def.body.len(), 4);
    assert!(matches!(def.body[1].kind, StmtKind::For { .. }));
    assert!(matches!(def.body[2].kind, StmtKind::While { .. }));

    match &def.body[1].kind {
        StmtKind::For { body, .. } => match &body[0].kind {
            StmtKind::If { branches, orelse } => {
                assert_eq!(branches.len(), 2);
                assert_eq!(orelse.len(), 1);
                assert!(matches!(
                    orelse[0].kind,
                    StmtKind::AugAssign {
                        op: BinaryOp::Add,
                        ..
                    }
                ));
            }
            other => panic!("expected if, got {:?}", other),
        },
        other => panic!("expected for, got {:?}", other),
    }
}

#[test]
fn test_simple_statements_on_one_line() {
    let arena = Bump::new();
    let module = parse(&arena, "def f(): a = 1; b = 2; return a + b").unwrap();
    let def = module.functions().next().unwrap();
    assert_eq!(def.body.len(), 3);
}

#[test]
fn test_from_import() {
    let arena = Bump::new();
    let module = parse(&arena, "from math import sqrt, pi\ndef f(): return sqrt(pi)").unwrap();
    match &module.body[0].kind {
        StmtKind::ImportFrom { module, names } => {
            assert_eq!(module.name, "math");
            let names: Vec<&str> = names.iter().map(|n| n.name).collect();
            assert_eq!(names, vec!["sqrt", "pi"]);
        }
        other => panic!("expected from-import, got {:?}", other),
    }
}

#[test]
fn test_line_continuation() {
    assert_eq!(expr("1 + \\\n 2"), "(1 + 2)");
}

#[test]
fn test_spans_point_into_source() {
    let arena = Bump::new();
    let source = "def f(): return value";
    let module = parse(&arena, source).unwrap();
    let def = module.functions().next().unwrap();
    assert_eq!(def.name.span.str_of(source), "f");
    match &def.body[0].kind {
        StmtKind::Return(Some(value)) => assert_eq!(value.span.str_of(source), "value"),
        other => panic!("expected return, got {:?}", other),
    }
}

#[test]
fn test_misplaced_statements() {
    let err = parse_err("return 1");
    assert!(matches!(
        err.kind,
        ParseErrorKind::Misplaced { what: "return", .. }
    ));

    let err = parse_err("def f():\n    break");
    assert!(matches!(err.kind, ParseErrorKind::Misplaced { what: "break", .. }));

    let err = parse_err("def f():\n    def g(): return 1\n    return g()");
    assert!(matches!(err.kind, ParseErrorKind::Misplaced { what: "def", .. }));
}

#[test]
fn test_indentation_errors() {
    let err = parse_err("def f():\nreturn 1");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));

    let err = parse_err("def f():\n    x = 1\n      return x");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));

    let err = parse_err("  x = 1");
    assert!(matches!(err.kind, ParseErrorKind::UnexpectedToken { .. }));
}

#[test]
fn test_syntax_errors() {
    for source in ["def f(:", "def f(): return (1 +", "def f() return 1", "x = = 1"] {
        let arena = Bump::new();
        assert!(parse(&arena, source).is_err(), "{:?} should not parse", source);
    }
}

#[test]
fn test_max_nesting_depth() {
    let arena = Bump::new();
    let deep = format!("def f(): return {}1{}", "(".repeat(50), ")".repeat(50));
    assert!(parse(&arena, &deep).is_ok());

    let err = parse_with_max_depth(&arena, &deep, 10).unwrap_err();
    assert!(matches!(
        err.kind,
        ParseErrorKind::MaxDepthExceeded { max_depth: 10, .. }
    ));

    let unary = format!("def f(): return {}1", "-".repeat(200));
    let err = parse(&arena, &unary).unwrap_err();
    assert!(matches!(err.kind, ParseErrorKind::MaxDepthExceeded { .. }));
}

#[test]
fn test_comments_do_not_count_toward_nesting() {
    let arena = Bump::new();
    let source = format!("# {}\ndef f(): return 1", "(".repeat(500));
    assert!(parse(&arena, &source).is_ok());
}

#[test]
fn test_empty_module_parses() {
    let arena = Bump::new();
    let module = parse(&arena, "\n# only a comment\n").unwrap();
    assert_eq!(module.body.len(), 0);
    assert_eq!(module.functions().count(), 0);
}
