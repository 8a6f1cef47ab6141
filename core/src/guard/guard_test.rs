use pretty_assertions::assert_eq;

use super::*;
use crate::parser::Span;

fn forbidden_name(source: &str) -> &'static str {
    match check(source, DEFAULT_MAX_SOURCE_LEN) {
        Err(GuardError::ForbiddenPattern { name, .. }) => name,
        other => panic!("expected forbidden pattern for {:?}, got {:?}", source, other),
    }
}

#[test]
fn test_accepts_plain_function() {
    assert_eq!(check("def f(): return sqrt(16) + sin(pi/2)", 2000), Ok(()));
    assert_eq!(check("import math\ndef f(): return math.pi", 2000), Ok(()));
    assert_eq!(check("from math import sqrt\ndef f(): return sqrt(2)", 2000), Ok(()));
}

#[test]
fn test_length_is_checked_before_emptiness() {
    let spaces = " ".repeat(5000);
    assert_eq!(
        check(&spaces, 2000),
        Err(GuardError::TooLong { len: 5000, max: 2000 })
    );
}

#[test]
fn test_length_counts_characters_not_bytes() {
    // 1000 two-byte characters fit in a 1000-character limit.
    let source = format!("def f(): return 1 # {}", "é".repeat(970));
    assert!(source.len() > 1000);
    assert_eq!(check(&source, 1000), Ok(()));
}

#[test]
fn test_empty_and_blank_sources() {
    assert_eq!(check("", 2000), Err(GuardError::EmptyInput));
    assert_eq!(check("  \n\t \n", 2000), Err(GuardError::EmptyInput));
}

#[test]
fn test_import_of_other_modules() {
    assert_eq!(forbidden_name("def f(): import os"), "import");
    assert_eq!(forbidden_name("from os import path"), "import");
    assert_eq!(forbidden_name("from os.path import join"), "import");
    assert_eq!(forbidden_name("IMPORT sys"), "import");
}

#[test]
fn test_call_patterns() {
    assert_eq!(forbidden_name("def f(): return eval('1')"), "eval");
    assert_eq!(forbidden_name("def f(): return exec ('1')"), "exec");
    assert_eq!(forbidden_name("def f(): return open('x')"), "open");
    assert_eq!(forbidden_name("def f(): print(1)"), "print");
    assert_eq!(forbidden_name("def f(): return Globals()"), "globals");
    assert_eq!(forbidden_name("def f(): return getattr(x, 'y')"), "getattr");
    assert_eq!(forbidden_name("def f(): return dir()"), "dir");
}

#[test]
fn test_module_and_dunder_patterns() {
    assert_eq!(forbidden_name("def f(): return x.__class__"), "dunder");
    assert_eq!(forbidden_name("def f(): return os.getcwd"), "os");
    assert_eq!(forbidden_name("def f(): return sys.maxsize"), "sys");
    assert_eq!(forbidden_name("def f(): subprocess"), "subprocess");
}

#[test]
fn test_cos_is_not_os() {
    assert_eq!(check("def f(): return math.cos(0)", 2000), Ok(()));
}

#[test]
fn test_match_reports_span() {
    let source = "def f(): return eval(1)";
    match check(source, 2000) {
        Err(GuardError::ForbiddenPattern { span, .. }) => {
            assert_eq!(span, Span::new(16, 21));
            assert_eq!(span.str_of(source), "eval(");
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_diagnostic_codes() {
    assert_eq!(GuardError::EmptyInput.to_diagnostic().code.as_deref(), Some("G001"));
    assert_eq!(
        GuardError::TooLong { len: 3, max: 2 }.to_diagnostic().code.as_deref(),
        Some("G002")
    );
    let err = check("def f(): return eval(1)", 2000).unwrap_err();
    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.code.as_deref(), Some("G003"));
    assert!(diagnostic.span.is_some());
}
