use crate::api::{Diagnostic, Severity};
use crate::parser::Span;

/// Rejection by the textual pre-screen.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardError {
    /// Source is longer than the configured maximum (in characters).
    TooLong { len: usize, max: usize },
    /// Source is empty after trimming.
    EmptyInput,
    /// Source contains a forbidden construct.
    ForbiddenPattern {
        name: &'static str,
        pattern: String,
        description: &'static str,
        span: Span,
    },
}

impl GuardError {
    pub fn message(&self) -> String {
        match self {
            GuardError::TooLong { len, max } => format!(
                "function source is too long ({} characters, maximum is {})",
                len, max
            ),
            GuardError::EmptyInput => "function source is empty".to_string(),
            GuardError::ForbiddenPattern { description, .. } => {
                format!("forbidden construct: {}", description)
            }
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, span, help) = match self {
            GuardError::EmptyInput => (
                "G001",
                None,
                vec!["Define a function, e.g. `def f(): return 1 + 1`".to_string()],
            ),
            GuardError::TooLong { .. } => ("G002", None, vec![]),
            GuardError::ForbiddenPattern { pattern, span, .. } => (
                "G003",
                Some(span.clone()),
                vec![format!("matched pattern `{}`", pattern)],
            ),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.message(),
            span,
            related: vec![],
            help,
            code: Some(code.to_string()),
        }
    }
}

impl core::fmt::Display for GuardError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for GuardError {}
