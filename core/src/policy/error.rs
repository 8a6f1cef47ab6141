use crate::api::{Diagnostic, RelatedInfo, Severity};
use crate::parser::Span;
use crate::stdlib;

/// Rejection by the policy validator.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyError {
    /// A referenced name is neither a capability nor a parameter name.
    DisallowedIdentifier { name: String, span: Span },
    /// The source has no top-level `def`.
    NoFunctionDefined,
    /// The source has more than one top-level `def`; spans of their names
    /// in source order.
    MultipleFunctionsDefined { count: usize, spans: Vec<Span> },
}

impl PolicyError {
    pub fn message(&self) -> String {
        match self {
            PolicyError::DisallowedIdentifier { name, .. } => {
                format!("name '{}' is not allowed", name)
            }
            PolicyError::NoFunctionDefined => "no function is defined".to_string(),
            PolicyError::MultipleFunctionsDefined { count, .. } => format!(
                "exactly one function must be defined, found {}",
                count
            ),
        }
    }

    pub fn span(&self) -> Option<&Span> {
        match self {
            PolicyError::DisallowedIdentifier { span, .. } => Some(span),
            PolicyError::NoFunctionDefined => None,
            PolicyError::MultipleFunctionsDefined { spans, .. } => spans.get(1),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, related, help) = match self {
            PolicyError::DisallowedIdentifier { .. } => (
                "V001",
                vec![],
                vec![
                    format!(
                        "Use one of the parameter names {} or a math function",
                        super::PARAMETER_NAMES.join(" ")
                    ),
                    format!("Available: {}", stdlib::capability_names().join(" ")),
                ],
            ),
            PolicyError::NoFunctionDefined => (
                "V002",
                vec![],
                vec!["Define a function, e.g. `def f(): return 1 + 1`".to_string()],
            ),
            PolicyError::MultipleFunctionsDefined { spans, .. } => (
                "V003",
                spans
                    .iter()
                    .take(1)
                    .map(|span| RelatedInfo {
                        span: span.clone(),
                        message: "first function defined here".to_string(),
                    })
                    .collect(),
                vec!["Merge the computation into a single function".to_string()],
            ),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.message(),
            span: self.span().cloned(),
            related,
            help,
            code: Some(code.to_string()),
        }
    }
}

impl core::fmt::Display for PolicyError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for PolicyError {}
