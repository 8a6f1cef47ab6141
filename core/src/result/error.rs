use crate::api::{Diagnostic, Severity};
use crate::values::format_float;

/// Violation of the output contract.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultError {
    /// The function returned something other than a number.
    NonNumeric { type_name: &'static str },
    /// The function returned NaN or an infinity.
    InvalidNumeric { value: f64 },
}

impl ResultError {
    pub fn message(&self) -> String {
        match self {
            ResultError::NonNumeric { type_name } => format!(
                "function must return a number, got a value of type '{}'",
                type_name
            ),
            ResultError::InvalidNumeric { value } => {
                format!("function returned {}, which is not a finite number", format_float(*value))
            }
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match self {
            ResultError::NonNumeric { .. } => (
                "R001",
                vec!["Return an int, float or complex value".to_string()],
            ),
            ResultError::InvalidNumeric { .. } => ("R002", vec![]),
        };
        Diagnostic {
            severity: Severity::Error,
            message: self.message(),
            span: None,
            related: vec![],
            help,
            code: Some(code.to_string()),
        }
    }
}

impl core::fmt::Display for ResultError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ResultError {}
