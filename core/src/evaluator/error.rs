//! Runtime evaluation errors.
//!
//! # Error Categories
//!
//! - **Runtime errors**: exceptions raised by the evaluated function itself,
//!   named after the source language's exception classes (`ValueError`,
//!   `ZeroDivisionError`, ...). Recursion limits are reported this way too.
//!
//! - **Resource exceeded errors**: the step budget, the wall-clock deadline
//!   or a cancellation request stopped evaluation.

use core::fmt;
use std::time::Duration;

use crate::api::{Diagnostic, Severity};
use crate::parser::Span;

/// Runtime evaluation error.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionError {
    /// An exception raised while running the function.
    Runtime(RuntimeError),

    /// Evaluation was stopped from outside the program.
    ResourceExceeded(ResourceExceededError),
}

/// Exception classes the evaluator can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionKind {
    TypeError,
    ValueError,
    ZeroDivisionError,
    OverflowError,
    MemoryError,
    NameError,
    UnboundLocalError,
    AttributeError,
    ImportError,
    RecursionError,
}

impl ExceptionKind {
    pub fn name(self) -> &'static str {
        match self {
            ExceptionKind::TypeError => "TypeError",
            ExceptionKind::ValueError => "ValueError",
            ExceptionKind::ZeroDivisionError => "ZeroDivisionError",
            ExceptionKind::OverflowError => "OverflowError",
            ExceptionKind::MemoryError => "MemoryError",
            ExceptionKind::NameError => "NameError",
            ExceptionKind::UnboundLocalError => "UnboundLocalError",
            ExceptionKind::AttributeError => "AttributeError",
            ExceptionKind::ImportError => "ImportError",
            ExceptionKind::RecursionError => "RecursionError",
        }
    }
}

/// An exception with its message and, once known, the span of the
/// expression that raised it.
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeError {
    pub kind: ExceptionKind,
    pub message: String,
    pub span: Option<Span>,
}

impl RuntimeError {
    pub fn new(kind: ExceptionKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span: None,
        }
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::TypeError, message)
    }

    pub fn value_error(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::ValueError, message)
    }

    pub fn zero_division(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::ZeroDivisionError, message)
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        Self::new(ExceptionKind::OverflowError, message)
    }

    pub fn math_domain() -> Self {
        Self::value_error("math domain error")
    }

    pub fn math_range() -> Self {
        Self::overflow("math range error")
    }

    /// Attach a span unless a more precise one is already set.
    pub fn at(mut self, span: &Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span.clone());
        }
        self
    }
}

/// Limits that stop evaluation regardless of what the program does.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceExceededError {
    /// More evaluation steps than the budget allows.
    StepLimit { max_steps: u64 },
    /// The wall-clock deadline passed.
    Deadline { timeout: Duration },
    /// The caller cancelled the evaluation.
    Cancelled,
}

impl ExecutionError {
    pub fn span(&self) -> Option<&Span> {
        match self {
            ExecutionError::Runtime(e) => e.span.as_ref(),
            ExecutionError::ResourceExceeded(_) => None,
        }
    }

    pub fn at(self, span: &Span) -> Self {
        match self {
            ExecutionError::Runtime(e) => ExecutionError::Runtime(e.at(span)),
            other => other,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match self {
            ExecutionError::Runtime(e) if e.kind == ExceptionKind::RecursionError => (
                "E001",
                vec!["Reduce recursion or expression nesting".to_string()],
            ),
            ExecutionError::Runtime(_) => ("E001", vec![]),
            ExecutionError::ResourceExceeded(_) => (
                "E002",
                vec!["Simplify the computation or raise the execution limits".to_string()],
            ),
        };
        Diagnostic {
            severity: Severity::Error,
            message: self.to_string(),
            span: self.span().cloned(),
            related: vec![],
            help,
            code: Some(code.to_string()),
        }
    }
}

impl fmt::Display for ExecutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutionError::Runtime(e) => write!(f, "{}", e),
            ExecutionError::ResourceExceeded(e) => write!(f, "{}", e),
        }
    }
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

impl fmt::Display for ResourceExceededError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceExceededError::StepLimit { max_steps } => {
                write!(f, "evaluation exceeded the budget of {} steps", max_steps)
            }
            ResourceExceededError::Deadline { timeout } => {
                write!(f, "evaluation exceeded the time limit of {:?}", timeout)
            }
            ResourceExceededError::Cancelled => write!(f, "evaluation was cancelled"),
        }
    }
}

impl From<RuntimeError> for ExecutionError {
    fn from(e: RuntimeError) -> Self {
        ExecutionError::Runtime(e)
    }
}

impl From<ResourceExceededError> for ExecutionError {
    fn from(e: ResourceExceededError) -> Self {
        ExecutionError::ResourceExceeded(e)
    }
}

impl std::error::Error for ExecutionError {}

impl std::error::Error for RuntimeError {}

impl std::error::Error for ResourceExceededError {}
