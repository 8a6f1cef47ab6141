//! Public error types for the mathbox API.
//!
//! Each pipeline stage has its own error type. They are wrapped, unchanged,
//! into the public [`Error`], which adds the stable [`ErrorKind`] taxonomy
//! and the [`Stage`] that rejected the source.

use core::fmt;

use crate::evaluator::ExecutionError;
use crate::guard::GuardError;
use crate::parser::{ParseError, Span};
use crate::policy::PolicyError;
use crate::result::ResultError;

/// Public error type for all mathbox operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Rejected by the textual pre-screen.
    #[error("{kind}: {0}", kind = ErrorKind::from(.0))]
    Guard(#[from] GuardError),

    /// The source does not parse.
    #[error("{kind}: {0}", kind = ErrorKind::SyntaxError)]
    Syntax(#[from] ParseError),

    /// The source references a name outside the whitelist, or does not
    /// define exactly one function.
    #[error("{kind}: {0}", kind = ErrorKind::from(.0))]
    Policy(#[from] PolicyError),

    /// The function raised, or ran out of time or steps.
    #[error("{kind}: {0}", kind = ErrorKind::from(.0))]
    Execution(#[from] ExecutionError),

    /// The function returned something other than a finite number.
    #[error("{kind}: {0}", kind = ErrorKind::from(.0))]
    Result(#[from] ResultError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Guard(e) => e.into(),
            Error::Syntax(_) => ErrorKind::SyntaxError,
            Error::Policy(e) => e.into(),
            Error::Execution(e) => e.into(),
            Error::Result(e) => e.into(),
        }
    }

    pub fn stage(&self) -> Stage {
        match self {
            Error::Guard(_) => Stage::Guard,
            Error::Syntax(_) => Stage::Parse,
            Error::Policy(_) => Stage::Policy,
            Error::Execution(_) => Stage::Execution,
            Error::Result(_) => Stage::Result,
        }
    }

    /// The source was refused before any of it ran.
    pub fn is_policy_rejection(&self) -> bool {
        self.stage() < Stage::Execution
    }

    /// The function ran and raised, or was stopped by a limit.
    pub fn is_execution_failure(&self) -> bool {
        self.stage() == Stage::Execution
    }

    pub fn span(&self) -> Option<Span> {
        self.to_diagnostic().span
    }

    /// Convert to a Diagnostic for rendering against the source.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            Error::Guard(e) => e.to_diagnostic(),
            Error::Syntax(e) => e.to_diagnostic(),
            Error::Policy(e) => e.to_diagnostic(),
            Error::Execution(e) => e.to_diagnostic(),
            Error::Result(e) => e.to_diagnostic(),
        }
    }
}

/// Stable classification of every way a source can be rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyInput,
    TooLong,
    ForbiddenPattern,
    SyntaxError,
    DisallowedIdentifier,
    NoFunctionDefined,
    MultipleFunctionsDefined,
    ExecutionFailed,
    ExecutionTimeout,
    NonNumericResult,
    InvalidNumericResult,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::EmptyInput => "EmptyInput",
            ErrorKind::TooLong => "TooLong",
            ErrorKind::ForbiddenPattern => "ForbiddenPattern",
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::DisallowedIdentifier => "DisallowedIdentifier",
            ErrorKind::NoFunctionDefined => "NoFunctionDefined",
            ErrorKind::MultipleFunctionsDefined => "MultipleFunctionsDefined",
            ErrorKind::ExecutionFailed => "ExecutionFailed",
            ErrorKind::ExecutionTimeout => "ExecutionTimeout",
            ErrorKind::NonNumericResult => "NonNumericResult",
            ErrorKind::InvalidNumericResult => "InvalidNumericResult",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&GuardError> for ErrorKind {
    fn from(e: &GuardError) -> Self {
        match e {
            GuardError::EmptyInput => ErrorKind::EmptyInput,
            GuardError::TooLong { .. } => ErrorKind::TooLong,
            GuardError::ForbiddenPattern { .. } => ErrorKind::ForbiddenPattern,
        }
    }
}

impl From<&PolicyError> for ErrorKind {
    fn from(e: &PolicyError) -> Self {
        match e {
            PolicyError::DisallowedIdentifier { .. } => ErrorKind::DisallowedIdentifier,
            PolicyError::NoFunctionDefined => ErrorKind::NoFunctionDefined,
            PolicyError::MultipleFunctionsDefined { .. } => ErrorKind::MultipleFunctionsDefined,
        }
    }
}

impl From<&ExecutionError> for ErrorKind {
    fn from(e: &ExecutionError) -> Self {
        match e {
            ExecutionError::Runtime(_) => ErrorKind::ExecutionFailed,
            ExecutionError::ResourceExceeded(_) => ErrorKind::ExecutionTimeout,
        }
    }
}

impl From<&ResultError> for ErrorKind {
    fn from(e: &ResultError) -> Self {
        match e {
            ResultError::NonNumeric { .. } => ErrorKind::NonNumericResult,
            ResultError::InvalidNumeric { .. } => ErrorKind::InvalidNumericResult,
        }
    }
}

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Guard,
    Parse,
    Policy,
    Execution,
    Result,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Guard => write!(f, "guard"),
            Stage::Parse => write!(f, "parse"),
            Stage::Policy => write!(f, "policy"),
            Stage::Execution => write!(f, "execution"),
            Stage::Result => write!(f, "result"),
        }
    }
}

/// A diagnostic message (error, warning, or info) with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// Severity level (error, warning, info).
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue, when there is one.
    pub span: Option<Span>,

    /// Related locations that provide additional context.
    pub related: Vec<RelatedInfo>,

    /// Suggestions on how to fix the issue.
    pub help: Vec<String>,

    /// Optional error code (e.g., "V001") for documentation lookup.
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Error - the source was rejected.
    Error,
    /// Warning - suspicious code that might be wrong.
    Warning,
    /// Info - informational message.
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Related information for a diagnostic (e.g., "first function defined here").
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedInfo {
    /// Source location of the related information.
    pub span: Span,

    /// Message explaining the relevance.
    pub message: String,
}
