//! mathbox - a sandbox for one untrusted numeric function
//!
//! # Overview
//!
//! mathbox accepts a short source text defining exactly one function with
//! no required arguments, vets it, runs it with access to nothing but a fixed
//! table of numeric operations, and returns its numeric result or a precise
//! rejection reason. Typical callers are agents and tools that let a model or
//! a user write small closed-form computations.
//!
//! # Quick Start
//!
//! ```
//! use mathbox::execute_math_function;
//!
//! let output = execute_math_function("def f(): return sqrt(16) + sin(pi/2)").unwrap();
//! assert_eq!(output, "Result: 5.0");
//! ```
//!
//! # Limits
//!
//! Use an [`Engine`] directly to change the length, nesting, step, time or
//! integer size limits, or to pass a [`CancellationToken`]:
//!
//! ```
//! use std::time::Duration;
//! use mathbox::{Engine, EngineOptions, ErrorKind, ExecutionOptions};
//!
//! let engine = Engine::new(EngineOptions::default());
//! let options = ExecutionOptions {
//!     timeout: Some(Duration::from_millis(50)),
//!     ..ExecutionOptions::default()
//! };
//! let error = engine
//!     .evaluate_with("def f():\n    while True: pass", &options, None)
//!     .unwrap_err();
//! assert_eq!(error.kind(), ErrorKind::ExecutionTimeout);
//! ```

use once_cell::sync::Lazy;

mod error_renderer;

// Re-export public API from mathbox_core
pub use mathbox_core::api::{
    CompilationOptions, Diagnostic, Engine, EngineOptions, Error, ErrorKind, Evaluation,
    ExecutionOptions, RelatedInfo, Severity, Stage,
};
pub use mathbox_core::evaluator::CancellationToken;
pub use mathbox_core::result::NumericResult;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};

static DEFAULT_ENGINE: Lazy<Engine> = Lazy::new(|| Engine::new(EngineOptions::default()));

/// Evaluate a function source with the default limits and return its
/// canonical `Result: <value>` text.
///
/// # Example
///
/// ```
/// use mathbox::{ErrorKind, execute_math_function};
///
/// assert_eq!(execute_math_function("def f(): return pow(2,10)").unwrap(), "Result: 1024");
///
/// let error = execute_math_function("").unwrap_err();
/// assert_eq!(error.kind(), ErrorKind::EmptyInput);
/// ```
pub fn execute_math_function(source: &str) -> Result<String, Error> {
    DEFAULT_ENGINE
        .evaluate(source)
        .map(|evaluation| evaluation.to_string())
}
