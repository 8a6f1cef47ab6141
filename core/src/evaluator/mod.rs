//! Tree-walking evaluator for validated function sources.
//!
//! The evaluator runs the module's top-level statements, then calls the one
//! defined function with no arguments and returns whatever it produced.
//! Validation of that value is left to [`crate::result`].
//!
//! ## Design Principles
//!
//! - **Never panic**: All adversarial inputs must be handled gracefully
//! - **Stack-safe**: Depth tracking prevents stack overflow from deeply nested
//!   expressions and runaway recursion
//! - **Bounded**: Every statement and expression is charged to a [`Budget`]
//!   that enforces the step limit, the deadline and cancellation
//! - **Closed world**: Names resolve to locals, module globals or the
//!   capability table, and nothing else
//!
//! ## Example
//!
//! ```ignore
//! use bumpalo::Bump;
//! use mathbox_core::{parser, evaluator, ExecutionOptions};
//!
//! let arena = Bump::new();
//! let module = parser::parse(&arena, "def f(): return 1 + 2").unwrap();
//! let value = evaluator::execute(&module, &ExecutionOptions::default(), None).unwrap();
//! assert_eq!(value.to_string(), "3");
//! ```

mod budget;
mod error;
mod eval;
pub(crate) mod operators;


pub use budget::{Budget, CancellationToken};
pub use error::{ExceptionKind, ExecutionError, ResourceExceededError, RuntimeError};

use crate::api::ExecutionOptions;
use crate::parser::ParsedModule;
use crate::values::Value;

/// Run a parsed module and call its function.
///
/// ## Arguments
///
/// - `module`: Parsed (and normally policy-checked) source
/// - `options`: Step, time, depth and integer size limits
/// - `cancel`: Optional token another thread may use to stop evaluation
///
/// ## Returns
///
/// The value returned by the function, or the exception or limit that
/// stopped it.
pub fn execute<'a>(
    module: &ParsedModule<'a>,
    options: &ExecutionOptions,
    cancel: Option<&CancellationToken>,
) -> Result<Value<'a>, ExecutionError> {
    eval::Evaluator::new(options, cancel).run(module)
}
