//! Configuration options for the mathbox engine.

use std::time::Duration;

use crate::guard::DEFAULT_MAX_SOURCE_LEN;
use crate::parser::DEFAULT_MAX_NESTING;

/// Configuration options for parsing.
///
/// # Example
///
/// ```
/// use mathbox_core::api::CompilationOptions;
///
/// let options = CompilationOptions { max_nesting: 50 };
/// ```
#[derive(Debug, Clone)]
pub struct CompilationOptions {
    /// Deepest bracket or unary-operator nesting the parser accepts.
    ///
    /// Default: 100
    pub max_nesting: usize,
}

impl Default for CompilationOptions {
    fn default() -> Self {
        Self {
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}

/// Configuration options for function execution.
///
/// These options control resource limits during evaluation.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use mathbox_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     max_steps: 10_000,
///     timeout: Some(Duration::from_millis(100)),
///     ..ExecutionOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Evaluation steps (statements, expressions, loop iterations and
    /// builtin work) allowed before the run is stopped.
    ///
    /// Default: 1_000_000
    pub max_steps: u64,

    /// Wall-clock limit, checked cooperatively. `None` disables it.
    ///
    /// Default: 2 seconds
    pub timeout: Option<Duration>,

    /// Maximum nesting of user function calls.
    ///
    /// Default: 64
    pub max_call_depth: usize,

    /// Maximum evaluation stack depth of expressions.
    ///
    /// Default: 500
    pub max_depth: usize,

    /// Widest integer, in bits, an operation may produce.
    ///
    /// Default: 100_000
    pub max_int_bits: u64,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
            timeout: Some(Duration::from_secs(2)),
            max_call_depth: 64,
            max_depth: 500,
            max_int_bits: 100_000,
        }
    }
}

/// Configuration options for the mathbox engine.
///
/// The execution options are defaults that
/// [`Engine::evaluate_with`](super::Engine::evaluate_with) can override per
/// call.
///
/// # Example
///
/// ```
/// use mathbox_core::api::{EngineOptions, CompilationOptions, ExecutionOptions};
///
/// let options = EngineOptions {
///     max_source_len: 500,
///     default_compilation_options: CompilationOptions::default(),
///     default_execution_options: ExecutionOptions {
///         max_steps: 10_000,
///         ..ExecutionOptions::default()
///     },
/// };
/// ```
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Longest source accepted, in characters.
    ///
    /// Default: 2000
    pub max_source_len: usize,

    /// Options for parsing.
    pub default_compilation_options: CompilationOptions,

    /// Default options for execution.
    pub default_execution_options: ExecutionOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_source_len: DEFAULT_MAX_SOURCE_LEN,
            default_compilation_options: CompilationOptions::default(),
            default_execution_options: ExecutionOptions::default(),
        }
    }
}
