//! Core of the mathbox sandbox.
//!
//! A source text defining exactly one niladic numeric function flows through
//! five stages, each of which can reject it:
//!
//! 1. [`guard`]: length and forbidden-pattern screening, before any parsing.
//! 2. [`parser`]: pest grammar for a small indentation-sensitive language.
//! 3. [`policy`]: identifier whitelist and function cardinality.
//! 4. [`evaluator`]: tree-walking execution against the [`stdlib`] capability
//!    table, under a step budget and a deadline.
//! 5. [`result`]: numeric output contract and canonical rendering.
//!
//! [`api::Engine`] wires the stages together.

pub mod api;
pub mod evaluator;
pub mod guard;
pub mod parser;
pub mod policy;
pub mod result;
pub mod stdlib;
pub mod values;

pub use api::{
    CompilationOptions, Diagnostic, Engine, EngineOptions, Error, ErrorKind, Evaluation,
    ExecutionOptions, Severity, Stage,
};
pub use evaluator::CancellationToken;
pub use result::NumericResult;

/// Test utilities for enabling logging in tests
#[cfg(test)]
pub mod test_utils {
    /// Initialize tracing subscriber for tests with DEBUG level
    /// Call this at the start of tests where you want to see logging output
    pub fn init_test_logging() {
        use tracing_subscriber::{EnvFilter, fmt};

        // Try to initialize, ignore error if already initialized
        let _ = fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_test_writer()
            .try_init();
    }
}
