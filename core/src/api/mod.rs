//! Public API for the mathbox sandbox.
//!
//! [`Engine`] runs the whole pipeline for one source text:
//!
//! 1. **Guard**: length and forbidden-pattern screening
//! 2. **Parse**: syntax tree in a per-invocation arena
//! 3. **Policy**: identifier whitelist and function cardinality
//! 4. **Execute**: call the function under the configured limits
//! 5. **Validate**: numeric output contract
//!
//! Every failure comes back as one [`Error`] whose [`ErrorKind`] names the
//! reason and whose [`Diagnostic`] can be rendered against the source.
//!
//! # Example
//!
//! ```
//! use mathbox_core::api::{Engine, EngineOptions};
//!
//! let engine = Engine::new(EngineOptions::default());
//! let evaluation = engine.evaluate("def f(): return sqrt(16) + sin(pi/2)").unwrap();
//! assert_eq!(evaluation.to_string(), "Result: 5.0");
//! ```

pub mod engine;
pub mod error;
pub mod options;


pub use engine::{Engine, Evaluation};
pub use error::{Diagnostic, Error, ErrorKind, RelatedInfo, Severity, Stage};
pub use options::{CompilationOptions, EngineOptions, ExecutionOptions};
