//! The mathbox evaluation engine.

use core::fmt;
use std::{panic, thread};

use bumpalo::Bump;
use tracing::{debug, trace, warn};

use super::{EngineOptions, Error, ExecutionOptions};
use crate::evaluator::{self, CancellationToken};
use crate::result::{self, NumericResult};
use crate::{guard, parser, policy};

// Parsing and evaluation recurse over the source's structure. They run on a
// thread of their own whose stack covers the nesting and depth limits,
// whatever stack the caller has.
const EVALUATION_STACK_SIZE: usize = 32 * 1024 * 1024;

/// Runs untrusted function sources through the sandbox pipeline.
///
/// The engine holds only configuration. Each call allocates its own arena
/// for the syntax tree and drops it before returning, so one engine can be
/// shared freely across threads.
///
/// # Example
///
/// ```
/// use mathbox_core::api::{Engine, EngineOptions, ErrorKind};
///
/// let engine = Engine::new(EngineOptions::default());
///
/// let evaluation = engine.evaluate("def f(): return pow(2, 10)").unwrap();
/// assert_eq!(evaluation.to_string(), "Result: 1024");
///
/// let error = engine.evaluate("def f(): import os").unwrap_err();
/// assert_eq!(error.kind(), ErrorKind::ForbiddenPattern);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: EngineOptions,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Access the engine options.
    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Evaluate a source with the engine's default execution options.
    pub fn evaluate(&self, source: &str) -> Result<Evaluation, Error> {
        self.evaluate_with(source, &self.options.default_execution_options, None)
    }

    /// Evaluate a source with explicit execution options and an optional
    /// cancellation token.
    ///
    /// # Parameters
    ///
    /// - `source`: Text defining exactly one function
    /// - `execution`: Limits for this call
    /// - `cancel`: Token another thread may use to stop the run
    ///
    /// # Returns
    ///
    /// The validated result, or the first stage's rejection.
    pub fn evaluate_with(
        &self,
        source: &str,
        execution: &ExecutionOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<Evaluation, Error> {
        on_evaluation_stack(|| self.run(source, execution, cancel)).inspect_err(|e| {
            debug!(kind = %e.kind(), stage = %e.stage(), "Evaluation rejected");
        })
    }

    fn run(
        &self,
        source: &str,
        execution: &ExecutionOptions,
        cancel: Option<&CancellationToken>,
    ) -> Result<Evaluation, Error> {
        guard::check(source, self.options.max_source_len)?;
        trace!("Guard passed");

        let arena = Bump::new();
        let module = parser::parse_with_max_depth(
            &arena,
            source,
            self.options.default_compilation_options.max_nesting,
        )?;
        trace!(statements = module.body.len(), "Parsed");

        policy::validate(&module)?;
        trace!("Policy passed");

        let value = evaluator::execute(&module, execution, cancel)?;
        let result = result::validate(value)?;
        debug!(result = %result, "Evaluation succeeded");

        Ok(Evaluation { result })
    }

    /// Guard and parse a source, returning its syntax tree in debug form.
    pub fn syntax_tree(&self, source: &str) -> Result<String, Error> {
        on_evaluation_stack(|| -> Result<String, Error> {
            guard::check(source, self.options.max_source_len)?;
            let arena = Bump::new();
            let module = parser::parse_with_max_depth(
                &arena,
                source,
                self.options.default_compilation_options.max_nesting,
            )?;
            Ok(format!("{:#?}", module.body))
        })
    }
}

/// Run `task` on a fresh thread with `EVALUATION_STACK_SIZE` bytes of stack
/// and wait for it. A panic in the task is resumed on the caller.
fn on_evaluation_stack<T, F>(task: F) -> T
where
    T: Send,
    F: Fn() -> T + Sync,
{
    thread::scope(|scope| {
        let spawned = thread::Builder::new()
            .name("mathbox-eval".to_string())
            .stack_size(EVALUATION_STACK_SIZE)
            .spawn_scoped(scope, || task());
        match spawned {
            Ok(handle) => handle
                .join()
                .unwrap_or_else(|payload| panic::resume_unwind(payload)),
            Err(e) => {
                warn!(error = %e, "Could not spawn evaluation thread, running inline");
                task()
            }
        }
    })
}

/// A successful evaluation. Displays as `Result: <value>`.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    result: NumericResult,
}

impl Evaluation {
    pub fn result(&self) -> &NumericResult {
        &self.result
    }

    pub fn into_result(self) -> NumericResult {
        self.result
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Result: {}", self.result)
    }
}
