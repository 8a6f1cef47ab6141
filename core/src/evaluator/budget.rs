//! Cooperative limits on how much work one evaluation may do.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::api::ExecutionOptions;
use crate::evaluator::{ExecutionError, ResourceExceededError};

// Clock and cancellation are polled once per this many steps.
const CHECK_INTERVAL: u64 = 1024;

/// Cloneable flag used to stop an evaluation from another thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Step counter, deadline and cancellation token for one evaluation, plus
/// the integer size limit that the numeric operations consult.
#[derive(Debug)]
pub struct Budget<'c> {
    steps: u64,
    next_check: u64,
    max_steps: u64,
    started: Instant,
    timeout: Option<Duration>,
    cancel: Option<&'c CancellationToken>,
    max_int_bits: u64,
}

impl<'c> Budget<'c> {
    pub fn new(options: &ExecutionOptions, cancel: Option<&'c CancellationToken>) -> Self {
        Self {
            steps: 0,
            next_check: 0,
            max_steps: options.max_steps,
            started: Instant::now(),
            timeout: options.timeout,
            cancel,
            max_int_bits: options.max_int_bits,
        }
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn max_int_bits(&self) -> u64 {
        self.max_int_bits
    }

    /// Account for one unit of work.
    pub fn tick(&mut self) -> Result<(), ExecutionError> {
        self.charge(1)
    }

    /// Account for `cost` units of work at once.
    pub fn charge(&mut self, cost: u64) -> Result<(), ExecutionError> {
        self.steps = self.steps.saturating_add(cost);
        if self.steps > self.max_steps {
            return Err(ResourceExceededError::StepLimit {
                max_steps: self.max_steps,
            }
            .into());
        }
        if self.steps >= self.next_check {
            self.next_check = self.steps + CHECK_INTERVAL;
            self.poll()?;
        }
        Ok(())
    }

    fn poll(&self) -> Result<(), ExecutionError> {
        if self.cancel.is_some_and(|token| token.is_cancelled()) {
            return Err(ResourceExceededError::Cancelled.into());
        }
        if let Some(timeout) = self.timeout {
            if self.started.elapsed() > timeout {
                return Err(ResourceExceededError::Deadline { timeout }.into());
            }
        }
        Ok(())
    }
}
