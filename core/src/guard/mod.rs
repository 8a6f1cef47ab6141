//! Textual pre-screen run before any parsing.
//!
//! The guard is deliberately coarse: it works on the raw characters and
//! rejects sources that mention obviously dangerous constructs, so that the
//! parser and the policy validator only ever see plausible function
//! definitions.

mod error;
mod patterns;

pub use error::GuardError;
pub use patterns::{FORBIDDEN_PATTERNS, ForbiddenPattern};

/// Default maximum source length, in characters.
pub const DEFAULT_MAX_SOURCE_LEN: usize = 2000;

/// Checks length, emptiness and forbidden patterns, in that order.
pub fn check(source: &str, max_len: usize) -> Result<(), GuardError> {
    let len = source.chars().count();
    if len > max_len {
        return Err(GuardError::TooLong { len, max: max_len });
    }

    if source.trim().is_empty() {
        return Err(GuardError::EmptyInput);
    }

    for pattern in FORBIDDEN_PATTERNS.iter() {
        if let Some(span) = pattern.find(source) {
            tracing::debug!(pattern = pattern.name, ?span, "forbidden pattern");
            return Err(GuardError::ForbiddenPattern {
                name: pattern.name,
                pattern: pattern.pattern().to_string(),
                description: pattern.description,
                span,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod guard_test;
