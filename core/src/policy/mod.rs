//! Identifier whitelist and function cardinality.
//!
//! The validator is the authoritative gate between parsing and execution:
//! every name a source references must be a capability or one of the
//! single-letter parameter names, and the source must define exactly one
//! top-level function.

pub mod error;
pub mod symbols;
pub mod validator;


pub use error::PolicyError;
pub use symbols::{PARAMETER_NAMES, is_allowed_name, is_parameter_name};
pub use validator::validate;
