//! The two disjoint name sets a source may draw from.

use crate::stdlib;

/// Names usable for parameters and local variables, matched exactly.
pub const PARAMETER_NAMES: [&str; 8] = ["a", "b", "c", "n", "t", "x", "y", "z"];

pub fn is_parameter_name(name: &str) -> bool {
    PARAMETER_NAMES.contains(&name)
}

/// A capability or a parameter name.
pub fn is_allowed_name(name: &str) -> bool {
    stdlib::lookup(name).is_some() || is_parameter_name(name)
}
