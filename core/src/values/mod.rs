mod display;
mod value;

pub use display::{format_complex, format_float};
pub use value::{Closure, NumericRank, Value, f64_to_int, int_to_f64};

#[cfg(test)]
mod value_test;
