//! Capability table: the only names a function may use besides its own
//! parameters and locals.
//!
//! The table is built once and never mutated. It holds two constants and
//! the numeric functions below; there is no import machinery, no I/O and
//! no reflection.
//!
//! - Constants: `pi`, `e`
//! - Builtins: `abs round min max sum pow int float complex`
//! - Math: `sin cos tan asin acos atan atan2 sinh cosh tanh sqrt exp log
//!   log10 log2 ceil floor degrees radians factorial`

use hashbrown::HashMap;
use lazy_static::lazy_static;

use crate::evaluator::{Budget, ExecutionError, RuntimeError};
use crate::values::Value;

pub mod builtins;
pub mod math;

/// The one module sources may import from, or name in `math.<member>`.
pub const MODULE_NAME: &str = "math";

#[cfg(test)]
mod math_test;

/// A native function exposed to evaluated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Builtin {
    Abs,
    Round,
    Min,
    Max,
    Sum,
    Pow,
    Int,
    Float,
    Complex,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Sqrt,
    Exp,
    Log,
    Log10,
    Log2,
    Ceil,
    Floor,
    Degrees,
    Radians,
    Factorial,
}

impl Builtin {
    pub const ALL: [Builtin; 29] = [
        Builtin::Abs,
        Builtin::Round,
        Builtin::Min,
        Builtin::Max,
        Builtin::Sum,
        Builtin::Pow,
        Builtin::Int,
        Builtin::Float,
        Builtin::Complex,
        Builtin::Sin,
        Builtin::Cos,
        Builtin::Tan,
        Builtin::Asin,
        Builtin::Acos,
        Builtin::Atan,
        Builtin::Atan2,
        Builtin::Sinh,
        Builtin::Cosh,
        Builtin::Tanh,
        Builtin::Sqrt,
        Builtin::Exp,
        Builtin::Log,
        Builtin::Log10,
        Builtin::Log2,
        Builtin::Ceil,
        Builtin::Floor,
        Builtin::Degrees,
        Builtin::Radians,
        Builtin::Factorial,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Abs => "abs",
            Builtin::Round => "round",
            Builtin::Min => "min",
            Builtin::Max => "max",
            Builtin::Sum => "sum",
            Builtin::Pow => "pow",
            Builtin::Int => "int",
            Builtin::Float => "float",
            Builtin::Complex => "complex",
            Builtin::Sin => "sin",
            Builtin::Cos => "cos",
            Builtin::Tan => "tan",
            Builtin::Asin => "asin",
            Builtin::Acos => "acos",
            Builtin::Atan => "atan",
            Builtin::Atan2 => "atan2",
            Builtin::Sinh => "sinh",
            Builtin::Cosh => "cosh",
            Builtin::Tanh => "tanh",
            Builtin::Sqrt => "sqrt",
            Builtin::Exp => "exp",
            Builtin::Log => "log",
            Builtin::Log10 => "log10",
            Builtin::Log2 => "log2",
            Builtin::Ceil => "ceil",
            Builtin::Floor => "floor",
            Builtin::Degrees => "degrees",
            Builtin::Radians => "radians",
            Builtin::Factorial => "factorial",
        }
    }

    /// Invoke the builtin with positional arguments.
    pub fn call<'a>(
        self,
        args: &[Value<'a>],
        budget: &mut Budget<'_>,
    ) -> Result<Value<'a>, ExecutionError> {
        match self {
            Builtin::Abs => Ok(builtins::abs(args)?),
            Builtin::Round => Ok(builtins::round(args)?),
            Builtin::Min => builtins::min(args, budget),
            Builtin::Max => builtins::max(args, budget),
            Builtin::Sum => builtins::sum(args, budget),
            Builtin::Pow => builtins::pow(args, budget),
            Builtin::Int => Ok(builtins::int(args)?),
            Builtin::Float => Ok(builtins::float(args)?),
            Builtin::Complex => Ok(builtins::complex(args)?),
            Builtin::Sin => Ok(math::unary(self, args, f64::sin)?),
            Builtin::Cos => Ok(math::unary(self, args, f64::cos)?),
            Builtin::Tan => Ok(math::unary(self, args, f64::tan)?),
            Builtin::Asin => Ok(math::unary(self, args, f64::asin)?),
            Builtin::Acos => Ok(math::unary(self, args, f64::acos)?),
            Builtin::Atan => Ok(math::unary(self, args, f64::atan)?),
            Builtin::Atan2 => Ok(math::atan2(args)?),
            Builtin::Sinh => Ok(math::unary(self, args, f64::sinh)?),
            Builtin::Cosh => Ok(math::unary(self, args, f64::cosh)?),
            Builtin::Tanh => Ok(math::unary(self, args, f64::tanh)?),
            Builtin::Sqrt => Ok(math::unary(self, args, f64::sqrt)?),
            Builtin::Exp => Ok(math::unary(self, args, f64::exp)?),
            Builtin::Log => Ok(math::log(args)?),
            Builtin::Log10 => Ok(math::log_base(self, args, f64::log10, core::f64::consts::LN_10)?),
            Builtin::Log2 => Ok(math::log_base(self, args, f64::log2, core::f64::consts::LN_2)?),
            Builtin::Ceil => Ok(math::ceil(args)?),
            Builtin::Floor => Ok(math::floor(args)?),
            Builtin::Degrees => Ok(math::unary(self, args, f64::to_degrees)?),
            Builtin::Radians => Ok(math::unary(self, args, f64::to_radians)?),
            Builtin::Factorial => math::factorial(args, budget),
        }
    }
}

/// What a name in the capability table stands for.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Capability {
    Constant(f64),
    Function(Builtin),
}

impl Capability {
    pub fn value<'a>(self) -> Value<'a> {
        match self {
            Capability::Constant(x) => Value::Float(x),
            Capability::Function(builtin) => Value::Builtin(builtin),
        }
    }
}

lazy_static! {
    static ref CAPABILITIES: HashMap<&'static str, Capability> = {
        let mut table = HashMap::new();
        table.insert("pi", Capability::Constant(core::f64::consts::PI));
        table.insert("e", Capability::Constant(core::f64::consts::E));
        for builtin in Builtin::ALL {
            table.insert(builtin.name(), Capability::Function(builtin));
        }
        table
    };
}

/// Look up a name in the capability table.
pub fn lookup(name: &str) -> Option<Capability> {
    CAPABILITIES.get(name).copied()
}

/// All capability names, sorted.
pub fn capability_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = CAPABILITIES.keys().copied().collect();
    names.sort_unstable();
    names
}

// Arity checks shared by the builtins, with the source language's wording.
pub(crate) fn check_arity(
    name: &str,
    args: &[Value<'_>],
    min: usize,
    max: usize,
) -> Result<(), RuntimeError> {
    let given = args.len();
    if given >= min && given <= max {
        return Ok(());
    }
    let message = if min == max {
        match max {
            1 => format!("{}() takes exactly one argument ({} given)", name, given),
            _ => format!("{}() takes exactly {} arguments ({} given)", name, max, given),
        }
    } else if given < min {
        format!(
            "{} expected at least {} argument{}, got {}",
            name,
            min,
            if min == 1 { "" } else { "s" },
            given
        )
    } else {
        format!("{}() takes at most {} arguments ({} given)", name, max, given)
    };
    Err(RuntimeError::type_error(message))
}
