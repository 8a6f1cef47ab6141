pub mod error;
pub mod parser;
mod syntax;
mod tree;

// Re-export the parser and rule enum for external use
pub use parser::FunctionParser;
pub use parser::Rule;
pub use parser::{DEFAULT_MAX_NESTING, parse, parse_with_max_depth};

pub use error::{ParseError, ParseErrorKind};
pub use syntax::{BinaryOp, BoolOp, ComparisonOp, Span, UnaryOp};
pub use tree::{
    Expr, ExprKind, FunctionDef, Ident, Literal, Param, ParsedModule, Stmt, StmtKind,
};

#[cfg(test)]
mod parse_test;
