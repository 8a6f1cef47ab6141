use crate::parser::{BinaryOp, BoolOp, ComparisonOp, Span, UnaryOp};

/// A parsed source: the top-level statements, all allocated in the
/// invocation's arena.
#[derive(Debug)]
pub struct ParsedModule<'a> {
    pub source: &'a str,
    pub body: &'a [Stmt<'a>],
}

impl<'a> ParsedModule<'a> {
    /// Top-level function definitions, in source order.
    pub fn functions(&self) -> impl Iterator<Item = &'a FunctionDef<'a>> + use<'a> {
        let body: &'a [Stmt<'a>] = self.body;
        body.iter().filter_map(|stmt| match &stmt.kind {
            StmtKind::FunctionDef(def) => Some(*def),
            _ => None,
        })
    }
}

/// A name as written in the source, with its location.
#[derive(Debug, Clone, PartialEq)]
pub struct Ident<'a> {
    pub name: &'a str,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt<'a> {
    pub kind: StmtKind<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind<'a> {
    FunctionDef(&'a FunctionDef<'a>),
    Return(Option<&'a Expr<'a>>),
    Assign {
        target: Ident<'a>,
        value: &'a Expr<'a>,
    },
    AugAssign {
        target: Ident<'a>,
        op: BinaryOp,
        value: &'a Expr<'a>,
    },
    If {
        // `if` followed by every `elif`, in order.
        branches: &'a [(&'a Expr<'a>, &'a [Stmt<'a>])],
        orelse: &'a [Stmt<'a>],
    },
    While {
        cond: &'a Expr<'a>,
        body: &'a [Stmt<'a>],
    },
    For {
        target: Ident<'a>,
        iter: &'a Expr<'a>,
        body: &'a [Stmt<'a>],
    },
    Pass,
    Break,
    Continue,
    Import {
        modules: &'a [Ident<'a>],
    },
    ImportFrom {
        module: Ident<'a>,
        names: &'a [Ident<'a>],
    },
    Expr(&'a Expr<'a>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef<'a> {
    pub name: Ident<'a>,
    pub params: &'a [Param<'a>],
    pub body: &'a [Stmt<'a>],
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param<'a> {
    pub name: Ident<'a>,
    pub default: Option<&'a Expr<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr<'a> {
    pub kind: ExprKind<'a>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind<'a> {
    Literal(Literal<'a>),
    Name(&'a str),
    Attribute {
        value: &'a Expr<'a>,
        attr: Ident<'a>,
    },
    Call {
        func: &'a Expr<'a>,
        args: &'a [&'a Expr<'a>],
    },
    Unary {
        op: UnaryOp,
        operand: &'a Expr<'a>,
    },
    Binary {
        op: BinaryOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Boolean {
        op: BoolOp,
        left: &'a Expr<'a>,
        right: &'a Expr<'a>,
    },
    Comparison {
        left: &'a Expr<'a>,
        // Chained comparisons: `a < b <= c` is `a` followed by two links.
        links: &'a [(ComparisonOp, &'a Expr<'a>)],
    },
    IfElse {
        cond: &'a Expr<'a>,
        then_branch: &'a Expr<'a>,
        else_branch: &'a Expr<'a>,
    },
    Tuple(&'a [&'a Expr<'a>]),
    List(&'a [&'a Expr<'a>]),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal<'a> {
    Int(i64),
    // Digits (underscores removed, prefix stripped) of an integer that does
    // not fit in an i64.
    BigInt { digits: &'a str, radix: u32 },
    Float(f64),
    Imaginary(f64),
    Bool(bool),
    None,
}
