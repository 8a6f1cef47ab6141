use bumpalo::Bump;
use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;

use crate::parser::error::convert_pest_error;
use crate::parser::{
    BinaryOp, BoolOp, ComparisonOp, Expr, ExprKind, FunctionDef, Ident, Literal, Param,
    ParseError, ParseErrorKind, ParsedModule, Span, Stmt, StmtKind, UnaryOp,
};

/// Default limit for bracket and unary-operator nesting.
pub const DEFAULT_MAX_NESTING: usize = 100;

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref BOOL_PRATT: PrattParser<Rule> = PrattParser::new()
        .op(Op::infix(Rule::or_op, Assoc::Left))        // `or`
        .op(Op::infix(Rule::and_op, Assoc::Left))       // `and`
        .op(Op::prefix(Rule::not_op));                  // `not`

    static ref ARITH_PRATT: PrattParser<Rule> = PrattParser::new()
        .op(
            Op::infix(Rule::add, Assoc::Left) |
            Op::infix(Rule::sub, Assoc::Left)
        )                                               // `+`, `-`
        .op(
            Op::infix(Rule::mul, Assoc::Left) |
            Op::infix(Rule::div, Assoc::Left) |
            Op::infix(Rule::floor_div, Assoc::Left) |
            Op::infix(Rule::modulo, Assoc::Left)
        )                                               // `*`, `/`, `//`, `%`
        .op(Op::prefix(Rule::neg) | Op::prefix(Rule::pos) | Op::prefix(Rule::invert))
        .op(Op::infix(Rule::pow, Assoc::Right))         // `**` (right-assoc)
        .op(Op::postfix(Rule::call_op) | Op::postfix(Rule::attribute_op));
}

#[derive(Parser)]
#[grammar = "parser/function.pest"]
pub struct FunctionParser;

/// Parse a source with the default nesting limit.
pub fn parse<'a>(arena: &'a Bump, source: &'a str) -> Result<ParsedModule<'a>, ParseError> {
    parse_with_max_depth(arena, source, DEFAULT_MAX_NESTING)
}

/// Parse a source, rejecting bracket or unary-operator nesting deeper than
/// `max_depth` before the grammar runs.
pub fn parse_with_max_depth<'a>(
    arena: &'a Bump,
    source: &'a str,
    max_depth: usize,
) -> Result<ParsedModule<'a>, ParseError> {
    check_nesting(source, max_depth)?;

    let mut pairs = FunctionParser::parse(Rule::module, source)
        .map_err(|err| convert_pest_error(err, source))?;
    let Some(module) = pairs.next() else {
        return Err(ParseError::new(
            ParseErrorKind::Other {
                message: "empty parse result".to_string(),
            },
            Span::new(0, 0),
        ));
    };

    let builder = TreeBuilder { arena };
    let mut body = Vec::new();
    for pair in module.into_inner() {
        if pair.as_rule() == Rule::statement {
            builder.statement(pair, Context::MODULE, &mut body)?;
        }
    }

    tracing::trace!(statements = body.len(), "parsed module");
    Ok(ParsedModule {
        source,
        body: arena.alloc_slice_fill_iter(body),
    })
}

/// Textual pre-scan bounding the recursion depth of the grammar and of the
/// Pratt folds: open brackets plus the current run of prefix operators.
fn check_nesting(source: &str, max_depth: usize) -> Result<(), ParseError> {
    let mut depth: usize = 0;
    let mut unary_run: usize = 0;
    let mut in_comment = false;

    for (pos, c) in source.char_indices() {
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        match c {
            '#' => {
                in_comment = true;
                unary_run = 0;
            }
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            '-' | '+' | '~' => unary_run += 1,
            ' ' | '\t' => {}
            _ => unary_run = 0,
        }
        if depth + unary_run > max_depth {
            return Err(ParseError::new(
                ParseErrorKind::MaxDepthExceeded {
                    depth: depth + unary_run,
                    max_depth,
                },
                Span::new(pos, pos + c.len_utf8()),
            ));
        }
    }
    Ok(())
}

/// Where a statement appears, for the checks the grammar cannot express.
#[derive(Debug, Clone, Copy)]
struct Context {
    in_function: bool,
    in_loop: bool,
}

impl Context {
    const MODULE: Context = Context {
        in_function: false,
        in_loop: false,
    };
}

fn is_keyword(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::kw_def
            | Rule::kw_return
            | Rule::kw_if
            | Rule::kw_elif
            | Rule::kw_else
            | Rule::kw_while
            | Rule::kw_for
            | Rule::kw_in
            | Rule::kw_pass
            | Rule::kw_break
            | Rule::kw_continue
            | Rule::kw_import
            | Rule::kw_from
    )
}

/// Inner pairs without keyword tokens.
fn significant(pair: Pair<'_, Rule>) -> impl Iterator<Item = Pair<'_, Rule>> {
    pair.into_inner().filter(|p| !is_keyword(p.as_rule()))
}

fn missing(span: pest::Span<'_>, what: &str) -> ParseError {
    ParseError::new(
        ParseErrorKind::Other {
            message: format!("missing {} in parse tree", what),
        },
        span.into(),
    )
}

fn misplaced(span: pest::Span<'_>, what: &'static str, context: &'static str) -> ParseError {
    ParseError::new(ParseErrorKind::Misplaced { what, context }, span.into())
}

/// Turns pest pairs into the arena-allocated syntax tree.
struct TreeBuilder<'a> {
    arena: &'a Bump,
}

impl<'a> TreeBuilder<'a> {
    fn alloc_expr(&self, kind: ExprKind<'a>, span: Span) -> &'a Expr<'a> {
        self.arena.alloc(Expr { kind, span })
    }

    fn ident(&self, pair: Pair<'a, Rule>) -> Ident<'a> {
        Ident {
            name: pair.as_str(),
            span: pair.as_span().into(),
        }
    }

    // Statements
    // ----------

    fn statement(
        &self,
        pair: Pair<'a, Rule>,
        ctx: Context,
        out: &mut Vec<Stmt<'a>>,
    ) -> Result<(), ParseError> {
        let span = pair.as_span();
        let inner = pair
            .into_inner()
            .next()
            .ok_or_else(|| missing(span, "statement"))?;

        match inner.as_rule() {
            Rule::simple_stmts => {
                for simple in inner.into_inner() {
                    out.push(self.simple_statement(simple, ctx)?);
                }
                Ok(())
            }
            Rule::funcdef => {
                out.push(self.funcdef(inner, ctx)?);
                Ok(())
            }
            Rule::if_stmt => {
                out.push(self.if_statement(inner, ctx)?);
                Ok(())
            }
            Rule::while_stmt => {
                out.push(self.while_statement(inner, ctx)?);
                Ok(())
            }
            Rule::for_stmt => {
                out.push(self.for_statement(inner, ctx)?);
                Ok(())
            }
            rule => Err(missing(span, &format!("statement (got {:?})", rule))),
        }
    }

    fn suite(&self, pair: Pair<'a, Rule>, ctx: Context) -> Result<&'a [Stmt<'a>], ParseError> {
        let span = pair.as_span();
        let inner = pair
            .into_inner()
            .next()
            .ok_or_else(|| missing(span, "suite"))?;

        let mut body = Vec::new();
        match inner.as_rule() {
            Rule::block => {
                for statement in inner.into_inner() {
                    self.statement(statement, ctx, &mut body)?;
                }
            }
            Rule::inline_suite => {
                for simple_stmts in inner.into_inner() {
                    for simple in simple_stmts.into_inner() {
                        body.push(self.simple_statement(simple, ctx)?);
                    }
                }
            }
            rule => return Err(missing(span, &format!("suite (got {:?})", rule))),
        }
        Ok(self.arena.alloc_slice_fill_iter(body))
    }

    fn funcdef(&self, pair: Pair<'a, Rule>, ctx: Context) -> Result<Stmt<'a>, ParseError> {
        let span = pair.as_span();
        if ctx.in_function {
            return Err(misplaced(
                span,
                "def",
                "is only allowed at top level; nested functions are not supported",
            ));
        }

        let mut inner = pair.into_inner();
        let header = inner.next().ok_or_else(|| missing(span, "def header"))?;
        let suite = inner.next().ok_or_else(|| missing(span, "function body"))?;

        let mut header = significant(header);
        let name = self.ident(header.next().ok_or_else(|| missing(span, "function name"))?);

        let mut params = Vec::new();
        if let Some(parameters) = header.next() {
            for parameter in parameters.into_inner() {
                let mut parts = parameter.into_inner();
                let param_name = parts
                    .next()
                    .ok_or_else(|| missing(span, "parameter name"))?;
                let default = match parts.next() {
                    Some(expr) => Some(self.expression(expr)?),
                    None => None,
                };
                params.push(Param {
                    name: self.ident(param_name),
                    default,
                });
            }
        }

        let body = self.suite(
            suite,
            Context {
                in_function: true,
                in_loop: false,
            },
        )?;

        let def = self.arena.alloc(FunctionDef {
            name,
            params: self.arena.alloc_slice_fill_iter(params),
            body,
            span: span.into(),
        });
        Ok(Stmt {
            kind: StmtKind::FunctionDef(def),
            span: span.into(),
        })
    }

    fn if_statement(&self, pair: Pair<'a, Rule>, ctx: Context) -> Result<Stmt<'a>, ParseError> {
        let span = pair.as_span();
        let mut branches = Vec::new();
        let mut orelse: &'a [Stmt<'a>] = &[];

        let mut inner = pair.into_inner();
        while let Some(part) = inner.next() {
            match part.as_rule() {
                Rule::if_header => {
                    let cond = self.header_expression(part)?;
                    let suite = inner.next().ok_or_else(|| missing(span, "if body"))?;
                    branches.push((cond, self.suite(suite, ctx)?));
                }
                Rule::elif_clause => {
                    let mut clause = part.into_inner();
                    let header = clause.next().ok_or_else(|| missing(span, "elif header"))?;
                    let suite = clause.next().ok_or_else(|| missing(span, "elif body"))?;
                    branches.push((self.header_expression(header)?, self.suite(suite, ctx)?));
                }
                Rule::else_clause => {
                    let suite = part
                        .into_inner()
                        .find(|p| p.as_rule() == Rule::suite)
                        .ok_or_else(|| missing(span, "else body"))?;
                    orelse = self.suite(suite, ctx)?;
                }
                rule => return Err(missing(span, &format!("if clause (got {:?})", rule))),
            }
        }

        Ok(Stmt {
            kind: StmtKind::If {
                branches: self.arena.alloc_slice_fill_iter(branches),
                orelse,
            },
            span: span.into(),
        })
    }

    /// The condition of an `if`/`elif`/`while` header.
    fn header_expression(&self, header: Pair<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        let span = header.as_span();
        let expr = significant(header)
            .next()
            .ok_or_else(|| missing(span, "condition"))?;
        self.expression(expr)
    }

    fn while_statement(&self, pair: Pair<'a, Rule>, ctx: Context) -> Result<Stmt<'a>, ParseError> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let header = inner.next().ok_or_else(|| missing(span, "while header"))?;
        let suite = inner.next().ok_or_else(|| missing(span, "while body"))?;

        let cond = self.header_expression(header)?;
        let body = self.suite(
            suite,
            Context {
                in_loop: true,
                ..ctx
            },
        )?;
        Ok(Stmt {
            kind: StmtKind::While { cond, body },
            span: span.into(),
        })
    }

    fn for_statement(&self, pair: Pair<'a, Rule>, ctx: Context) -> Result<Stmt<'a>, ParseError> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let header = inner.next().ok_or_else(|| missing(span, "for header"))?;
        let suite = inner.next().ok_or_else(|| missing(span, "for body"))?;

        let mut header = significant(header);
        let target = self.ident(header.next().ok_or_else(|| missing(span, "loop variable"))?);
        let iter = self.expression(header.next().ok_or_else(|| missing(span, "iterable"))?)?;
        let body = self.suite(
            suite,
            Context {
                in_loop: true,
                ..ctx
            },
        )?;
        Ok(Stmt {
            kind: StmtKind::For { target, iter, body },
            span: span.into(),
        })
    }

    fn simple_statement(&self, pair: Pair<'a, Rule>, ctx: Context) -> Result<Stmt<'a>, ParseError> {
        let span = pair.as_span();
        let rule = pair.as_rule();

        let kind = match rule {
            Rule::return_stmt => {
                if !ctx.in_function {
                    return Err(misplaced(span, "return", "outside function"));
                }
                match significant(pair).next() {
                    Some(expr) => StmtKind::Return(Some(self.expression(expr)?)),
                    None => StmtKind::Return(None),
                }
            }
            Rule::pass_stmt => StmtKind::Pass,
            Rule::break_stmt => {
                if !ctx.in_loop {
                    return Err(misplaced(span, "break", "outside loop"));
                }
                StmtKind::Break
            }
            Rule::continue_stmt => {
                if !ctx.in_loop {
                    return Err(misplaced(span, "continue", "not properly in loop"));
                }
                StmtKind::Continue
            }
            Rule::import_stmt => {
                let modules: Vec<Ident<'a>> = significant(pair).map(|p| self.ident(p)).collect();
                StmtKind::Import {
                    modules: self.arena.alloc_slice_fill_iter(modules),
                }
            }
            Rule::from_import_stmt => {
                let mut idents = significant(pair).map(|p| self.ident(p));
                let module = idents.next().ok_or_else(|| missing(span, "module name"))?;
                let names: Vec<Ident<'a>> = idents.collect();
                StmtKind::ImportFrom {
                    module,
                    names: self.arena.alloc_slice_fill_iter(names),
                }
            }
            Rule::assign_stmt => {
                let mut inner = pair.into_inner();
                let target = inner.next().ok_or_else(|| missing(span, "assignment target"))?;
                let value = inner
                    .find(|p| p.as_rule() == Rule::expression)
                    .ok_or_else(|| missing(span, "assigned value"))?;
                StmtKind::Assign {
                    target: self.ident(target),
                    value: self.expression(value)?,
                }
            }
            Rule::aug_assign_stmt => {
                let mut inner = pair.into_inner();
                let target = inner.next().ok_or_else(|| missing(span, "assignment target"))?;
                let op = inner.next().ok_or_else(|| missing(span, "operator"))?;
                let value = inner.next().ok_or_else(|| missing(span, "assigned value"))?;
                let op = match op.as_str() {
                    "+=" => BinaryOp::Add,
                    "-=" => BinaryOp::Sub,
                    "*=" => BinaryOp::Mul,
                    "/=" => BinaryOp::Div,
                    "//=" => BinaryOp::FloorDiv,
                    "%=" => BinaryOp::Mod,
                    "**=" => BinaryOp::Pow,
                    other => return Err(missing(span, &format!("operator (got {})", other))),
                };
                StmtKind::AugAssign {
                    target: self.ident(target),
                    op,
                    value: self.expression(value)?,
                }
            }
            Rule::expr_stmt => {
                let expr = pair
                    .into_inner()
                    .next()
                    .ok_or_else(|| missing(span, "expression"))?;
                StmtKind::Expr(self.expression(expr)?)
            }
            rule => return Err(missing(span, &format!("simple statement (got {:?})", rule))),
        };

        Ok(Stmt {
            kind,
            span: span.into(),
        })
    }

    // Expressions
    // -----------

    fn expression(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        let span = pair.as_span();
        let mut parts = significant(pair);
        let value = parts
            .next()
            .ok_or_else(|| missing(span, "expression"))?;
        let value = self.disjunction(value)?;

        match (parts.next(), parts.next()) {
            (None, _) => Ok(value),
            (Some(cond), Some(else_branch)) => {
                let cond = self.disjunction(cond)?;
                let else_branch = self.expression(else_branch)?;
                Ok(self.alloc_expr(
                    ExprKind::IfElse {
                        cond,
                        then_branch: value,
                        else_branch,
                    },
                    span.into(),
                ))
            }
            (Some(_), None) => Err(missing(span, "else branch")),
        }
    }

    fn disjunction(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        BOOL_PRATT
            .map_primary(|primary| self.comparison(primary))
            .map_prefix(|op, rhs| {
                let rhs = rhs?;
                let span = Span::new(op.as_span().start(), rhs.span.0.end);
                Ok(self.alloc_expr(
                    ExprKind::Unary {
                        op: UnaryOp::Not,
                        operand: rhs,
                    },
                    span,
                ))
            })
            .map_infix(|lhs, op, rhs| {
                let (left, right) = (lhs?, rhs?);
                let op = match op.as_rule() {
                    Rule::or_op => BoolOp::Or,
                    Rule::and_op => BoolOp::And,
                    rule => return Err(missing(op.as_span(), &format!("operator (got {:?})", rule))),
                };
                Ok(self.alloc_expr(
                    ExprKind::Boolean { op, left, right },
                    Span::combine(&left.span, &right.span),
                ))
            })
            .parse(pair.into_inner())
    }

    fn comparison(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        let span = pair.as_span();
        let mut inner = pair.into_inner();
        let first = inner.next().ok_or_else(|| missing(span, "operand"))?;
        let left = self.arith(first.into_inner())?;

        let mut links = Vec::new();
        while let Some(op) = inner.next() {
            let op = match op.as_str() {
                "==" => ComparisonOp::Eq,
                "!=" => ComparisonOp::Neq,
                "<" => ComparisonOp::Lt,
                "<=" => ComparisonOp::Le,
                ">" => ComparisonOp::Gt,
                ">=" => ComparisonOp::Ge,
                other => return Err(missing(span, &format!("comparison (got {})", other))),
            };
            let operand = inner.next().ok_or_else(|| missing(span, "operand"))?;
            links.push((op, self.arith(operand.into_inner())?));
        }

        if links.is_empty() {
            return Ok(left);
        }
        Ok(self.alloc_expr(
            ExprKind::Comparison {
                left,
                links: self.arena.alloc_slice_copy(&links),
            },
            span.into(),
        ))
    }

    fn arith(&self, pairs: Pairs<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        ARITH_PRATT
            .map_primary(|primary| self.primary(primary))
            .map_prefix(|op, rhs| {
                let operand = rhs?;
                let op_rule = op.as_rule();
                let span = Span::new(op.as_span().start(), operand.span.0.end);
                let op = match op_rule {
                    Rule::neg => UnaryOp::Neg,
                    Rule::pos => UnaryOp::Pos,
                    Rule::invert => UnaryOp::Invert,
                    rule => return Err(missing(op.as_span(), &format!("prefix operator (got {:?})", rule))),
                };
                Ok(self.alloc_expr(ExprKind::Unary { op, operand }, span))
            })
            .map_infix(|lhs, op, rhs| {
                let (left, right) = (lhs?, rhs?);
                let op = match op.as_rule() {
                    Rule::add => BinaryOp::Add,
                    Rule::sub => BinaryOp::Sub,
                    Rule::mul => BinaryOp::Mul,
                    Rule::div => BinaryOp::Div,
                    Rule::floor_div => BinaryOp::FloorDiv,
                    Rule::modulo => BinaryOp::Mod,
                    Rule::pow => BinaryOp::Pow,
                    rule => return Err(missing(op.as_span(), &format!("operator (got {:?})", rule))),
                };
                Ok(self.alloc_expr(
                    ExprKind::Binary { op, left, right },
                    Span::combine(&left.span, &right.span),
                ))
            })
            .map_postfix(|lhs, op| {
                let lhs = lhs?;
                let span = Span::new(lhs.span.0.start, op.as_span().end());
                match op.as_rule() {
                    Rule::call_op => {
                        let args = op
                            .into_inner()
                            .map(|arg| self.expression(arg))
                            .collect::<Result<Vec<_>, _>>()?;
                        Ok(self.alloc_expr(
                            ExprKind::Call {
                                func: lhs,
                                args: self.arena.alloc_slice_copy(&args),
                            },
                            span,
                        ))
                    }
                    Rule::attribute_op => {
                        let op_span = op.as_span();
                        let attr = op
                            .into_inner()
                            .next()
                            .ok_or_else(|| missing(op_span, "attribute name"))?;
                        Ok(self.alloc_expr(
                            ExprKind::Attribute {
                                value: lhs,
                                attr: self.ident(attr),
                            },
                            span,
                        ))
                    }
                    rule => Err(missing(op.as_span(), &format!("postfix operator (got {:?})", rule))),
                }
            })
            .parse(pairs)
    }

    fn primary(&self, pair: Pair<'a, Rule>) -> Result<&'a Expr<'a>, ParseError> {
        let span: Span = pair.as_span().into();
        match pair.as_rule() {
            Rule::identifier => Ok(self.alloc_expr(ExprKind::Name(pair.as_str()), span)),
            Rule::true_lit => Ok(self.alloc_expr(ExprKind::Literal(Literal::Bool(true)), span)),
            Rule::false_lit => Ok(self.alloc_expr(ExprKind::Literal(Literal::Bool(false)), span)),
            Rule::none_lit => Ok(self.alloc_expr(ExprKind::Literal(Literal::None), span)),
            Rule::number => {
                let pest_span = pair.as_span();
                let literal = pair
                    .into_inner()
                    .next()
                    .ok_or_else(|| missing(pest_span, "number"))?;
                Ok(self.alloc_expr(ExprKind::Literal(self.number(literal)?), span))
            }
            Rule::paren => {
                let mut items = Vec::new();
                let mut commas = 0;
                for part in pair.into_inner() {
                    match part.as_rule() {
                        Rule::comma => commas += 1,
                        _ => items.push(self.expression(part)?),
                    }
                }
                if items.len() == 1 && commas == 0 {
                    Ok(items[0])
                } else {
                    Ok(self.alloc_expr(ExprKind::Tuple(self.arena.alloc_slice_copy(&items)), span))
                }
            }
            Rule::list => {
                let items = pair
                    .into_inner()
                    .map(|item| self.expression(item))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(self.alloc_expr(ExprKind::List(self.arena.alloc_slice_copy(&items)), span))
            }
            rule => Err(missing(pair.as_span(), &format!("primary expression (got {:?})", rule))),
        }
    }

    fn number(&self, pair: Pair<'a, Rule>) -> Result<Literal<'a>, ParseError> {
        let text = pair.as_str();
        let invalid = |reason: &'static str| {
            ParseError::new(
                ParseErrorKind::InvalidNumber {
                    text: text.to_string(),
                    reason,
                },
                pair.as_span().into(),
            )
        };
        let cleaned: String = text.chars().filter(|c| *c != '_').collect();

        match pair.as_rule() {
            Rule::integer => {
                let lower = cleaned.to_ascii_lowercase();
                let (digits, radix) = if let Some(hex) = lower.strip_prefix("0x") {
                    (hex, 16)
                } else if let Some(oct) = lower.strip_prefix("0o") {
                    (oct, 8)
                } else if let Some(bin) = lower.strip_prefix("0b") {
                    (bin, 2)
                } else {
                    if lower.len() > 1 && lower.starts_with('0') && lower.chars().any(|c| c != '0') {
                        return Err(invalid("leading zeros in decimal integer literals are not permitted"));
                    }
                    (lower.as_str(), 10)
                };
                match i64::from_str_radix(digits, radix) {
                    Ok(value) => Ok(Literal::Int(value)),
                    Err(_) => Ok(Literal::BigInt {
                        digits: self.arena.alloc_str(digits),
                        radix,
                    }),
                }
            }
            Rule::float => cleaned
                .parse::<f64>()
                .map(Literal::Float)
                .map_err(|_| invalid("not a valid float")),
            Rule::imaginary => cleaned[..cleaned.len() - 1]
                .parse::<f64>()
                .map(Literal::Imaginary)
                .map_err(|_| invalid("not a valid imaginary number")),
            _ => Err(invalid("unknown literal")),
        }
    }
}
