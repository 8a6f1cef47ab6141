//! Syntax tree walk enforcing the identifier whitelist.

use tracing::debug;

use crate::parser::{Expr, ExprKind, Ident, ParsedModule, Stmt, StmtKind};
use crate::policy::{PolicyError, is_allowed_name};
use crate::stdlib::{self, MODULE_NAME};

/// Check a parsed module against the policy.
///
/// Identifiers are checked first, in source order, so the error names the
/// earliest offender; the function count is checked only when every name
/// passes.
pub fn validate(module: &ParsedModule<'_>) -> Result<(), PolicyError> {
    for stmt in module.body {
        check_stmt(stmt)?;
    }

    let spans: Vec<_> = module.functions().map(|def| def.name.span.clone()).collect();
    debug!(functions = spans.len(), "Identifiers validated");
    match spans.len() {
        0 => Err(PolicyError::NoFunctionDefined),
        1 => Ok(()),
        count => Err(PolicyError::MultipleFunctionsDefined { count, spans }),
    }
}

fn disallowed(ident: &Ident<'_>) -> PolicyError {
    PolicyError::DisallowedIdentifier {
        name: ident.name.to_string(),
        span: ident.span.clone(),
    }
}

fn check_ident(ident: &Ident<'_>) -> Result<(), PolicyError> {
    if is_allowed_name(ident.name) {
        Ok(())
    } else {
        Err(disallowed(ident))
    }
}

fn check_module(module: &Ident<'_>) -> Result<(), PolicyError> {
    if module.name == MODULE_NAME {
        Ok(())
    } else {
        Err(disallowed(module))
    }
}

fn check_block(body: &[Stmt<'_>]) -> Result<(), PolicyError> {
    body.iter().try_for_each(check_stmt)
}

fn check_stmt(stmt: &Stmt<'_>) -> Result<(), PolicyError> {
    match &stmt.kind {
        // The function's own name is a definition, not a reference.
        StmtKind::FunctionDef(def) => {
            for param in def.params.iter() {
                check_ident(&param.name)?;
                if let Some(default) = param.default {
                    check_expr(default)?;
                }
            }
            check_block(def.body)
        }
        StmtKind::Return(value) => value.map_or(Ok(()), check_expr),
        StmtKind::Assign { target, value } | StmtKind::AugAssign { target, value, .. } => {
            check_ident(target)?;
            check_expr(value)
        }
        StmtKind::If { branches, orelse } => {
            for (cond, body) in branches.iter() {
                check_expr(cond)?;
                check_block(body)?;
            }
            check_block(orelse)
        }
        StmtKind::While { cond, body } => {
            check_expr(cond)?;
            check_block(body)
        }
        StmtKind::For { target, iter, body } => {
            check_ident(target)?;
            check_expr(iter)?;
            check_block(body)
        }
        StmtKind::Import { modules } => modules.iter().try_for_each(check_module),
        StmtKind::ImportFrom { module, names } => {
            check_module(module)?;
            names.iter().try_for_each(check_ident)
        }
        StmtKind::Expr(expr) => check_expr(expr),
        StmtKind::Pass | StmtKind::Break | StmtKind::Continue => Ok(()),
    }
}

fn check_expr(expr: &Expr<'_>) -> Result<(), PolicyError> {
    match &expr.kind {
        ExprKind::Literal(_) => Ok(()),
        ExprKind::Name(name) => {
            if is_allowed_name(name) {
                Ok(())
            } else {
                Err(PolicyError::DisallowedIdentifier {
                    name: name.to_string(),
                    span: expr.span.clone(),
                })
            }
        }
        ExprKind::Attribute { value, attr } => {
            // Only `math.<capability>` is an attribute access at all.
            if let ExprKind::Name(MODULE_NAME) = value.kind {
                return match stdlib::lookup(attr.name) {
                    Some(_) => Ok(()),
                    None => Err(disallowed(attr)),
                };
            }
            check_expr(value)?;
            Err(disallowed(attr))
        }
        ExprKind::Call { func, args } => {
            check_expr(func)?;
            args.iter().try_for_each(|arg| check_expr(arg))
        }
        ExprKind::Unary { operand, .. } => check_expr(operand),
        ExprKind::Binary { left, right, .. } | ExprKind::Boolean { left, right, .. } => {
            check_expr(left)?;
            check_expr(right)
        }
        ExprKind::Comparison { left, links } => {
            check_expr(left)?;
            links.iter().try_for_each(|(_, operand)| check_expr(operand))
        }
        ExprKind::IfElse {
            cond,
            then_branch,
            else_branch,
        } => {
            // `a if c else b` reads left to right as then, cond, else.
            check_expr(then_branch)?;
            check_expr(cond)?;
            check_expr(else_branch)
        }
        ExprKind::Tuple(items) | ExprKind::List(items) => {
            items.iter().try_for_each(|item| check_expr(item))
        }
    }
}
