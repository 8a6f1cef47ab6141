//! Core evaluation logic.

use std::rc::Rc;

use hashbrown::{HashMap, HashSet};
use num_bigint::BigInt;
use smallvec::SmallVec;
use tracing::{debug, trace};

use crate::api::ExecutionOptions;
use crate::evaluator::operators;
use crate::evaluator::{Budget, CancellationToken, ExceptionKind, ExecutionError, RuntimeError};
use crate::parser::{
    BinaryOp, BoolOp, Expr, ExprKind, FunctionDef, Ident, Literal, ParsedModule, Span, Stmt,
    StmtKind,
};
use crate::stdlib::{self, Capability, MODULE_NAME};
use crate::values::{Closure, Value};

// Most calls in practice pass at most a handful of arguments.
type Args<'a> = SmallVec<[Value<'a>; 4]>;

/// How a statement finished.
enum Flow<'a> {
    Normal,
    Return(Value<'a>),
    Break,
    Continue,
}

/// Activation record of a user-defined function.
struct Frame<'a> {
    // Every name the body may bind; reading one of these before it is bound
    // is an error rather than a fallback to globals.
    local_names: HashSet<&'a str>,
    locals: HashMap<&'a str, Value<'a>>,
}

/// Evaluator for parsed modules.
pub struct Evaluator<'a, 'c> {
    budget: Budget<'c>,
    max_depth: usize,
    max_call_depth: usize,
    globals: HashMap<&'a str, Value<'a>>,
    frames: Vec<Frame<'a>>,
    depth: usize,
}

impl<'a, 'c> Evaluator<'a, 'c> {
    pub fn new(options: &ExecutionOptions, cancel: Option<&'c CancellationToken>) -> Self {
        Self {
            budget: Budget::new(options, cancel),
            max_depth: options.max_depth,
            max_call_depth: options.max_call_depth,
            globals: HashMap::new(),
            frames: Vec::new(),
            depth: 0,
        }
    }

    /// Execute the module's top-level statements, then call its first
    /// function with no arguments.
    pub fn run(mut self, module: &ParsedModule<'a>) -> Result<Value<'a>, ExecutionError> {
        let Some(def) = module.functions().next() else {
            return Err(RuntimeError::new(ExceptionKind::NameError, "no function defined").into());
        };

        for stmt in module.body {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                // The parser rejects these outside a function or loop.
                Flow::Return(_) | Flow::Break | Flow::Continue => break,
            }
        }

        // Top-level code may have rebound the name.
        let func = self.lookup(def.name.name)?;
        debug!(function = def.name.name, "Calling function");
        let result = self
            .call(func, Args::new(), &def.span)
            .map_err(|e| e.at(&def.span));
        debug!(steps = self.budget.steps(), ok = result.is_ok(), "Execution finished");
        result
    }

    // ========================================================================
    // Names
    // ========================================================================

    fn lookup(&self, name: &str) -> Result<Value<'a>, RuntimeError> {
        if let Some(frame) = self.frames.last() {
            if frame.local_names.contains(name) {
                return frame.locals.get(name).cloned().ok_or_else(|| {
                    RuntimeError::new(
                        ExceptionKind::UnboundLocalError,
                        format!(
                            "cannot access local variable '{}' where it is not associated with a value",
                            name
                        ),
                    )
                });
            }
        }
        if let Some(value) = self.globals.get(name) {
            return Ok(value.clone());
        }
        stdlib::lookup(name)
            .map(Capability::value)
            .ok_or_else(|| {
                RuntimeError::new(
                    ExceptionKind::NameError,
                    format!("name '{}' is not defined", name),
                )
            })
    }

    fn bind(&mut self, name: &'a str, value: Value<'a>) {
        match self.frames.last_mut() {
            Some(frame) => {
                frame.locals.insert(name, value);
            }
            None => {
                self.globals.insert(name, value);
            }
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn exec_block(&mut self, body: &'a [Stmt<'a>]) -> Result<Flow<'a>, ExecutionError> {
        for stmt in body {
            match self.exec_stmt(stmt)? {
                Flow::Normal => {}
                flow => return Ok(flow),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_stmt(&mut self, stmt: &'a Stmt<'a>) -> Result<Flow<'a>, ExecutionError> {
        self.budget.tick()?;
        self.exec_stmt_inner(stmt).map_err(|e| e.at(&stmt.span))
    }

    fn exec_stmt_inner(&mut self, stmt: &'a Stmt<'a>) -> Result<Flow<'a>, ExecutionError> {
        match &stmt.kind {
            StmtKind::FunctionDef(def) => {
                let def: &'a FunctionDef<'a> = def;
                let defaults = def
                    .params
                    .iter()
                    .map(|param| param.default.map(|d| self.eval_expr(d)).transpose())
                    .collect::<Result<Vec<_>, _>>()?;
                let closure = Closure { def, defaults };
                self.bind(def.name.name, Value::Function(Rc::new(closure)));
                Ok(Flow::Normal)
            }

            StmtKind::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval_expr(expr)?,
                    None => Value::None,
                };
                Ok(Flow::Return(value))
            }

            StmtKind::Assign { target, value } => {
                let value = self.eval_expr(value)?;
                self.bind(target.name, value);
                Ok(Flow::Normal)
            }

            StmtKind::AugAssign { target, op, value } => {
                let current = self.lookup(target.name).map_err(|e| e.at(&target.span))?;
                let rhs = self.eval_expr(value)?;
                let result = operators::binary(*op, &current, &rhs, self.budget.max_int_bits())?;
                self.bind(target.name, result);
                Ok(Flow::Normal)
            }

            StmtKind::If { branches, orelse } => {
                for (cond, body) in branches.iter() {
                    if self.eval_expr(cond)?.truthy() {
                        return self.exec_block(body);
                    }
                }
                self.exec_block(orelse)
            }

            StmtKind::While { cond, body } => {
                while self.eval_expr(cond)?.truthy() {
                    match self.exec_block(body)? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }

            StmtKind::For { target, iter, body } => {
                let iterable = self.eval_expr(iter)?;
                let items = iterable.iter_items().map_err(|e| e.at(&iter.span))?;
                for item in items {
                    self.budget.tick()?;
                    self.bind(target.name, item.clone());
                    match self.exec_block(body)? {
                        Flow::Normal | Flow::Continue => {}
                        Flow::Break => break,
                        flow @ Flow::Return(_) => return Ok(flow),
                    }
                }
                Ok(Flow::Normal)
            }

            StmtKind::Pass => Ok(Flow::Normal),
            StmtKind::Break => Ok(Flow::Break),
            StmtKind::Continue => Ok(Flow::Continue),

            StmtKind::Import { modules } => {
                // `math` is always in scope for attribute access; importing it
                // binds nothing new.
                for module in modules.iter() {
                    check_module(module)?;
                }
                Ok(Flow::Normal)
            }

            StmtKind::ImportFrom { module, names } => {
                check_module(module)?;
                for name in names.iter() {
                    let capability = stdlib::lookup(name.name).ok_or_else(|| {
                        RuntimeError::new(
                            ExceptionKind::ImportError,
                            format!("cannot import name '{}' from 'math'", name.name),
                        )
                        .at(&name.span)
                    })?;
                    self.bind(name.name, capability.value());
                }
                Ok(Flow::Normal)
            }

            StmtKind::Expr(expr) => {
                self.eval_expr(expr)?;
                Ok(Flow::Normal)
            }
        }
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn call(
        &mut self,
        func: Value<'a>,
        args: Args<'a>,
        span: &Span,
    ) -> Result<Value<'a>, ExecutionError> {
        match func {
            Value::Builtin(builtin) => {
                trace!(builtin = builtin.name(), argc = args.len(), "Calling builtin");
                builtin.call(&args, &mut self.budget).map_err(|e| e.at(span))
            }
            Value::Function(closure) => self.call_function(&closure, args),
            other => Err(RuntimeError::type_error(format!(
                "'{}' object is not callable",
                other.type_name()
            ))
            .at(span)
            .into()),
        }
    }

    fn call_function(
        &mut self,
        closure: &Closure<'a>,
        args: Args<'a>,
    ) -> Result<Value<'a>, ExecutionError> {
        let def = closure.def;
        if self.frames.len() >= self.max_call_depth {
            return Err(recursion_error().into());
        }

        let params = def.params;
        if args.len() > params.len() {
            return Err(RuntimeError::type_error(format!(
                "{}() takes {} positional argument{} but {} {} given",
                def.name.name,
                params.len(),
                if params.len() == 1 { "" } else { "s" },
                args.len(),
                if args.len() == 1 { "was" } else { "were" },
            ))
            .into());
        }

        let mut frame = Frame {
            local_names: local_names(def),
            locals: HashMap::with_capacity(params.len()),
        };
        let mut args = args.into_iter();
        let mut missing: SmallVec<[&str; 4]> = SmallVec::new();
        for (param, default) in params.iter().zip(&closure.defaults) {
            match args.next().or_else(|| default.clone()) {
                Some(value) => {
                    frame.locals.insert(param.name.name, value);
                }
                None => missing.push(param.name.name),
            }
        }
        if !missing.is_empty() {
            return Err(missing_arguments(def.name.name, &missing).into());
        }

        trace!(function = def.name.name, depth = self.frames.len(), "Entering function");
        self.frames.push(frame);
        let flow = self.exec_block(def.body);
        self.frames.pop();

        match flow? {
            Flow::Return(value) => Ok(value),
            _ => Ok(Value::None),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Evaluate an expression node.
    fn eval_expr(&mut self, expr: &'a Expr<'a>) -> Result<Value<'a>, ExecutionError> {
        if self.depth >= self.max_depth {
            return Err(recursion_error().at(&expr.span).into());
        }
        self.budget.tick()?;

        self.depth += 1;
        let result = self.eval_expr_inner(expr);
        self.depth -= 1;

        result.map_err(|e| e.at(&expr.span))
    }

    fn eval_expr_inner(&mut self, expr: &'a Expr<'a>) -> Result<Value<'a>, ExecutionError> {
        let max_int_bits = self.budget.max_int_bits();
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(literal_value(literal, max_int_bits)?),

            ExprKind::Name(name) => Ok(self.lookup(name)?),

            ExprKind::Attribute { value, attr } => {
                if let ExprKind::Name(MODULE_NAME) = value.kind {
                    return stdlib::lookup(attr.name)
                        .map(Capability::value)
                        .ok_or_else(|| {
                            RuntimeError::new(
                                ExceptionKind::AttributeError,
                                format!("module 'math' has no attribute '{}'", attr.name),
                            )
                            .at(&attr.span)
                            .into()
                        });
                }
                let base = self.eval_expr(value)?;
                Err(RuntimeError::new(
                    ExceptionKind::AttributeError,
                    format!("'{}' object has no attribute '{}'", base.type_name(), attr.name),
                )
                .at(&attr.span)
                .into())
            }

            ExprKind::Call { func, args } => {
                let func = self.eval_expr(func)?;
                let mut values = Args::with_capacity(args.len());
                for arg in args.iter() {
                    values.push(self.eval_expr(arg)?);
                }
                self.call(func, values, &expr.span)
            }

            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                Ok(operators::unary(*op, &value)?)
            }

            ExprKind::Binary { .. } => self.eval_binary_run(expr),

            ExprKind::Boolean { .. } => self.eval_boolean_run(expr),

            ExprKind::Comparison { left, links } => {
                let mut left = self.eval_expr(left)?;
                for (op, operand) in links.iter() {
                    let right = self.eval_expr(operand)?;
                    if !operators::compare(*op, &left, &right)? {
                        return Ok(Value::Bool(false));
                    }
                    left = right;
                }
                Ok(Value::Bool(true))
            }

            ExprKind::IfElse { .. } => {
                // `a if c else b if d else e` nests to the right.
                let mut current = expr;
                while let ExprKind::IfElse {
                    cond,
                    then_branch,
                    else_branch,
                } = &current.kind
                {
                    if self.eval_expr(cond)?.truthy() {
                        return self.eval_expr(then_branch);
                    }
                    current = *else_branch;
                    self.budget.tick()?;
                }
                self.eval_expr(current)
            }

            ExprKind::Tuple(items) => Ok(Value::Tuple(self.eval_items(items)?)),
            ExprKind::List(items) => Ok(Value::List(self.eval_items(items)?)),
        }
    }

    /// Evaluate `a op b op c ...` by walking the left spine in a loop, so a
    /// run of left-associative operators costs one level of depth in total.
    fn eval_binary_run(&mut self, expr: &'a Expr<'a>) -> Result<Value<'a>, ExecutionError> {
        let mut spine: SmallVec<[(BinaryOp, &'a Expr<'a>, &'a Span); 8]> = SmallVec::new();
        let mut leftmost = expr;
        while let ExprKind::Binary { op, left, right } = &leftmost.kind {
            spine.push((*op, *right, &leftmost.span));
            leftmost = *left;
        }

        let max_int_bits = self.budget.max_int_bits();
        let mut acc = self.eval_expr(leftmost)?;
        for (index, (op, right, span)) in spine.into_iter().enumerate().rev() {
            // The outermost node was already charged by `eval_expr`.
            if index > 0 {
                self.budget.tick()?;
            }
            let right = self.eval_expr(right)?;
            acc = operators::binary(op, &acc, &right, max_int_bits).map_err(|e| e.at(span))?;
        }
        Ok(acc)
    }

    // Same walk for `and`/`or`; each link short-circuits on the value so
    // far and yields the deciding operand itself.
    fn eval_boolean_run(&mut self, expr: &'a Expr<'a>) -> Result<Value<'a>, ExecutionError> {
        let mut spine: SmallVec<[(BoolOp, &'a Expr<'a>); 8]> = SmallVec::new();
        let mut leftmost = expr;
        while let ExprKind::Boolean { op, left, right } = &leftmost.kind {
            spine.push((*op, *right));
            leftmost = *left;
        }

        let mut value = self.eval_expr(leftmost)?;
        for (op, right) in spine.into_iter().rev() {
            value = match (op, value.truthy()) {
                (BoolOp::And, false) | (BoolOp::Or, true) => value,
                _ => self.eval_expr(right)?,
            };
        }
        Ok(value)
    }

    fn eval_items(&mut self, items: &'a [&'a Expr<'a>]) -> Result<Rc<[Value<'a>]>, ExecutionError> {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(self.eval_expr(item)?);
        }
        Ok(values.into())
    }
}

fn literal_value<'a>(literal: &Literal<'a>, max_int_bits: u64) -> Result<Value<'a>, RuntimeError> {
    match literal {
        Literal::Int(n) => Ok(Value::int(*n)),
        Literal::BigInt { digits, radix } => {
            let n = BigInt::parse_bytes(digits.as_bytes(), *radix).ok_or_else(|| {
                RuntimeError::value_error(format!("invalid integer literal '{}'", digits))
            })?;
            operators::check_int_bits(n, max_int_bits)
        }
        Literal::Float(x) => Ok(Value::Float(*x)),
        Literal::Imaginary(x) => Ok(Value::complex(0.0, *x)),
        Literal::Bool(b) => Ok(Value::Bool(*b)),
        Literal::None => Ok(Value::None),
    }
}

fn check_module(module: &Ident<'_>) -> Result<(), RuntimeError> {
    if module.name == MODULE_NAME {
        return Ok(());
    }
    Err(RuntimeError::new(
        ExceptionKind::ImportError,
        format!("No module named '{}'", module.name),
    )
    .at(&module.span))
}

fn recursion_error() -> RuntimeError {
    RuntimeError::new(
        ExceptionKind::RecursionError,
        "maximum recursion depth exceeded",
    )
}

fn missing_arguments(function: &str, missing: &[&str]) -> RuntimeError {
    let quoted: Vec<String> = missing.iter().map(|name| format!("'{}'", name)).collect();
    let names = match quoted.as_slice() {
        [one] => one.clone(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
        [] => String::new(),
    };
    RuntimeError::type_error(format!(
        "{}() missing {} required positional argument{}: {}",
        function,
        missing.len(),
        if missing.len() == 1 { "" } else { "s" },
        names
    ))
}

/// Names a function body binds: parameters, assignment and loop targets,
/// and names imported from `math`.
fn local_names<'a>(def: &'a FunctionDef<'a>) -> HashSet<&'a str> {
    fn collect<'a>(body: &'a [Stmt<'a>], names: &mut HashSet<&'a str>) {
        for stmt in body {
            match &stmt.kind {
                StmtKind::Assign { target, .. } | StmtKind::AugAssign { target, .. } => {
                    names.insert(target.name);
                }
                StmtKind::For { target, body, .. } => {
                    names.insert(target.name);
                    collect(body, names);
                }
                StmtKind::ImportFrom { names: imported, .. } => {
                    names.extend(imported.iter().map(|ident| ident.name));
                }
                StmtKind::If { branches, orelse } => {
                    for (_, branch) in branches.iter() {
                        collect(branch, names);
                    }
                    collect(orelse, names);
                }
                StmtKind::While { body, .. } => collect(body, names),
                StmtKind::FunctionDef(def) => {
                    names.insert(def.name.name);
                }
                StmtKind::Return(_)
                | StmtKind::Pass
                | StmtKind::Break
                | StmtKind::Continue
                | StmtKind::Import { .. }
                | StmtKind::Expr(_) => {}
            }
        }
    }

    let mut names: HashSet<&'a str> = def.params.iter().map(|p| p.name.name).collect();
    collect(def.body, &mut names);
    names
}
