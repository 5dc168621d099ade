//! file: core/src/ir/lower/inline.rs
//! description: call inlining with denesting.
//!
//! Replaces every call to a user function by the function body, with formal
//! parameters substituted by the actual ones on the expression tree. Calls
//! nested in arguments or in ordinary expressions are hoisted first,
//! innermost first, into call statements whose outputs are fresh
//! temporaries. Calls to names that are not user functions are opaque
//! primitives and pass through.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};

use crate::analyzers::acyclic::RecursiveFunctionError;
use crate::analyzers::functions::{FunctionDefinition, FunctionTable};
use crate::ast::{Assignment, CallStatement, DEFAULT_ACTIVATOR, DEFAULT_PRIORITY, Expression, Statement};
use crate::error::Diagnostics;
use crate::location::Location;

use super::err::ArityMismatchError;
use super::lowering_context::LoweringContext;

const ISSUER: &str = "funkytrees.ir.lower.inline";

/// Inline every user function call in `statements`.
///
/// All arity errors of the program are collected before failing.
pub fn inline_calls(
    statements: Vec<Statement>,
    functions: &FunctionTable,
    ctx: &mut LoweringContext,
) -> Result<Vec<Statement>, Diagnostics> {
    let before = statements.len();
    let mut inliner = Inliner { functions, ctx, errors: Vec::new() };
    let mut out = Vec::new();
    for statement in statements {
        inliner.statement(statement, 0, &mut out);
    }

    if !inliner.errors.is_empty() {
        return Err(inliner.errors);
    }
    debug!("inlining turned {} statements into {}", before, out.len());
    Ok(out)
}

/// Activator, priority and location of the statement being lowered, inherited
/// by everything generated on its behalf.
struct CallSite {
    activator: String,
    priority: String,
    location: Option<Location>,
}

impl CallSite {
    fn assignment(&self, target: &str, value: Expression) -> Statement {
        Statement::Assignment(Assignment {
            target: target.to_string(),
            value,
            activator: self.activator.clone(),
            priority: self.priority.clone(),
            location: self.location.clone(),
        })
    }
}

/// Formal -> actual bindings of one inlined body.
struct Frame {
    bindings: HashMap<String, Expression>,
    // formal inputs already redirected to a local temporary
    rebound: HashSet<String>,
}

struct Inliner<'a> {
    functions: &'a FunctionTable,
    ctx: &'a mut LoweringContext,
    errors: Diagnostics,
}

impl<'a> Inliner<'a> {
    fn user_call(&self, expr: &Expression) -> Option<(String, Vec<Expression>)> {
        expr.as_call().filter(|(name, _)| self.functions.contains(name))
    }

    fn statement(&mut self, statement: Statement, depth: usize, out: &mut Vec<Statement>) {
        match statement {
            Statement::Assignment(assignment) => {
                // `out := f(..)` is sugar for `[out] := f(..)`
                if let Some((callee, args)) = self.user_call(&assignment.value) {
                    let call = CallStatement {
                        outputs: vec![assignment.target],
                        callee,
                        args,
                        activator: assignment.activator,
                        priority: assignment.priority,
                        location: assignment.location,
                    };
                    self.call(call, depth, out);
                    return;
                }

                let site = CallSite {
                    activator: assignment.activator.clone(),
                    priority: assignment.priority.clone(),
                    location: assignment.location.clone(),
                };
                let mut value = assignment.value;
                self.denest_expression(&mut value, &site, depth, out);
                out.push(Statement::Assignment(Assignment { value, ..assignment }));
            }
            Statement::Call(call) => self.call(call, depth, out),
            unparsed => out.push(unparsed),
        }
    }

    fn call(&mut self, call: CallStatement, depth: usize, out: &mut Vec<Statement>) {
        // A chain deeper than the number of functions has to revisit one.
        if depth > self.functions.len() {
            self.errors.push(Box::new(RecursiveFunctionError::with(
                vec![call.callee.clone()],
                ISSUER.to_string(),
                call.location.clone(),
            )));
            return;
        }

        let site = CallSite {
            activator: call.activator.clone(),
            priority: call.priority.clone(),
            location: call.location.clone(),
        };
        let args = self.denest_arguments(call.args, &site, depth, out);

        let functions = self.functions;
        let Some(def) = functions.lookup(&call.callee) else {
            out.push(Statement::Call(CallStatement { args, ..call }));
            return;
        };

        if args.len() != def.inputs.len() {
            self.errors.push(Box::new(ArityMismatchError::inputs(
                &def.name,
                def.inputs.len(),
                args.len(),
                ISSUER.to_string(),
                call.location.clone(),
            )));
            return;
        }
        if call.outputs.len() > def.outputs.len() {
            self.errors.push(Box::new(ArityMismatchError::outputs(
                &def.name,
                def.outputs.len(),
                call.outputs.len(),
                ISSUER.to_string(),
                call.location.clone(),
            )));
            return;
        }

        trace!("inlining '{}' at depth {}", def.name, depth);

        // Inputs first, outputs second: a name in both lists binds to the output.
        let mut frame = Frame { bindings: HashMap::new(), rebound: HashSet::new() };
        for (formal, actual) in def.inputs.iter().zip(args) {
            let atom = if actual.is_atom() {
                actual
            } else {
                let temp = self.ctx.fresh_temp();
                out.push(site.assignment(&temp, actual));
                Expression::identifier(&temp)
            };
            frame.bindings.insert(formal.clone(), atom);
        }
        let mut outputs = call.outputs;
        while outputs.len() < def.outputs.len() {
            outputs.push(self.ctx.fresh_temp());
        }
        for (formal, actual) in def.outputs.iter().zip(&outputs) {
            frame.bindings.insert(formal.clone(), Expression::identifier(actual));
        }

        for body_statement in &def.body {
            let instance = self.instantiate(body_statement, def, &mut frame, &site);
            self.statement(instance, depth + 1, out);
        }
    }

    /// Hoist user calls out of call arguments. A call that is a whole
    /// argument contributes all of its outputs.
    fn denest_arguments(
        &mut self,
        args: Vec<Expression>,
        site: &CallSite,
        depth: usize,
        out: &mut Vec<Statement>,
    ) -> Vec<Expression> {
        let mut result = Vec::with_capacity(args.len());
        for mut arg in args {
            if let Some((callee, inner)) = self.user_call(&arg) {
                let temps = self.nested_call(callee, inner, site, depth, out);
                result.extend(temps.iter().map(|t| Expression::identifier(t)));
            } else {
                self.denest_expression(&mut arg, site, depth, out);
                result.push(arg);
            }
        }
        result
    }

    /// Replace every user call inside `expr` by its first output.
    fn denest_expression(&mut self, expr: &mut Expression, site: &CallSite, depth: usize, out: &mut Vec<Statement>) {
        if let Some((callee, args)) = self.user_call(expr) {
            let temps = self.nested_call(callee, args, site, depth, out);
            if let Some(first) = temps.first() {
                *expr = Expression::identifier(first);
            }
            return;
        }
        for child in expr.children_mut() {
            self.denest_expression(child, site, depth, out);
        }
    }

    fn nested_call(
        &mut self,
        callee: String,
        args: Vec<Expression>,
        site: &CallSite,
        depth: usize,
        out: &mut Vec<Statement>,
    ) -> Vec<String> {
        let count = self.functions.lookup(&callee).map_or(1, |def| def.outputs.len()).max(1);
        let temps = self.ctx.fresh_temps(count);
        let call = CallStatement {
            outputs: temps.clone(),
            callee,
            args,
            activator: site.activator.clone(),
            priority: site.priority.clone(),
            location: site.location.clone(),
        };
        self.call(call, depth, out);
        temps
    }

    /// One body statement with formals replaced by actuals.
    fn instantiate(
        &mut self,
        statement: &Statement,
        def: &FunctionDefinition,
        frame: &mut Frame,
        site: &CallSite,
    ) -> Statement {
        match statement {
            Statement::Assignment(a) => {
                // the right-hand side reads the bindings in force before the write
                let value = substitute(&a.value, &frame.bindings);
                let activator = substitute_tokens(&a.activator, &frame.bindings);
                let priority = substitute_tokens(&a.priority, &frame.bindings);
                let target = self.bind_target(&a.target, def, frame);
                Statement::Assignment(Assignment {
                    target,
                    value,
                    activator: inherit(activator, DEFAULT_ACTIVATOR, &site.activator),
                    priority: inherit(priority, DEFAULT_PRIORITY, &site.priority),
                    location: a.location.clone(),
                })
            }
            Statement::Call(c) => {
                let args = c.args.iter().map(|arg| substitute(arg, &frame.bindings)).collect();
                let activator = substitute_tokens(&c.activator, &frame.bindings);
                let priority = substitute_tokens(&c.priority, &frame.bindings);
                let outputs = c.outputs.iter().map(|o| self.bind_target(o, def, frame)).collect();
                Statement::Call(CallStatement {
                    outputs,
                    callee: c.callee.clone(),
                    args,
                    activator: inherit(activator, DEFAULT_ACTIVATOR, &site.activator),
                    priority: inherit(priority, DEFAULT_PRIORITY, &site.priority),
                    location: c.location.clone(),
                })
            }
            Statement::Unparsed { text, location } => Statement::Unparsed {
                text: substitute_tokens(text, &frame.bindings),
                location: location.clone(),
            },
        }
    }

    /// Name actually written when a body statement writes `target`. Writes to
    /// a formal input go to a local temporary so the caller's value survives.
    fn bind_target(&mut self, target: &str, def: &FunctionDefinition, frame: &mut Frame) -> String {
        let input_only = def.inputs.iter().any(|i| i == target) && !def.outputs.iter().any(|o| o == target);
        if input_only && !frame.rebound.contains(target) {
            let temp = self.ctx.fresh_temp();
            frame.bindings.insert(target.to_string(), Expression::identifier(&temp));
            frame.rebound.insert(target.to_string());
        }
        rename(target, &frame.bindings)
    }
}

fn inherit(own: String, default: &str, site: &str) -> String {
    if own == default { site.to_string() } else { own }
}

fn rename(name: &str, bindings: &HashMap<String, Expression>) -> String {
    match bindings.get(name) {
        Some(Expression::Identifier { name }) => name.clone(),
        _ => name.to_string(),
    }
}

/// Replace whole identifier nodes (and index/slice bases) bound in `bindings`.
pub fn substitute(expr: &Expression, bindings: &HashMap<String, Expression>) -> Expression {
    match expr {
        Expression::Identifier { name } => bindings.get(name).cloned().unwrap_or_else(|| expr.clone()),
        Expression::Binary { left, op, right } => {
            Expression::binary(substitute(left, bindings), *op, substitute(right, bindings))
        }
        Expression::Index { base, row, col } => Expression::Index { base: rename(base, bindings), row: *row, col: *col },
        Expression::RowSlice { base, row } => Expression::RowSlice { base: rename(base, bindings), row: *row },
        Expression::ColSlice { base, col } => Expression::ColSlice { base: rename(base, bindings), col: *col },
        Expression::SubSlice { base, rows, cols } => Expression::SubSlice {
            base: rename(base, bindings),
            rows: *rows,
            cols: *cols,
        },
        Expression::Call { name, args } => Expression::Call {
            name: name.clone(),
            args: args.iter().map(|arg| substitute(arg, bindings)).collect(),
        },
        Expression::Verbatim { text } => Expression::Verbatim { text: substitute_tokens(text, bindings) },
        Expression::Number { .. } | Expression::Construct { .. } => expr.clone(),
    }
}

/// Token-wise substitution for text kept outside the tree (activators,
/// priorities, verbatim right-hand sides). Only whole identifier tokens are
/// replaced; runs starting with a digit are numbers.
pub fn substitute_tokens(text: &str, bindings: &HashMap<String, Expression>) -> String {
    if bindings.is_empty() {
        return text.to_string();
    }
    let mut result = String::with_capacity(text.len());
    let mut token = String::new();
    let flush = |token: &mut String, result: &mut String| {
        let starts_with_letter = token.chars().next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        match bindings.get(token.as_str()) {
            Some(bound) if starts_with_letter => result.push_str(&bound.to_string()),
            _ => result.push_str(token),
        }
        token.clear();
    };
    for c in text.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            token.push(c);
        } else {
            flush(&mut token, &mut result);
            result.push(c);
        }
    }
    flush(&mut token, &mut result);
    result
}
