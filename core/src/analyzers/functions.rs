//! Function table builder.
//!
//! Splits the parsed line stream into the user function definitions and the
//! residual top-level statements in one forward pass.

use std::collections::HashMap;

use log::{debug, warn};

use crate::ast::{Expression, FunctionHeader, Line, Statement};
use crate::location::Location;

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub outputs: Vec<String>,
    pub inputs: Vec<String>,
    pub body: Vec<Statement>,
    pub location: Option<Location>,
}

impl FunctionDefinition {
    fn from_header(header: FunctionHeader, body: Vec<Statement>) -> Self {
        FunctionDefinition {
            name: header.name,
            outputs: header.outputs,
            inputs: header.inputs,
            body,
            location: header.location,
        }
    }
}

/// Name -> definition, immutable once built.
#[derive(Debug, Clone, Default)]
pub struct FunctionTable {
    functions: HashMap<String, FunctionDefinition>,
    order: Vec<String>,
}

impl FunctionTable {
    pub fn new() -> Self {
        FunctionTable::default()
    }

    /// Register a definition, returning the one it replaces.
    pub fn insert(&mut self, definition: FunctionDefinition) -> Option<FunctionDefinition> {
        if !self.functions.contains_key(&definition.name) {
            self.order.push(definition.name.clone());
        }
        self.functions.insert(definition.name.clone(), definition)
    }

    pub fn lookup(&self, name: &str) -> Option<&FunctionDefinition> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Definitions in the order they first appeared.
    pub fn iter(&self) -> impl Iterator<Item = &FunctionDefinition> {
        self.order.iter().filter_map(|name| self.functions.get(name))
    }

    /// Names of user functions applied anywhere inside `expr`.
    pub fn calls_in_expression(&self, expr: &Expression) -> Vec<String> {
        let mut calls = Vec::new();
        self.collect_calls(expr, &mut calls);
        calls
    }

    fn collect_calls(&self, expr: &Expression, calls: &mut Vec<String>) {
        if let Some((name, _)) = expr.as_call() {
            if self.contains(&name) {
                calls.push(name);
            }
        }
        for child in expr.children() {
            self.collect_calls(child, calls);
        }
    }

    /// Names of user functions a statement calls, directly or in arguments.
    pub fn calls_in_statement(&self, statement: &Statement) -> Vec<String> {
        match statement {
            Statement::Assignment(a) => self.calls_in_expression(&a.value),
            Statement::Call(c) => {
                let mut calls = Vec::new();
                if self.contains(&c.callee) {
                    calls.push(c.callee.clone());
                }
                for arg in &c.args {
                    self.collect_calls(arg, &mut calls);
                }
                calls
            }
            Statement::Unparsed { .. } => Vec::new(),
        }
    }
}

/// Partition parsed lines into `(functions, residual statements)`.
///
/// Definitions do not nest: a terminator closes the only open definition, a
/// terminator with nothing open stays in the residual stream as an unparsed
/// line, and a definition still open at end of input is registered as is.
pub fn build_function_table(lines: Vec<Line>) -> (FunctionTable, Vec<Statement>) {
    let mut table = FunctionTable::new();
    let mut residual = Vec::new();
    let mut open: Option<(FunctionHeader, Vec<Statement>)> = None;

    let register = |table: &mut FunctionTable, header: FunctionHeader, body: Vec<Statement>| {
        let definition = FunctionDefinition::from_header(header, body);
        debug!(
            "registered function '{}' ({} outputs, {} inputs, {} statements)",
            definition.name,
            definition.outputs.len(),
            definition.inputs.len(),
            definition.body.len()
        );
        let name = definition.name.clone();
        if table.insert(definition).is_some() {
            warn!("function '{}' is defined more than once; the last definition wins", name);
        }
    };

    for line in lines {
        match line {
            Line::FunctionHeader(header) => {
                if let Some((previous, body)) = open.take() {
                    warn!(
                        "function '{}' was not terminated before '{}' started; closing it",
                        previous.name, header.name
                    );
                    register(&mut table, previous, body);
                }
                open = Some((header, Vec::new()));
            }
            Line::FunctionEnd { text, location } => match open.take() {
                Some((header, body)) => register(&mut table, header, body),
                None => {
                    warn!("'{}' with no open function left in place", text);
                    residual.push(Statement::Unparsed { text, location });
                }
            },
            Line::Statement(statement) => match open.as_mut() {
                Some((_, body)) => body.push(statement),
                None => residual.push(statement),
            },
        }
    }

    if let Some((header, body)) = open.take() {
        warn!("function '{}' is not terminated; registering it at end of input", header.name);
        register(&mut table, header, body);
    }

    (table, residual)
}
