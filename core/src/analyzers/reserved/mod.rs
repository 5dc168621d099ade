use std::collections::HashSet;

use crate::analyzers::functions::FunctionTable;
use crate::ast::Statement;
use crate::error::Diagnostics;
use crate::location::Location;

pub mod err;

pub use err::ReservedNameError;

/// `<prefix><digits>`, the form of every generated temporary.
pub fn is_reserved_name(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(rest) => !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit()),
        None => false,
    }
}

fn statement_names(statement: &Statement) -> Vec<String> {
    match statement {
        Statement::Assignment(a) => {
            let mut names = vec![a.target.clone()];
            names.extend(a.value.referenced_names());
            names
        }
        Statement::Call(c) => {
            let mut names = c.outputs.clone();
            for arg in &c.args {
                names.extend(arg.referenced_names());
            }
            names
        }
        Statement::Unparsed { .. } => Vec::new(),
    }
}

/// Reject any source identifier a generated temporary could overwrite.
/// Each offending name is reported once, at its first occurrence.
pub fn check_reserved_names(statements: &[Statement], functions: &FunctionTable, prefix: &str) -> Result<(), Diagnostics> {
    let mut errors: Diagnostics = Vec::new();
    let mut reported: HashSet<String> = HashSet::new();

    let mut check = |names: Vec<String>, location: Option<&Location>| {
        for name in names {
            if is_reserved_name(&name, prefix) && reported.insert(name.clone()) {
                errors.push(Box::new(ReservedNameError::new(
                    &name,
                    prefix,
                    "funkytrees.analyzers.reserved".to_string(),
                    location.cloned(),
                )));
            }
        }
    };

    for def in functions.iter() {
        let formals = def.outputs.iter().chain(def.inputs.iter()).cloned().collect();
        check(formals, def.location.as_ref());
        for statement in &def.body {
            check(statement_names(statement), statement.location());
        }
    }
    for statement in statements {
        check(statement_names(statement), statement.location());
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
