//! The flat scalar program handed to the record emitter.

use std::fmt;

use log::warn;

use crate::ast::{Assignment, DEFAULT_ACTIVATOR, DEFAULT_PRIORITY, Expression, Statement};
use crate::location::Location;

/// One scalar assignment, the unit that becomes a setter record.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarAssignment {
    pub target: String,
    pub value: Expression,
    pub activator: String,
    pub priority: String,
    pub location: Option<Location>,
}

impl From<Assignment> for ScalarAssignment {
    fn from(a: Assignment) -> Self {
        ScalarAssignment {
            target: a.target,
            value: a.value,
            activator: a.activator,
            priority: a.priority,
            location: a.location,
        }
    }
}

impl fmt::Display for ScalarAssignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} := {}", self.target, self.value)?;
        if self.activator != DEFAULT_ACTIVATOR {
            write!(f, " $ {}", self.activator)?;
        }
        if self.priority != DEFAULT_PRIORITY {
            write!(f, " @ {}", self.priority)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScalarProgram {
    pub assignments: Vec<ScalarAssignment>,
}

impl ScalarProgram {
    /// Keep every assignment. Call statements left over (opaque primitives
    /// with explicit outputs) and unparsed lines have no setter form and are
    /// dropped with a warning.
    pub fn from_statements(statements: Vec<Statement>) -> Self {
        let mut assignments = Vec::with_capacity(statements.len());
        for statement in statements {
            match statement {
                Statement::Assignment(a) => assignments.push(ScalarAssignment::from(a)),
                Statement::Call(call) => match Assignment::try_from(call) {
                    Ok(a) => assignments.push(ScalarAssignment::from(a)),
                    Err(call) => warn!("dropping '{}': a multi-output call has no setter form", call),
                },
                Statement::Unparsed { text, location } => match location {
                    Some(loc) => warn!("dropping unparsed line at {}: '{}'", loc, text),
                    None => warn!("dropping unparsed line '{}'", text),
                },
            }
        }
        ScalarProgram { assignments }
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScalarAssignment> {
        self.assignments.iter()
    }
}

impl fmt::Display for ScalarProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for assignment in &self.assignments {
            writeln!(f, "{}", assignment)?;
        }
        Ok(())
    }
}
