use std::fmt;

use crate::location::Location;

use super::kind::Expression;

/// Activator used when a statement does not carry `$ activator`.
pub const DEFAULT_ACTIVATOR: &str = "1";
/// Priority used when a statement does not carry `@ priority`.
pub const DEFAULT_PRIORITY: &str = "0";

/// `target := value [$ activator] [@ priority]`
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub target: String,
    pub value: Expression,
    pub activator: String,
    pub priority: String,
    pub location: Option<Location>,
}

impl Assignment {
    pub fn new(target: &str, value: Expression) -> Self {
        Assignment {
            target: target.to_string(),
            value,
            activator: DEFAULT_ACTIVATOR.to_string(),
            priority: DEFAULT_PRIORITY.to_string(),
            location: None,
        }
    }

    pub fn with_activator(mut self, activator: &str) -> Self {
        self.activator = activator.to_string();
        self
    }

    pub fn with_priority(mut self, priority: &str) -> Self {
        self.priority = priority.to_string();
        self
    }

    /// A new assignment that inherits activator, priority and location.
    pub fn derive(&self, target: &str, value: Expression) -> Self {
        Assignment {
            target: target.to_string(),
            value,
            activator: self.activator.clone(),
            priority: self.priority.clone(),
            location: self.location.clone(),
        }
    }
}

/// `[out1, out2] := callee(arg1, arg2) [$ activator] [@ priority]`
#[derive(Debug, Clone, PartialEq)]
pub struct CallStatement {
    pub outputs: Vec<String>,
    pub callee: String,
    pub args: Vec<Expression>,
    pub activator: String,
    pub priority: String,
    pub location: Option<Location>,
}

/// A call binding exactly one output is the assignment `out := callee(args)`.
/// Any other output count is handed back unchanged.
impl TryFrom<CallStatement> for Assignment {
    type Error = CallStatement;

    fn try_from(call: CallStatement) -> Result<Self, Self::Error> {
        if call.outputs.len() != 1 {
            return Err(call);
        }
        let CallStatement { mut outputs, callee, args, activator, priority, location } = call;
        Ok(Assignment {
            target: outputs.remove(0),
            value: Expression::Call { name: callee, args },
            activator,
            priority,
            location,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment(Assignment),
    Call(CallStatement),
    /// A line that matched no statement form, kept verbatim.
    Unparsed { text: String, location: Option<Location> },
}

impl Statement {
    pub fn location(&self) -> Option<&Location> {
        match self {
            Statement::Assignment(a) => a.location.as_ref(),
            Statement::Call(c) => c.location.as_ref(),
            Statement::Unparsed { location, .. } => location.as_ref(),
        }
    }
}

/// `function [outputs] = name(inputs)`
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionHeader {
    pub name: String,
    pub outputs: Vec<String>,
    pub inputs: Vec<String>,
    pub location: Option<Location>,
}

/// A parsed source line.
#[derive(Debug, Clone, PartialEq)]
pub enum Line {
    FunctionHeader(FunctionHeader),
    /// `end` / `endfunction`; `text` keeps the line for when no definition is open.
    FunctionEnd { text: String, location: Option<Location> },
    Statement(Statement),
}

fn write_trailer(f: &mut fmt::Formatter<'_>, activator: &str, priority: &str) -> fmt::Result {
    if activator != DEFAULT_ACTIVATOR {
        write!(f, " $ {}", activator)?;
    }
    if priority != DEFAULT_PRIORITY {
        write!(f, " @ {}", priority)?;
    }
    Ok(())
}

impl fmt::Display for Assignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} := {}", self.target, self.value)?;
        write_trailer(f, &self.activator, &self.priority)
    }
}

impl fmt::Display for CallStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self.args.iter().map(|a| a.to_string()).collect::<Vec<_>>();
        write!(f, "[{}] := {}({})", self.outputs.join(", "), self.callee, args.join(", "))?;
        write_trailer(f, &self.activator, &self.priority)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Assignment(a) => write!(f, "{}", a),
            Statement::Call(c) => write!(f, "{}", c),
            Statement::Unparsed { text, .. } => write!(f, "{}", text),
        }
    }
}

impl fmt::Display for FunctionHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "function [{}] = {}({})",
            self.outputs.join(", "),
            self.name,
            self.inputs.join(", ")
        )
    }
}
