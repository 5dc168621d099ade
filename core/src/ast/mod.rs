//! Source front end: line normalization, the `pest` grammar and the typed
//! statement/expression tree every later stage works on.

pub mod err;
pub mod expr;
pub mod kind;
pub mod node;
pub mod normalize;
pub mod rules;
pub mod stmt;

pub use crate::error::FunkyErrorExt;
pub use expr::{parse_expression, parse_expression_at};
pub use kind::{BinaryOperator, Constructor, Expression, SliceRange};
pub use node::{
    Assignment, CallStatement, DEFAULT_ACTIVATOR, DEFAULT_PRIORITY, FunctionHeader, Line, Statement,
};
pub use normalize::{SourceLine, normalize_source};
pub use rules::{Rule, RulesParser};
pub use stmt::parse_line;

use crate::script::Script;

/// Normalize and parse every line of a script, in source order.
pub fn generate_lines_from_source(script: &Script) -> Vec<Line> {
    normalize_source(&script.content)
        .iter()
        .map(|line| parse_line(line, &script.name))
        .collect()
}
