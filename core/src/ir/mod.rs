pub mod lower;
pub mod program;

pub use self::lower::{LoweringContext, decompose_statements, expand_matrices, inline_calls};
pub use self::program::{ScalarAssignment, ScalarProgram};
