pub mod acyclic;
pub mod functions;
pub mod reserved;
pub mod shape;

pub use acyclic::analyze_acyclic_functions;
pub use functions::{FunctionDefinition, FunctionTable, build_function_table};
pub use reserved::check_reserved_names;
pub use shape::{ElementNames, ShapeTable, VariableShape};
