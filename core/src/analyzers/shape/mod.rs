//! Per-variable shape tracking for the matrix expander.

pub mod err;
pub mod names;
pub mod symbol;
pub mod table;

pub use err::{IndexOutOfBoundsError, NameCollisionError, ShapeMismatchError, UnknownShapeError};
pub use names::{ElementKey, ElementNames, element_name};
pub use symbol::VariableShape;
pub use table::ShapeTable;
