//! Lowering passes from parsed statements to scalar assignments.

pub mod decompose;
pub mod err;
pub mod expand;
pub mod inline;
pub mod lowering_context;

pub use decompose::{decompose_assignment, decompose_statements};
pub use err::ArityMismatchError;
pub use expand::{expand_assignment, expand_matrices};
pub use inline::inline_calls;
pub use lowering_context::{DEFAULT_TEMP_PREFIX, LoweringContext};
