use crate::error::{Level, impl_funky_error};
use crate::location::{Location, Span};

/// A user function reaches itself through its own calls; inlining it would
/// never terminate.
#[derive(Debug, Clone)]
pub struct RecursiveFunctionError {
    pub cycle: Vec<String>,
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl RecursiveFunctionError {
    pub fn with(cycle: Vec<String>, issuer: String, location: Option<Location>) -> Self {
        RecursiveFunctionError {
            message: format!("Recursive function definitions cannot be inlined: {}", cycle.join(" -> ")),
            cycle,
            level: Level::Error,
            issuer,
            location,
            span: None,
        }
    }
}

impl_funky_error!(RecursiveFunctionError);
