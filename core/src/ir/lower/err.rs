use crate::error::{Level, impl_funky_error};
use crate::location::{Location, Span};

/// A call site whose argument or output count does not fit the definition.
#[derive(Debug, Clone)]
pub struct ArityMismatchError {
    pub function: String,
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl ArityMismatchError {
    pub fn inputs(function: &str, expected: usize, found: usize, issuer: String, location: Option<Location>) -> Self {
        ArityMismatchError {
            function: function.to_string(),
            level: Level::Error,
            message: format!(
                "Function '{}' takes {} input(s) but was called with {}",
                function, expected, found
            ),
            issuer,
            location,
            span: None,
        }
    }

    pub fn outputs(function: &str, expected: usize, found: usize, issuer: String, location: Option<Location>) -> Self {
        ArityMismatchError {
            function: function.to_string(),
            level: Level::Error,
            message: format!(
                "Function '{}' returns {} output(s) but the call site binds {}",
                function, expected, found
            ),
            issuer,
            location,
            span: None,
        }
    }
}

impl_funky_error!(ArityMismatchError);
