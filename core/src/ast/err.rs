use crate::error::{Level, impl_funky_error};
use crate::location::{Location, Span};

#[derive(Debug, Clone)]
pub struct SyntaxError {
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl SyntaxError {
    pub fn with(level: Level, message: String, issuer: String, location: Option<Location>, span: Option<Span>) -> Self {
        SyntaxError {
            level,
            message,
            issuer,
            location,
            span,
        }
    }
}

impl_funky_error!(SyntaxError);
