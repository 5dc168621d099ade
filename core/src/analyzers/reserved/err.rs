use crate::error::{Level, impl_funky_error};
use crate::location::{Location, Span};

#[derive(Debug, Clone)]
pub struct ReservedNameError {
    pub name: String,
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl ReservedNameError {
    pub fn new(name: &str, prefix: &str, issuer: String, location: Option<Location>) -> Self {
        ReservedNameError {
            name: name.to_string(),
            level: Level::Error,
            message: format!(
                "'{}' collides with the generated temporaries ('{}' followed by digits); rename it",
                name, prefix
            ),
            issuer,
            location,
            span: None,
        }
    }
}

impl_funky_error!(ReservedNameError);
