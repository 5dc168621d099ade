use crate::error::{Level, impl_funky_error};
use crate::location::{Location, Span};

use super::symbol::VariableShape;

/// Operands whose shapes cannot be combined by the operator applied to them.
#[derive(Debug, Clone)]
pub struct ShapeMismatchError {
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl ShapeMismatchError {
    pub fn operands(
        left: &str,
        left_shape: VariableShape,
        op: &str,
        right: &str,
        right_shape: VariableShape,
        issuer: String,
        location: Option<Location>,
    ) -> Self {
        ShapeMismatchError {
            level: Level::Error,
            message: format!(
                "Shape mismatch: '{}' ({}) {} '{}' ({})",
                left, left_shape, op, right, right_shape
            ),
            issuer,
            location,
            span: None,
        }
    }

    pub fn with(message: String, issuer: String, location: Option<Location>) -> Self {
        ShapeMismatchError {
            level: Level::Error,
            message,
            issuer,
            location,
            span: None,
        }
    }
}

impl_funky_error!(ShapeMismatchError);

/// Index or slice applied to a variable with no registered matrix shape.
#[derive(Debug, Clone)]
pub struct UnknownShapeError {
    pub name: String,
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl UnknownShapeError {
    pub fn new(name: &str, issuer: String, location: Option<Location>) -> Self {
        UnknownShapeError {
            name: name.to_string(),
            level: Level::Error,
            message: format!("Cannot index or slice '{}': it has no known matrix shape", name),
            issuer,
            location,
            span: None,
        }
    }

    pub fn with(name: &str, message: String, issuer: String, location: Option<Location>) -> Self {
        UnknownShapeError {
            name: name.to_string(),
            level: Level::Error,
            message,
            issuer,
            location,
            span: None,
        }
    }
}

impl_funky_error!(UnknownShapeError);

/// Index or slice outside the registered shape, or a zero-sized constructor.
#[derive(Debug, Clone)]
pub struct IndexOutOfBoundsError {
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl IndexOutOfBoundsError {
    pub fn index(name: &str, access: &str, shape: VariableShape, issuer: String, location: Option<Location>) -> Self {
        IndexOutOfBoundsError {
            level: Level::Error,
            message: format!("Index {} is outside '{}' of shape {}", access, name, shape),
            issuer,
            location,
            span: None,
        }
    }

    pub fn with(message: String, issuer: String, location: Option<Location>) -> Self {
        IndexOutOfBoundsError {
            level: Level::Error,
            message,
            issuer,
            location,
            span: None,
        }
    }
}

impl_funky_error!(IndexOutOfBoundsError);

/// Two distinct matrix elements, or an element and a plain scalar, would
/// share one setter variable.
#[derive(Debug, Clone)]
pub struct NameCollisionError {
    pub name: String,
    level: Level,
    message: String,
    issuer: String,
    location: Option<Location>,
    span: Option<Span>,
}

impl NameCollisionError {
    pub fn new(name: &str, first: &str, second: &str, issuer: String, location: Option<Location>) -> Self {
        NameCollisionError {
            name: name.to_string(),
            level: Level::Error,
            message: format!("Variable name '{}' would stand for both {} and {}", name, first, second),
            issuer,
            location,
            span: None,
        }
    }
}

impl_funky_error!(NameCollisionError);
