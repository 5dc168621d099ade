use std::collections::BTreeMap;

use serde::Serialize;

use super::symbol::VariableShape;

/// Name -> shape of every variable currently holding a matrix.
///
/// Absence means scalar. Entries are overwritten on every write, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ShapeTable {
    shapes: BTreeMap<String, VariableShape>,
}

impl ShapeTable {
    pub fn new() -> Self {
        ShapeTable::default()
    }

    // ------- Write Helpers -------

    /// Record the shape of a write. A scalar shape removes the entry.
    pub fn record(&mut self, name: &str, shape: VariableShape) {
        if shape.is_matrix {
            self.shapes.insert(name.to_string(), shape);
        } else {
            self.mark_scalar(name);
        }
    }

    pub fn mark_scalar(&mut self, name: &str) -> Option<VariableShape> {
        self.shapes.remove(name)
    }

    // ------- Read Helpers -------

    pub fn lookup(&self, name: &str) -> Option<&VariableShape> {
        self.shapes.get(name)
    }

    /// Shape of `name`, scalar when unregistered.
    pub fn shape_of(&self, name: &str) -> VariableShape {
        self.shapes.get(name).copied().unwrap_or_default()
    }

    pub fn is_matrix(&self, name: &str) -> bool {
        self.shapes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Entries sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &VariableShape)> {
        self.shapes.iter()
    }
}
