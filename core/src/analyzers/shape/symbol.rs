use std::fmt;

use serde::{Deserialize, Serialize};

/// Shape of one variable. Scalars are `1x1` with `is_matrix == false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VariableShape {
    pub is_matrix: bool,
    pub rows: usize,
    pub cols: usize,
}

impl VariableShape {
    pub fn scalar() -> Self {
        VariableShape { is_matrix: false, rows: 1, cols: 1 }
    }

    pub fn matrix(rows: usize, cols: usize) -> Self {
        VariableShape { is_matrix: true, rows, cols }
    }

    pub fn element_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn same_dims(&self, other: &VariableShape) -> bool {
        self.rows == other.rows && self.cols == other.cols
    }

    /// Whether `(row, col)` is a valid 1-based position.
    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= 1 && col >= 1 && row <= self.rows && col <= self.cols
    }

    /// Every 1-based position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = (usize, usize)> {
        let cols = self.cols;
        (1..=self.rows).flat_map(move |r| (1..=cols).map(move |c| (r, c)))
    }
}

impl Default for VariableShape {
    fn default() -> Self {
        VariableShape::scalar()
    }
}

impl fmt::Display for VariableShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_matrix {
            write!(f, "{}x{}", self.rows, self.cols)
        } else {
            write!(f, "scalar")
        }
    }
}
