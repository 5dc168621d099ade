//! file: core/src/ir/lower/lowering_context.rs
//! description: per-compilation state shared by the lowering passes.
//!
//! `LoweringContext` owns the temporary counter, the shape table and the
//! element-name registry. One context lives for exactly one compilation and
//! is threaded by `&mut` through the inliner, the decomposer and the matrix
//! expander, so independent programs never share state.

use crate::analyzers::shape::{ElementNames, ShapeTable};

/// Prefix of generated temporaries when none is configured.
pub const DEFAULT_TEMP_PREFIX: &str = "dummy";

#[derive(Debug, Clone)]
pub struct LoweringContext {
    temp_prefix: String,
    next_temp: usize,
    pub shapes: ShapeTable,
    pub names: ElementNames,
}

impl LoweringContext {
    /// Create an empty lowering context.
    pub fn new(temp_prefix: &str) -> Self {
        LoweringContext::with_temp_counter(temp_prefix, 0)
    }

    /// Create a context whose first temporary is `<prefix><next_temp>`.
    pub fn with_temp_counter(temp_prefix: &str, next_temp: usize) -> Self {
        LoweringContext {
            temp_prefix: temp_prefix.to_string(),
            next_temp,
            shapes: ShapeTable::new(),
            names: ElementNames::new(),
        }
    }

    /// A temporary name never handed out before in this compilation.
    pub fn fresh_temp(&mut self) -> String {
        let name = format!("{}{}", self.temp_prefix, self.next_temp);
        self.next_temp += 1;
        name
    }

    /// `count` fresh temporaries, in order.
    pub fn fresh_temps(&mut self, count: usize) -> Vec<String> {
        (0..count).map(|_| self.fresh_temp()).collect()
    }

    pub fn temp_prefix(&self) -> &str {
        &self.temp_prefix
    }

    /// Counter value the next temporary will use.
    pub fn next_temp(&self) -> usize {
        self.next_temp
    }
}

impl Default for LoweringContext {
    fn default() -> Self {
        LoweringContext::new(DEFAULT_TEMP_PREFIX)
    }
}
