//! Scalar names of matrix elements.
//!
//! Element (i, j) of `A` is `A` followed by the 1-based row and column, so
//! element (1, 2) of `A` is `A12`. Plain concatenation is ambiguous once an
//! index has two digits or the base already ends in a digit (`A1` (1,1) and
//! `A` (11,1) would both be `A111`), so those cases use `base_row_col`. Every
//! produced name is registered against its structured key and a clash is
//! reported instead of silently merging two variables.
use std::collections::HashMap;
use std::fmt;

use crate::error::FunkyErrorExt;
use crate::location::Location;

use super::err::NameCollisionError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementKey {
    pub base: String,
    pub row: usize,
    pub col: usize,
}

impl fmt::Display for ElementKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({},{})", self.base, self.row, self.col)
    }
}

/// Text name of element `(row, col)` of `base`.
pub fn element_name(base: &str, row: usize, col: usize) -> String {
    let base_ends_in_digit = base.chars().last().is_some_and(|c| c.is_ascii_digit());
    if !base_ends_in_digit && (1..=9).contains(&row) && (1..=9).contains(&col) {
        format!("{}{}{}", base, row, col)
    } else {
        format!("{}_{}_{}", base, row, col)
    }
}

/// Registry of every element name handed out during one compilation.
#[derive(Debug, Clone, Default)]
pub struct ElementNames {
    owners: HashMap<String, ElementKey>,
    scalars: HashMap<String, Option<Location>>,
}

impl ElementNames {
    pub fn new() -> Self {
        ElementNames::default()
    }

    /// Name of element `(row, col)` of `base`, registered on first use.
    pub fn name_for(
        &mut self,
        base: &str,
        row: usize,
        col: usize,
        location: Option<&Location>,
    ) -> Result<String, Box<dyn FunkyErrorExt>> {
        let name = element_name(base, row, col);
        let key = ElementKey { base: base.to_string(), row, col };

        if let Some(owner) = self.owners.get(&name) {
            if *owner != key {
                return Err(Box::new(NameCollisionError::new(
                    &name,
                    &format!("element {}", owner),
                    &format!("element {}", key),
                    "funkytrees.analyzers.shape.names".to_string(),
                    location.cloned(),
                )));
            }
            return Ok(name);
        }

        if let Some(declared) = self.scalars.get(&name) {
            let first = match declared {
                Some(loc) => format!("the scalar declared at {}", loc),
                None => "a scalar".to_string(),
            };
            return Err(Box::new(NameCollisionError::new(
                &name,
                &first,
                &format!("element {}", key),
                "funkytrees.analyzers.shape.names".to_string(),
                location.cloned(),
            )));
        }

        self.owners.insert(name.clone(), key);
        Ok(name)
    }

    /// Note a plain scalar write. Writing an existing element name directly is
    /// allowed and is not recorded.
    pub fn declare_scalar(&mut self, name: &str, location: Option<&Location>) {
        if !self.owners.contains_key(name) {
            self.scalars.entry(name.to_string()).or_insert_with(|| location.cloned());
        }
    }

    pub fn owner_of(&self, name: &str) -> Option<&ElementKey> {
        self.owners.get(name)
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}
