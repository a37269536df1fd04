//! Validation results and the store they merge into.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constraint::ConstraintKind;

/// Message attached to a column whose submitted value failed its constraint.
pub const INVALID_VALUE_MESSAGE: &str = "invalid value submitted";

/// Outcome of re-applying one recorded constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidation {
    pub kind: ConstraintKind,
    pub valid: bool,
}

impl FieldValidation {
    #[must_use]
    pub const fn new(kind: ConstraintKind, valid: bool) -> Self {
        Self { kind, valid }
    }
}

pub type Validations = BTreeMap<String, FieldValidation>;

/// Accumulated per-column validation flags for one model object.
///
/// Later merges overwrite earlier flags for the same column. The store only
/// flags columns; accepting or rejecting the submission is up to its owner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationState {
    flags: Validations,
}

impl ValidationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge(&mut self, validations: &Validations) {
        self.flags
            .extend(validations.iter().map(|(column, v)| (column.clone(), *v)));
    }

    #[must_use]
    pub fn get(&self, column: &str) -> Option<FieldValidation> {
        self.flags.get(column).copied()
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.flags.values().all(|v| v.valid)
    }

    /// Columns whose flag is invalid, in column order.
    pub fn invalid_columns(&self) -> impl Iterator<Item = &str> {
        self.flags
            .iter()
            .filter(|(_, v)| !v.valid)
            .map(|(column, _)| column.as_str())
    }

    /// `(column, message)` pairs for every invalid column.
    #[must_use]
    pub fn errors(&self) -> Vec<(String, &'static str)> {
        self.invalid_columns()
            .map(|column| (column.to_string(), INVALID_VALUE_MESSAGE))
            .collect()
    }

}
