//! Re-apply recorded constraints to submitted values.
//!
//! Results only flag columns. Whether an invalid flag rejects the whole
//! submission is decided by whoever owns the validation store.

use std::collections::BTreeMap;

use formseal_types::{
    AllowedValue, Constraint, FieldValidation, ParamMap, ParamValue, Validations,
};

/// Evaluate one constraint against a submitted value (`None` when absent).
#[must_use]
pub fn evaluate(constraint: &Constraint, submitted: Option<&ParamValue>) -> bool {
    match constraint {
        Constraint::Subset(allowed) => subset_allows(allowed, submitted),
        Constraint::Include(allowed) => include_allows(allowed, submitted),
        Constraint::Valid(valid) => *valid,
    }
}

/// Evaluate every recorded constraint against the resolved field level.
#[must_use]
pub fn validate(constraints: &BTreeMap<String, Constraint>, fields: &ParamMap) -> Validations {
    constraints
        .iter()
        .map(|(column, constraint)| {
            let valid = evaluate(constraint, fields.get(column));
            if !valid {
                tracing::debug!(
                    column = column.as_str(),
                    kind = %constraint.kind(),
                    "submitted value failed constraint"
                );
            }
            (column.clone(), FieldValidation::new(constraint.kind(), valid))
        })
        .collect()
}

// Absence and empty submissions are the empty set, which is a subset of
// anything.
fn subset_allows(allowed: &[AllowedValue], submitted: Option<&ParamValue>) -> bool {
    match submitted {
        None => true,
        Some(ParamValue::Str(value)) => value.is_empty() || member(allowed, value),
        Some(ParamValue::List(items)) => items.iter().all(|item| match item {
            ParamValue::Str(value) => value.is_empty() || member(allowed, value),
            ParamValue::List(_) | ParamValue::Map(_) => false,
        }),
        Some(ParamValue::Map(_)) => false,
    }
}

fn include_allows(allowed: &[AllowedValue], submitted: Option<&ParamValue>) -> bool {
    match submitted {
        None => allowed.iter().any(Option::is_none),
        Some(ParamValue::Str(value)) => member(allowed, value),
        Some(ParamValue::List(_) | ParamValue::Map(_)) => false,
    }
}

// The blank sentinel matches the empty string.
fn member(allowed: &[AllowedValue], value: &str) -> bool {
    allowed.iter().any(|entry| match entry {
        Some(entry) => entry == value,
        None => value.is_empty(),
    })
}
