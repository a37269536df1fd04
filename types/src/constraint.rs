//! Per-field constraints recorded at render time.
//!
//! Serialized as a two-element array `[kind, allowed]`:
//!
//! ```text
//! ["subset",  ["1", "2", null]]
//! ["include", ["t", "f"]]
//! ["valid",   true]
//! ```
//!
//! A `null` entry in an allowed list is the blank sentinel: the rendered
//! options permitted an empty selection.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Subset,
    Include,
    Valid,
}

impl ConstraintKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ConstraintKind::Subset => "subset",
            ConstraintKind::Include => "include",
            ConstraintKind::Valid => "valid",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an allowed list. `None` is the blank sentinel.
pub type AllowedValue = Option<String>;

/// Whether the rendered options offered an empty selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlankOption {
    Permitted,
    Forbidden,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawConstraint", into = "RawConstraint")]
pub enum Constraint {
    /// Every submitted element must appear in the allowed list.
    Subset(Vec<AllowedValue>),
    /// The submitted value must equal one allowed member.
    Include(Vec<AllowedValue>),
    /// Evaluated at render time; surfaced unchanged.
    Valid(bool),
}

impl Constraint {
    /// Build a `subset` constraint from rendered option values.
    pub fn subset<I, S>(options: I, blank: BlankOption) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::Subset(allowed_list(options, blank))
    }

    /// Build an `include` constraint from rendered option values.
    pub fn include<I, S>(options: I, blank: BlankOption) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Constraint::Include(allowed_list(options, blank))
    }

    #[must_use]
    pub const fn valid(valid: bool) -> Self {
        Constraint::Valid(valid)
    }

    #[must_use]
    pub const fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::Subset(_) => ConstraintKind::Subset,
            Constraint::Include(_) => ConstraintKind::Include,
            Constraint::Valid(_) => ConstraintKind::Valid,
        }
    }

    /// Allowed list, or `None` for a precomputed `valid` constraint.
    #[must_use]
    pub fn allowed(&self) -> Option<&[AllowedValue]> {
        match self {
            Constraint::Subset(values) | Constraint::Include(values) => Some(values),
            Constraint::Valid(_) => None,
        }
    }

    #[must_use]
    pub fn permits_blank(&self) -> bool {
        self.allowed()
            .is_some_and(|values| values.iter().any(Option::is_none))
    }
}

fn allowed_list<I, S>(options: I, blank: BlankOption) -> Vec<AllowedValue>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut values: Vec<AllowedValue> = options.into_iter().map(|v| Some(v.into())).collect();
    if blank == BlankOption::Permitted {
        values.push(None);
    }
    values
}

#[derive(Debug, Clone, Error)]
#[error("constraint kind {kind} does not accept the recorded allowed value shape")]
pub struct ConstraintShapeError {
    kind: ConstraintKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawAllowed {
    Values(Vec<AllowedValue>),
    Flag(bool),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawConstraint(ConstraintKind, RawAllowed);

impl TryFrom<RawConstraint> for Constraint {
    type Error = ConstraintShapeError;

    fn try_from(raw: RawConstraint) -> Result<Self, Self::Error> {
        match raw {
            RawConstraint(ConstraintKind::Subset, RawAllowed::Values(values)) => {
                Ok(Constraint::Subset(values))
            }
            RawConstraint(ConstraintKind::Include, RawAllowed::Values(values)) => {
                Ok(Constraint::Include(values))
            }
            RawConstraint(ConstraintKind::Valid, RawAllowed::Flag(valid)) => {
                Ok(Constraint::Valid(valid))
            }
            RawConstraint(kind, _) => Err(ConstraintShapeError { kind }),
        }
    }
}

impl From<Constraint> for RawConstraint {
    fn from(constraint: Constraint) -> Self {
        match constraint {
            Constraint::Subset(values) => {
                RawConstraint(ConstraintKind::Subset, RawAllowed::Values(values))
            }
            Constraint::Include(values) => {
                RawConstraint(ConstraintKind::Include, RawAllowed::Values(values))
            }
            Constraint::Valid(valid) => RawConstraint(ConstraintKind::Valid, RawAllowed::Flag(valid)),
        }
    }
}
