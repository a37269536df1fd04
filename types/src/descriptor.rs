//! The form descriptor: what a rendered form exposed.
//!
//! Serialized shape (the digest covers these exact bytes, so field order is
//! fixed by declaration order and `valid_values` is a `BTreeMap`):
//!
//! ```text
//! {
//!   "columns": ["title", "artist_id"],
//!   "namespaces": ["album"],
//!   "csrf": ["_csrf", "<token>"],
//!   "valid_values": {"artist_id": ["include", ["1", "2", null]]},
//!   "form_version": 3
//! }
//! ```
//!
//! `csrf`, `valid_values` and `form_version` are omitted when absent.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::constraint::Constraint;

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("form descriptor must expose at least one column")]
    EmptyColumns,
    #[error("form descriptor lists column {0:?} more than once")]
    DuplicateColumn(String),
    #[error("form descriptor constrains column {0:?} which it does not expose")]
    UnknownConstrainedColumn(String),
    #[error("form descriptor is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// CSRF field name and the token value active at render time.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct CsrfBinding {
    field: String,
    token: String,
}

impl CsrfBinding {
    pub fn new(field: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            token: token.into(),
        }
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

// Token values stay out of logs.
impl fmt::Debug for CsrfBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CsrfBinding")
            .field("field", &self.field)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl From<(String, String)> for CsrfBinding {
    fn from((field, token): (String, String)) -> Self {
        Self { field, token }
    }
}

impl From<CsrfBinding> for (String, String) {
    fn from(binding: CsrfBinding) -> Self {
        (binding.field, binding.token)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct RawDescriptor {
    columns: Vec<String>,
    #[serde(default)]
    namespaces: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    csrf: Option<CsrfBinding>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    valid_values: Option<BTreeMap<String, Constraint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    form_version: Option<Value>,
}

/// Metadata for one render pass, ready to be signed.
///
/// Invariant: `columns` is non-empty and duplicate-free, and every
/// constrained column is also an exposed column. Both construction and
/// deserialization enforce this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawDescriptor", into = "RawDescriptor")]
pub struct FormDescriptor {
    columns: Vec<String>,
    namespaces: Vec<String>,
    csrf: Option<CsrfBinding>,
    valid_values: BTreeMap<String, Constraint>,
    form_version: Option<Value>,
}

impl FormDescriptor {
    pub fn new<C, N>(columns: C, namespaces: N) -> Result<Self, DescriptorError>
    where
        C: IntoIterator,
        C::Item: Into<String>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        let columns: Vec<String> = columns.into_iter().map(Into::into).collect();
        check_columns(&columns)?;
        Ok(Self {
            columns,
            namespaces: namespaces.into_iter().map(Into::into).collect(),
            csrf: None,
            valid_values: BTreeMap::new(),
            form_version: None,
        })
    }

    #[must_use]
    pub fn with_csrf(mut self, binding: CsrfBinding) -> Self {
        self.csrf = Some(binding);
        self
    }

    #[must_use]
    pub fn with_form_version(mut self, version: Value) -> Self {
        self.form_version = Some(version);
        self
    }

    pub fn with_constraint(
        mut self,
        column: impl Into<String>,
        constraint: Constraint,
    ) -> Result<Self, DescriptorError> {
        let column = column.into();
        if !self.columns.contains(&column) {
            return Err(DescriptorError::UnknownConstrainedColumn(column));
        }
        self.valid_values.insert(column, constraint);
        Ok(self)
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    #[must_use]
    pub fn csrf(&self) -> Option<&CsrfBinding> {
        self.csrf.as_ref()
    }

    #[must_use]
    pub fn valid_values(&self) -> &BTreeMap<String, Constraint> {
        &self.valid_values
    }

    #[must_use]
    pub fn form_version(&self) -> Option<&Value> {
        self.form_version.as_ref()
    }

    /// Serialize to the exact bytes that get signed.
    pub fn to_payload(&self) -> Result<String, DescriptorError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_payload(payload: &str) -> Result<Self, DescriptorError> {
        Ok(serde_json::from_str(payload)?)
    }
}

fn check_columns(columns: &[String]) -> Result<(), DescriptorError> {
    if columns.is_empty() {
        return Err(DescriptorError::EmptyColumns);
    }
    for (i, column) in columns.iter().enumerate() {
        if columns[..i].contains(column) {
            return Err(DescriptorError::DuplicateColumn(column.clone()));
        }
    }
    Ok(())
}

impl TryFrom<RawDescriptor> for FormDescriptor {
    type Error = DescriptorError;

    fn try_from(raw: RawDescriptor) -> Result<Self, Self::Error> {
        check_columns(&raw.columns)?;
        let valid_values = raw.valid_values.unwrap_or_default();
        if let Some(column) = valid_values.keys().find(|c| !raw.columns.contains(c)) {
            return Err(DescriptorError::UnknownConstrainedColumn(column.clone()));
        }
        Ok(Self {
            columns: raw.columns,
            namespaces: raw.namespaces,
            csrf: raw.csrf,
            valid_values,
            form_version: raw.form_version,
        })
    }
}

impl From<FormDescriptor> for RawDescriptor {
    fn from(descriptor: FormDescriptor) -> Self {
        RawDescriptor {
            columns: descriptor.columns,
            namespaces: descriptor.namespaces,
            csrf: descriptor.csrf,
            valid_values: (!descriptor.valid_values.is_empty()).then_some(descriptor.valid_values),
            form_version: descriptor.form_version,
        }
    }
}
