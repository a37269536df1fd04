//! Rejection taxonomy for sealed form submissions.
//!
//! Every failure surfaces as the same [`FormSealError`] type. Callers tell
//! failures apart only by [`SealErrorKind`], never by type, and every kind is
//! fatal to the parse/apply attempt that produced it.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SealErrorKind {
    /// The data field was not submitted.
    MissingData,
    /// The digest field was not submitted.
    MissingHmac,
    /// The recomputed digest disagrees with the submitted one.
    HmacMismatch,
    /// The live CSRF token disagrees with the token bound at render time.
    CsrfMismatch,
    /// A recorded namespace level is absent from the submitted parameters.
    MissingNamespace,
    /// The digest verified but the payload does not decode as a descriptor.
    InvalidData,
}

impl SealErrorKind {
    /// Wire tag for the kind, e.g. `"hmac_mismatch"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SealErrorKind::MissingData => "missing_data",
            SealErrorKind::MissingHmac => "missing_hmac",
            SealErrorKind::HmacMismatch => "hmac_mismatch",
            SealErrorKind::CsrfMismatch => "csrf_mismatch",
            SealErrorKind::MissingNamespace => "missing_namespace",
            SealErrorKind::InvalidData => "invalid_data",
        }
    }

    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            SealErrorKind::MissingData => "form data parameter not submitted",
            SealErrorKind::MissingHmac => "form data hmac parameter not submitted",
            SealErrorKind::HmacMismatch => "form data hmac does not match form data",
            SealErrorKind::CsrfMismatch => {
                "form data CSRF token does not match submitted CSRF token"
            }
            SealErrorKind::MissingNamespace => "no content in expected namespace",
            SealErrorKind::InvalidData => "form data could not be decoded",
        }
    }
}

impl fmt::Display for SealErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rejected submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", kind.message())]
pub struct FormSealError {
    kind: SealErrorKind,
}

impl FormSealError {
    #[must_use]
    pub const fn new(kind: SealErrorKind) -> Self {
        Self { kind }
    }

    #[must_use]
    pub const fn kind(&self) -> SealErrorKind {
        self.kind
    }
}

impl From<SealErrorKind> for FormSealError {
    fn from(kind: SealErrorKind) -> Self {
        Self::new(kind)
    }
}
