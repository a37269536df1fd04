//! Signed form-state round trip.
//!
//! At render time an [`InputTracker`] records which fields a form exposed and
//! the constraints that applied to them; [`FormSeal::finish_render`] turns
//! that into a signed payload embedded as two hidden fields. On submission
//! [`FormSeal::parse`] (or [`FormSeal::apply`]) verifies the digest in
//! constant time, checks the CSRF binding, resolves the form's namespace and
//! re-applies the recorded constraints before any value is handed back.

mod composed;
pub mod csrf;
pub mod namespace;
mod seal;
pub mod signer;
mod tracker;
pub mod validation;

pub use composed::{Capability, ComposedForm, FormBase, FormKindCache};
pub use csrf::CsrfValidator;
pub use seal::{
    ErrorHook, FormSeal, FormTarget, HiddenField, ParsedSubmission, RecordState, SignedPayload,
};
pub use signer::Keyring;
pub use tracker::InputTracker;
