//! Bind a sealed form to the CSRF context it was rendered under.
//!
//! The live token is always read from the current request's top-level
//! parameters, never from the sealed payload, and compared with the same
//! length-checked constant-time discipline as digests.

use formseal_types::{CsrfBinding, FormSealError, ParamMap, ParamValue, SealErrorKind};

use crate::signer::constant_time_eq;

/// Caller-supplied check of a live token against the session, consulted
/// after the binding comparison succeeds.
pub type CsrfValidator = dyn Fn(&str) -> bool + Send + Sync;

/// Verify the live CSRF token against the token bound at render time.
///
/// Forms rendered without CSRF protection carry no binding and pass.
pub fn check_binding(
    binding: Option<&CsrfBinding>,
    params: &ParamMap,
    validator: Option<&CsrfValidator>,
) -> Result<(), FormSealError> {
    let Some(binding) = binding else {
        return Ok(());
    };
    let mismatch = FormSealError::new(SealErrorKind::CsrfMismatch);

    let live = params
        .get(binding.field())
        .and_then(ParamValue::as_str)
        .ok_or(mismatch)?;
    if !constant_time_eq(binding.token().as_bytes(), live.as_bytes()) {
        return Err(mismatch);
    }
    if let Some(validator) = validator
        && !validator(live)
    {
        return Err(mismatch);
    }
    Ok(())
}
