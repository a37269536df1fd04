//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use formseal_core::{FormSeal, SignedPayload};
use formseal_types::{ParamMap, SealSettings, SecretKey, params_from_json};
use serde_json::Value;

pub const SECRET: &str = "integration-test-secret-0123456789";

pub fn settings() -> SealSettings {
    SealSettings::new(SecretKey::try_from(SECRET).expect("test secret is non-empty"))
}

pub fn seal() -> FormSeal {
    FormSeal::new(settings())
}

/// Build a submission: `body` as the browser-posted parameters plus the two
/// sealed hidden fields.
pub fn submit(payload: &SignedPayload, body: &Value) -> ParamMap {
    let mut params = params_from_json(body).expect("submission body must be an object");
    payload.submit_into(&mut params);
    params
}
