//! Sealed forms are bound to the CSRF token they were rendered with.

use formseal_core::InputTracker;
use formseal_types::{CsrfBinding, SealErrorKind};
use serde_json::json;

use crate::common::{seal, submit};

fn bound_payload(token: &str) -> formseal_core::SignedPayload {
    let mut pass = InputTracker::new(["post"]);
    pass.record("body", None);
    pass.bind_csrf(CsrfBinding::new("_csrf", token));
    seal().finish_render(pass).unwrap().unwrap()
}

#[test]
fn same_session_token_passes() {
    let payload = bound_payload("T1");
    let params = submit(&payload, &json!({"_csrf": "T1", "post": {"body": "hi"}}));
    assert!(seal().parse(&params).is_ok());
}

#[test]
fn other_session_token_is_csrf_mismatch() {
    let payload = bound_payload("T1");
    let params = submit(&payload, &json!({"_csrf": "T2", "post": {"body": "hi"}}));
    assert_eq!(
        seal().parse(&params).unwrap_err().kind(),
        SealErrorKind::CsrfMismatch
    );
}

#[test]
fn missing_live_token_is_csrf_mismatch() {
    let payload = bound_payload("T1");
    let params = submit(&payload, &json!({"post": {"body": "hi"}}));
    assert_eq!(
        seal().parse(&params).unwrap_err().kind(),
        SealErrorKind::CsrfMismatch
    );
}

#[test]
fn nested_token_is_not_the_live_token() {
    let payload = bound_payload("T1");
    let params = submit(&payload, &json!({"post": {"body": "hi", "_csrf": "T1"}}));
    assert_eq!(
        seal().parse(&params).unwrap_err().kind(),
        SealErrorKind::CsrfMismatch
    );
}

#[test]
fn csrf_is_checked_before_values_are_resolved() {
    let payload = bound_payload("T1");
    // Namespace is also missing, but the CSRF failure is reported.
    let params = submit(&payload, &json!({"_csrf": "T2"}));
    assert_eq!(
        seal().parse(&params).unwrap_err().kind(),
        SealErrorKind::CsrfMismatch
    );
}

#[test]
fn unbound_form_ignores_csrf_field() {
    let mut pass = InputTracker::new(["post"]);
    pass.record("body", None);
    let payload = seal().finish_render(pass).unwrap().unwrap();
    let params = submit(&payload, &json!({"_csrf": "anything", "post": {"body": "hi"}}));
    assert!(seal().parse(&params).is_ok());
}

#[test]
fn session_validator_can_reject_replayed_token() {
    let payload = bound_payload("T1");
    let params = submit(&payload, &json!({"_csrf": "T1", "post": {"body": "hi"}}));
    let strict = seal().with_csrf_validator(|token| token == "T-current");
    assert_eq!(
        strict.parse(&params).unwrap_err().kind(),
        SealErrorKind::CsrfMismatch
    );
}
