//! Tampered payloads and digests never verify.

use formseal_core::signer::DIGEST_HEX_LEN;
use formseal_types::{
    BlankOption, Constraint, CsrfBinding, FormDescriptor, ParamMap, ParamValue, SealErrorKind,
};
use serde_json::json;

use crate::common::{seal, submit};

fn descriptor() -> FormDescriptor {
    FormDescriptor::new(["name", "artist_id"], ["album"])
        .unwrap()
        .with_csrf(CsrfBinding::new("_csrf", "T1"))
        .with_constraint(
            "artist_id",
            Constraint::include(["1", "2"], BlankOption::Forbidden),
        )
        .unwrap()
}

fn body() -> serde_json::Value {
    json!({"_csrf": "T1", "album": {"name": "x", "artist_id": "1"}})
}

fn replace(params: &mut ParamMap, field: &str, value: String) {
    params.insert(field.to_string(), ParamValue::Str(value));
}

#[test]
fn untouched_submission_verifies() {
    let seal = seal();
    let payload = seal.seal(&descriptor()).unwrap();
    assert!(seal.parse(&submit(&payload, &body())).is_ok());
}

#[test]
fn flipping_any_payload_byte_is_hmac_mismatch() {
    let seal = seal();
    let payload = seal.seal(&descriptor()).unwrap();
    let data = payload.data().as_bytes().to_vec();

    for i in 0..data.len() {
        let mut tampered = data.clone();
        // Stay within ASCII so the payload remains a valid string.
        tampered[i] = if tampered[i] == b'a' { b'b' } else { b'a' };
        let mut params = submit(&payload, &body());
        replace(
            &mut params,
            seal.data_field(),
            String::from_utf8(tampered).unwrap(),
        );
        assert_eq!(
            seal.parse(&params).unwrap_err().kind(),
            SealErrorKind::HmacMismatch,
            "byte {i}"
        );
    }
}

#[test]
fn flipping_any_digest_char_is_hmac_mismatch() {
    let seal = seal();
    let payload = seal.seal(&descriptor()).unwrap();

    for i in 0..payload.hmac().len() {
        let mut digest = payload.hmac().as_bytes().to_vec();
        digest[i] = if digest[i] == b'f' { b'e' } else { b'f' };
        let mut params = submit(&payload, &body());
        replace(&mut params, seal.hmac_field(), String::from_utf8(digest).unwrap());
        assert_eq!(
            seal.parse(&params).unwrap_err().kind(),
            SealErrorKind::HmacMismatch,
            "char {i}"
        );
    }
}

#[test]
fn wrong_length_digest_is_only_ever_hmac_mismatch() {
    let seal = seal();
    let payload = seal.seal(&descriptor()).unwrap();
    let digest = payload.hmac().to_string();
    assert_eq!(digest.len(), DIGEST_HEX_LEN);

    let candidates = [
        String::new(),
        digest[..1].to_string(),
        digest[..DIGEST_HEX_LEN / 2].to_string(),
        digest[..DIGEST_HEX_LEN - 1].to_string(),
        format!("{digest}0"),
        digest.repeat(3),
        "not hex at all".to_string(),
    ];
    for candidate in candidates {
        let mut params = submit(&payload, &body());
        replace(&mut params, seal.hmac_field(), candidate.clone());
        assert_eq!(
            seal.parse(&params).unwrap_err().kind(),
            SealErrorKind::HmacMismatch,
            "digest {candidate:?}"
        );
    }
}

#[test]
fn widening_allowed_values_is_detected() {
    let seal = seal();
    let payload = seal.seal(&descriptor()).unwrap();
    let widened = payload.data().replace(r#"["1","2"]"#, r#"["1","2","99"]"#);
    assert_ne!(widened, payload.data());

    let mut params = submit(&payload, &body());
    replace(&mut params, seal.data_field(), widened);
    assert_eq!(
        seal.parse(&params).unwrap_err().kind(),
        SealErrorKind::HmacMismatch
    );
}

#[test]
fn dropping_csrf_binding_is_detected() {
    let seal = seal();
    let payload = seal.seal(&descriptor()).unwrap();
    let stripped = payload.data().replace(r#""csrf":["_csrf","T1"],"#, "");
    assert_ne!(stripped, payload.data());

    let mut params = submit(&payload, &json!({"album": {"name": "x"}}));
    replace(&mut params, seal.data_field(), stripped);
    assert_eq!(
        seal.parse(&params).unwrap_err().kind(),
        SealErrorKind::HmacMismatch
    );
}
