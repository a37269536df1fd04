//! HMAC-SHA-512 signing and constant-time verification of payloads.
//!
//! Digests travel as lowercase hex. Verification recomputes the digest and
//! compares the two hex strings byte-for-byte in constant time, after an
//! explicit length check. A mismatch carries no detail beyond "no match".

use hmac::{Hmac, Mac};
use sha2::Sha512;
use subtle::ConstantTimeEq;

use formseal_types::SecretKey;

type HmacSha512 = Hmac<Sha512>;

/// Length in hex characters of every digest produced by [`sign`].
pub const DIGEST_HEX_LEN: usize = 128;

/// Compute the hex digest of `payload` under `key`.
#[must_use]
pub fn sign(payload: &[u8], key: &SecretKey) -> String {
    let mut mac =
        HmacSha512::new_from_slice(key.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Check a submitted hex digest against `payload` under `key`.
#[must_use]
pub fn verify(payload: &[u8], digest: &str, key: &SecretKey) -> bool {
    let expected = sign(payload, key);
    constant_time_eq(expected.as_bytes(), digest.as_bytes())
}

/// Length-checked constant-time equality.
///
/// Lengths are compared first; equal-length inputs are compared without
/// early exit.
#[must_use]
pub fn constant_time_eq(expected: &[u8], submitted: &[u8]) -> bool {
    if expected.len() != submitted.len() {
        return false;
    }
    expected.ct_eq(submitted).into()
}

/// The current signing key plus an optional key being rotated out.
#[derive(Debug, Clone)]
pub struct Keyring {
    current: SecretKey,
    previous: Option<SecretKey>,
}

impl Keyring {
    #[must_use]
    pub fn new(current: SecretKey, previous: Option<SecretKey>) -> Self {
        Self { current, previous }
    }

    /// Signs with the current key only.
    #[must_use]
    pub fn sign(&self, payload: &[u8]) -> String {
        sign(payload, &self.current)
    }

    /// Accepts a digest made with either key.
    #[must_use]
    pub fn verify(&self, payload: &[u8], digest: &str) -> bool {
        let current = verify(payload, digest, &self.current);
        let previous = self
            .previous
            .as_ref()
            .is_some_and(|key| verify(payload, digest, key));
        current | previous
    }
}
