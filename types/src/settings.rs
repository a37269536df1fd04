//! Resolved sealing configuration shared across crates.
//!
//! Raw TOML structs (with `Option` fields) stay private in `formseal-config`.
//! The loader resolves them into these types at the parse boundary, so a
//! `SealSettings` value is proof that a usable secret exists.

use std::fmt;

use thiserror::Error;

pub const DEFAULT_DATA_FIELD: &str = "_formseal_data";
pub const DEFAULT_HMAC_FIELD: &str = "_formseal_data_hmac";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("form signing secret is not configured")]
    MissingSecret,
    #[error("form seal field names must not be empty")]
    EmptyFieldName,
    #[error("form seal data and hmac fields must have different names")]
    SameFieldNames,
}

/// Process-wide signing secret. Never empty, never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretKey(Vec<u8>);

impl SecretKey {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Result<Self, SettingsError> {
        let bytes = bytes.into();
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Err(SettingsError::MissingSecret);
        }
        Ok(Self(bytes))
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey").field(&"[REDACTED]").finish()
    }
}

impl TryFrom<String> for SecretKey {
    type Error = SettingsError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value.into_bytes())
    }
}

impl TryFrom<&str> for SecretKey {
    type Error = SettingsError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.as_bytes())
    }
}

/// Validated sealing settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealSettings {
    secret: SecretKey,
    old_secret: Option<SecretKey>,
    data_field: String,
    hmac_field: String,
}

impl SealSettings {
    #[must_use]
    pub fn new(secret: SecretKey) -> Self {
        Self {
            secret,
            old_secret: None,
            data_field: DEFAULT_DATA_FIELD.to_string(),
            hmac_field: DEFAULT_HMAC_FIELD.to_string(),
        }
    }

    /// Also accept digests made with a previous secret during rotation.
    #[must_use]
    pub fn with_old_secret(mut self, old_secret: SecretKey) -> Self {
        self.old_secret = Some(old_secret);
        self
    }

    pub fn with_field_names(
        mut self,
        data_field: impl Into<String>,
        hmac_field: impl Into<String>,
    ) -> Result<Self, SettingsError> {
        let data_field = data_field.into();
        let hmac_field = hmac_field.into();
        if data_field.trim().is_empty() || hmac_field.trim().is_empty() {
            return Err(SettingsError::EmptyFieldName);
        }
        if data_field == hmac_field {
            return Err(SettingsError::SameFieldNames);
        }
        self.data_field = data_field;
        self.hmac_field = hmac_field;
        Ok(self)
    }

    #[must_use]
    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    #[must_use]
    pub fn old_secret(&self) -> Option<&SecretKey> {
        self.old_secret.as_ref()
    }

    #[must_use]
    pub fn data_field(&self) -> &str {
        &self.data_field
    }

    #[must_use]
    pub fn hmac_field(&self) -> &str {
        &self.hmac_field
    }
}
