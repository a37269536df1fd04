//! The consumer-facing seal: sign descriptors after render, verify and
//! unpack submissions before trusting them.
//!
//! Verification order on submission:
//!
//! 1. data and digest fields present (`missing_data`, `missing_hmac`)
//! 2. digest matches the data under the current or previous key
//!    (`hmac_mismatch`)
//! 3. data decodes as a descriptor (`invalid_data`)
//! 4. live CSRF token matches the bound token (`csrf_mismatch`)
//! 5. every namespace resolves (`missing_namespace`)
//!
//! Any failure aborts the whole parse. Nothing is partially accepted.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use formseal_types::{
    DescriptorError, FormDescriptor, FormSealError, ParamMap, ParamValue, SealErrorKind,
    SealSettings, ValidationState, Validations,
};

use crate::csrf::{self, CsrfValidator};
use crate::namespace;
use crate::signer::Keyring;
use crate::tracker::InputTracker;
use crate::validation;

/// Called with the kind of every rejection before the error is returned.
pub type ErrorHook = dyn Fn(SealErrorKind) + Send + Sync;

/// A signed descriptor ready to be embedded in a page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SignedPayload {
    data_field: String,
    hmac_field: String,
    data: String,
    hmac: String,
}

impl SignedPayload {
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    #[must_use]
    pub fn hmac(&self) -> &str {
        &self.hmac
    }

    /// The data field followed by the digest field.
    #[must_use]
    pub fn hidden_fields(&self) -> [HiddenField; 2] {
        [
            HiddenField::new(&self.data_field, &self.data),
            HiddenField::new(&self.hmac_field, &self.hmac),
        ]
    }

    /// Insert both fields into a parameter map, as a browser would submit
    /// them.
    pub fn submit_into(&self, params: &mut ParamMap) {
        for field in self.hidden_fields() {
            params.insert(field.name, ParamValue::Str(field.value));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HiddenField {
    pub name: String,
    pub value: String,
}

impl HiddenField {
    fn new(name: &str, value: &str) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    #[must_use]
    pub fn to_html(&self) -> String {
        format!(
            r#"<input type="hidden" name="{}" value="{}"/>"#,
            escape_attr(&self.name),
            escape_attr(&self.value)
        )
    }
}

fn escape_attr(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Values and validation flags recovered from a verified submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedSubmission {
    /// Every exposed column; `None` when the column was not submitted.
    pub values: BTreeMap<String, Option<ParamValue>>,
    pub validations: Validations,
    pub form_version: Option<Value>,
}

/// A model object that verified values are written onto.
pub trait FormTarget {
    /// Assign a submitted value. `None` means the column was exposed but
    /// not submitted.
    fn set_field(&mut self, column: &str, value: Option<&ParamValue>);

    fn validation_state(&mut self) -> &mut ValidationState;
}

/// In-memory [`FormTarget`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordState {
    pub fields: BTreeMap<String, ParamValue>,
    pub validations: ValidationState,
}

impl FormTarget for RecordState {
    fn set_field(&mut self, column: &str, value: Option<&ParamValue>) {
        match value {
            Some(value) => {
                self.fields.insert(column.to_string(), value.clone());
            }
            None => {
                self.fields.remove(column);
            }
        }
    }

    fn validation_state(&mut self) -> &mut ValidationState {
        &mut self.validations
    }
}

/// Configured sealing subsystem. Holding one proves a secret is set.
#[derive(Clone)]
pub struct FormSeal {
    keys: Keyring,
    data_field: String,
    hmac_field: String,
    on_error: Option<Arc<ErrorHook>>,
    csrf_validator: Option<Arc<CsrfValidator>>,
}

impl fmt::Debug for FormSeal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormSeal")
            .field("keys", &self.keys)
            .field("data_field", &self.data_field)
            .field("hmac_field", &self.hmac_field)
            .field("on_error", &self.on_error.is_some())
            .field("csrf_validator", &self.csrf_validator.is_some())
            .finish()
    }
}

impl FormSeal {
    #[must_use]
    pub fn new(settings: SealSettings) -> Self {
        let keys = Keyring::new(settings.secret().clone(), settings.old_secret().cloned());
        Self {
            keys,
            data_field: settings.data_field().to_string(),
            hmac_field: settings.hmac_field().to_string(),
            on_error: None,
            csrf_validator: None,
        }
    }

    #[must_use]
    pub fn with_error_hook(mut self, hook: impl Fn(SealErrorKind) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn with_csrf_validator(
        mut self,
        validator: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.csrf_validator = Some(Arc::new(validator));
        self
    }

    #[must_use]
    pub fn data_field(&self) -> &str {
        &self.data_field
    }

    #[must_use]
    pub fn hmac_field(&self) -> &str {
        &self.hmac_field
    }

    /// Serialize and sign a descriptor.
    pub fn seal(&self, descriptor: &FormDescriptor) -> Result<SignedPayload, DescriptorError> {
        let data = descriptor.to_payload()?;
        let hmac = self.keys.sign(data.as_bytes());
        tracing::debug!(
            columns = descriptor.columns().len(),
            csrf_bound = descriptor.csrf().is_some(),
            "sealed form descriptor"
        );
        Ok(SignedPayload {
            data_field: self.data_field.clone(),
            hmac_field: self.hmac_field.clone(),
            data,
            hmac,
        })
    }

    /// After-render hook: snapshot the pass and sign it.
    ///
    /// A pass that recorded no inputs yields `Ok(None)` and nothing should be
    /// emitted for it.
    pub fn finish_render(
        &self,
        tracker: InputTracker,
    ) -> Result<Option<SignedPayload>, DescriptorError> {
        tracker
            .snapshot()?
            .map(|descriptor| self.seal(&descriptor))
            .transpose()
    }

    /// Verify the digest and decode the descriptor, without resolving
    /// values or checking CSRF.
    pub fn open(&self, params: &ParamMap) -> Result<FormDescriptor, FormSealError> {
        let data = params
            .get(&self.data_field)
            .and_then(ParamValue::as_str)
            .ok_or_else(|| self.reject(SealErrorKind::MissingData))?;
        let hmac = params
            .get(&self.hmac_field)
            .and_then(ParamValue::as_str)
            .ok_or_else(|| self.reject(SealErrorKind::MissingHmac))?;

        if !self.keys.verify(data.as_bytes(), hmac) {
            return Err(self.reject(SealErrorKind::HmacMismatch));
        }

        FormDescriptor::from_payload(data).map_err(|err| {
            tracing::debug!("signed form data failed to decode: {err}");
            self.reject(SealErrorKind::InvalidData)
        })
    }

    /// Verify a submission and recover its values and validation flags.
    /// Side-effect free.
    pub fn parse(&self, params: &ParamMap) -> Result<ParsedSubmission, FormSealError> {
        let descriptor = self.open(params)?;

        csrf::check_binding(
            descriptor.csrf(),
            params,
            self.csrf_validator.as_deref(),
        )
        .map_err(|err| self.reject(err.kind()))?;

        let fields = namespace::resolve(params, descriptor.namespaces())
            .map_err(|err| self.reject(err.kind()))?;

        let values = descriptor
            .columns()
            .iter()
            .map(|column| (column.clone(), fields.get(column).cloned()))
            .collect();
        let validations = validation::validate(descriptor.valid_values(), fields);

        tracing::debug!(
            columns = descriptor.columns().len(),
            invalid = validations.values().filter(|v| !v.valid).count(),
            "verified sealed form submission"
        );
        Ok(ParsedSubmission {
            values,
            validations,
            form_version: descriptor.form_version().cloned(),
        })
    }

    /// Parse, then write values onto `target` and merge validation flags
    /// into its validation store.
    pub fn apply<T>(&self, params: &ParamMap, target: &mut T) -> Result<ParsedSubmission, FormSealError>
    where
        T: FormTarget + ?Sized,
    {
        let parsed = self.parse(params)?;
        for (column, value) in &parsed.values {
            target.set_field(column, value.as_ref());
        }
        target.validation_state().merge(&parsed.validations);
        Ok(parsed)
    }

    fn reject(&self, kind: SealErrorKind) -> FormSealError {
        tracing::warn!(kind = kind.as_str(), "rejected sealed form submission");
        if let Some(hook) = &self.on_error {
            hook(kind);
        }
        FormSealError::new(kind)
    }
}
