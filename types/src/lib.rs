//! Core domain types for formseal.
//!
//! This crate contains pure domain types with no IO, no crypto, and minimal
//! dependencies: the form descriptor and its constraints, the submitted
//! parameter tree, validation results, the rejection taxonomy, and resolved
//! settings. Everything here can be used from any layer.

mod constraint;
mod descriptor;
mod error;
mod params;
mod settings;
mod validation;

pub use constraint::{AllowedValue, BlankOption, Constraint, ConstraintKind, ConstraintShapeError};
pub use descriptor::{CsrfBinding, DescriptorError, FormDescriptor};
pub use error::{FormSealError, SealErrorKind};
pub use params::{ParamMap, ParamValue, params_from_json};
pub use settings::{
    DEFAULT_DATA_FIELD, DEFAULT_HMAC_FIELD, SealSettings, SecretKey, SettingsError,
};
pub use validation::{FieldValidation, INVALID_VALUE_MESSAGE, ValidationState, Validations};
