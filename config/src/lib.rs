//! Configuration loading for formseal.
//!
//! Settings live in `~/.formseal/config.toml`:
//!
//! ```toml
//! [seal]
//! secret = "${FORMSEAL_SECRET}"
//! old_secret = "${FORMSEAL_OLD_SECRET}"
//! data_field = "_formseal_data"
//! hmac_field = "_formseal_data_hmac"
//! ```
//!
//! String values may reference environment variables with `${VAR}`. When no
//! secret is configured in the file, `FORMSEAL_SECRET` is read directly.
//! Resolution into [`SealSettings`] fails immediately if no secret can be
//! found.

use std::path::{Path, PathBuf};
use std::{env, fmt, fs, io};

use serde::Deserialize;
use thiserror::Error;

use formseal_types::{SealSettings, SecretKey, SettingsError};

pub const SECRET_ENV_VAR: &str = "FORMSEAL_SECRET";
pub const OLD_SECRET_ENV_VAR: &str = "FORMSEAL_OLD_SECRET";

/// Secrets shorter than this still work but are logged as weak.
const RECOMMENDED_SECRET_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Failure to produce settings from the default config location.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

#[derive(Debug, Default, Deserialize)]
pub struct FormSealConfig {
    pub seal: Option<SealConfig>,
}

#[derive(Default, Deserialize)]
pub struct SealConfig {
    pub secret: Option<String>,
    pub old_secret: Option<String>,
    pub data_field: Option<String>,
    pub hmac_field: Option<String>,
}

// Manual Debug impl to prevent leaking secrets in logs.
impl fmt::Debug for SealConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn mask(opt: Option<&String>) -> &'static str {
            if opt.is_some() { "[REDACTED]" } else { "None" }
        }
        f.debug_struct("SealConfig")
            .field("secret", &mask(self.secret.as_ref()))
            .field("old_secret", &mask(self.old_secret.as_ref()))
            .field("data_field", &self.data_field)
            .field("hmac_field", &self.hmac_field)
            .finish()
    }
}

/// Expand `${VAR}` references using the process environment.
#[must_use]
pub fn expand_env_vars(value: &str) -> String {
    expand_with(value, |var| env::var(var).ok())
}

/// Expand `${VAR}` references using `lookup`. Unknown variables expand to
/// the empty string; an unclosed `${` is kept verbatim.
pub fn expand_with(value: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&lookup(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

impl FormSealConfig {
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// Resolve into validated settings using the process environment.
    pub fn resolve(&self) -> Result<SealSettings, SettingsError> {
        self.resolve_with(|var| env::var(var).ok())
    }

    /// Resolve into validated settings, reading environment variables
    /// through `lookup`.
    pub fn resolve_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<SealSettings, SettingsError> {
        let seal = self.seal.as_ref();
        let from_file = |field: Option<&String>| {
            field
                .map(|raw| expand_with(raw, &lookup))
                .filter(|value| !value.trim().is_empty())
        };

        let secret = from_file(seal.and_then(|s| s.secret.as_ref()))
            .or_else(|| lookup(SECRET_ENV_VAR))
            .ok_or(SettingsError::MissingSecret)?;
        let secret = SecretKey::try_from(secret)?;
        if secret.len() < RECOMMENDED_SECRET_BYTES {
            tracing::warn!(
                bytes = secret.len(),
                recommended = RECOMMENDED_SECRET_BYTES,
                "form signing secret is shorter than recommended"
            );
        }

        let mut settings = SealSettings::new(secret);
        let old_secret = from_file(seal.and_then(|s| s.old_secret.as_ref()))
            .or_else(|| lookup(OLD_SECRET_ENV_VAR))
            .filter(|value| !value.trim().is_empty());
        if let Some(old_secret) = old_secret {
            settings = settings.with_old_secret(SecretKey::try_from(old_secret)?);
        }

        let data_field = seal.and_then(|s| s.data_field.clone());
        let hmac_field = seal.and_then(|s| s.hmac_field.clone());
        if data_field.is_some() || hmac_field.is_some() {
            let data_field = data_field.unwrap_or_else(|| settings.data_field().to_string());
            let hmac_field = hmac_field.unwrap_or_else(|| settings.hmac_field().to_string());
            settings = settings.with_field_names(data_field, hmac_field)?;
        }

        Ok(settings)
    }
}

/// Load the default config (if any) and resolve it.
///
/// A missing file resolves from the environment alone. A file that exists
/// but cannot be read or parsed is an error; it never falls back to
/// `FORMSEAL_SECRET`.
pub fn load_settings() -> Result<SealSettings, LoadError> {
    let lookup = |var: &str| env::var(var).ok();
    match config_path() {
        Some(path) => load_settings_from(&path, lookup),
        None => Ok(FormSealConfig::default().resolve_with(lookup)?),
    }
}

/// Load `path` (if it exists) and resolve it, reading environment variables
/// through `lookup`.
pub fn load_settings_from(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<SealSettings, LoadError> {
    let config = if path.exists() {
        FormSealConfig::load_from(path)?
    } else {
        FormSealConfig::default()
    };
    Ok(config.resolve_with(lookup)?)
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".formseal").join("config.toml"))
}
