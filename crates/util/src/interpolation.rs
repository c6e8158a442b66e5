//! `${env:NAME}` placeholder interpolation for configuration values.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

static ENV_PLACEHOLDER: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\$\{env:([A-Za-z_][A-Za-z0-9_]*)\}").ok());

/// Errors that can occur during interpolation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InterpolationError {
    #[error("Missing environment variable: {name}")]
    MissingEnvVar { name: String },
}

/// Replaces every `${env:NAME}` placeholder with the value of `NAME`.
///
/// Values without placeholders are returned unchanged. A placeholder naming
/// an unset variable is an error rather than an empty substitution.
pub fn interpolate_env(value: &str) -> Result<String, InterpolationError> {
    let Some(pattern) = ENV_PLACEHOLDER.as_ref() else {
        return Ok(value.to_string());
    };

    let mut result = value.to_string();
    for captures in pattern.captures_iter(value) {
        let name = &captures[1];
        let resolved = std::env::var(name).map_err(|_| InterpolationError::MissingEnvVar { name: name.to_string() })?;
        debug!("Interpolated env var: {} -> [REDACTED]", name);
        result = result.replace(&captures[0], &resolved);
    }
    Ok(result)
}
