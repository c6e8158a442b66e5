//! `${env:NAME}` expansion for the credential fields.

use bstack_util::{InterpolationError, interpolate_env};

use crate::config::ServerConfig;

/// Expands placeholders in `username` and `accessKey` in place.
///
/// Other fields are taken literally.
pub fn interpolate_config(config: &mut ServerConfig) -> Result<(), InterpolationError> {
    for field in [&mut config.username, &mut config.access_key] {
        if let Some(value) = field.as_mut() {
            *value = interpolate_env(value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_credential_placeholders() {
        temp_env::with_var("BSTACK_TEST_KEY", Some("from-env"), || {
            let mut config = ServerConfig {
                username: Some("alice".into()),
                access_key: Some("${env:BSTACK_TEST_KEY}".into()),
                ..ServerConfig::default()
            };
            interpolate_config(&mut config).expect("variable is set");
            assert_eq!(config.username.as_deref(), Some("alice"));
            assert_eq!(config.access_key.as_deref(), Some("from-env"));
        });
    }

    #[test]
    fn missing_variable_is_an_error() {
        temp_env::with_var_unset("BSTACK_TEST_MISSING", || {
            let mut config = ServerConfig {
                access_key: Some("${env:BSTACK_TEST_MISSING}".into()),
                ..ServerConfig::default()
            };
            assert!(interpolate_config(&mut config).is_err());
        });
    }
}
