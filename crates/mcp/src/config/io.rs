//! Configuration IO helpers.

use std::fs;
use std::path::{Path, PathBuf};

use bstack_util::config_file_path;
use tracing::debug;

use crate::config::{ConfigError, ServerConfig, interpolate_config, validate_config};

/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "BSTACK_CONFIG_PATH";
const CONFIG_FILE_NAME: &str = "config.json";

/// Returns `$BSTACK_CONFIG_PATH` or `<config_dir>/bstack/config.json`.
pub fn default_config_path() -> PathBuf {
    config_file_path(CONFIG_PATH_ENV, CONFIG_FILE_NAME)
}

/// Loads configuration from the default path.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
    load_config_from_path(&default_config_path())
}

/// Loads, interpolates and validates configuration. A missing file yields defaults.
pub fn load_config_from_path(path: &Path) -> Result<ServerConfig, ConfigError> {
    let mut config = if path.exists() {
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)?
    } else {
        debug!(path = %path.display(), "config file not found; using defaults");
        ServerConfig::default()
    };
    interpolate_config(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use bstack_api::AuthProvider;
    use bstack_util::expand_tilde;

    use super::*;

    #[test]
    fn default_path_honors_environment_override() {
        let override_path = "~/custom/bstack/config.json";
        temp_env::with_var(CONFIG_PATH_ENV, Some(override_path), || {
            assert_eq!(default_config_path(), expand_tilde(override_path));
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        let directory = tempfile::tempdir().expect("tempdir");
        let config = load_config_from_path(&directory.path().join("absent.json")).expect("defaults");
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn file_values_are_interpolated_and_env_credentials_win() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"{{"username": "file-user", "accessKey": "${{env:BSTACK_IO_TEST_KEY}}", "probePath": "/health"}}"#
        )
        .expect("write config");

        temp_env::with_vars(
            [
                ("BSTACK_IO_TEST_KEY", Some("interpolated-key")),
                ("BROWSERSTACK_USERNAME", Some("env-user")),
                ("BROWSERSTACK_ACCESS_KEY", None),
            ],
            || {
                let config = load_config_from_path(file.path()).expect("valid config");
                assert_eq!(config.access_key.as_deref(), Some("interpolated-key"));
                assert_eq!(config.probe_path, "/health");

                let credentials = config.auth_provider().credentials().expect("both parts");
                assert_eq!(credentials.username, "env-user");
                assert_eq!(credentials.access_key, "interpolated-key");
            },
        );
    }

    #[test]
    fn invalid_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"httpBindAddress": "0.0.0.0:80"}}"#).expect("write config");
        assert!(matches!(load_config_from_path(file.path()), Err(ConfigError::Validation(_))));
    }
}
