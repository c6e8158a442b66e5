//! Data model for the bstack server configuration file.

use bstack_api::StaticAuthProvider;
use bstack_engine::{DEFAULT_ENDPOINT_CANDIDATES, DEFAULT_PERCY_API_BASE, DEFAULT_PROBE_PATH};
use bstack_util::InterpolationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_DEVICES_URL: &str = "https://api-cloud.browserstack.com/app-automate/devices.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_BIND_ADDRESS: &str = "127.0.0.1:62890";

/// Contents of `config.json`. Every field is optional on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ServerConfig {
    /// Account username. Accepts `${env:NAME}`.
    pub username: Option<String>,
    /// Account access key. Accepts `${env:NAME}`.
    pub access_key: Option<String>,
    /// Regional API base URLs, preferred first.
    pub endpoint_candidates: Vec<String>,
    /// Path appended to each candidate when probing.
    pub probe_path: String,
    pub percy_api_base: String,
    pub devices_url: String,
    pub request_timeout_secs: u64,
    /// Loopback address for `serve --http`.
    pub http_bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            username: None,
            access_key: None,
            endpoint_candidates: DEFAULT_ENDPOINT_CANDIDATES.iter().map(|url| url.to_string()).collect(),
            probe_path: DEFAULT_PROBE_PATH.to_string(),
            percy_api_base: DEFAULT_PERCY_API_BASE.to_string(),
            devices_url: DEFAULT_DEVICES_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            http_bind_address: DEFAULT_HTTP_BIND_ADDRESS.to_string(),
        }
    }
}

impl ServerConfig {
    /// Credentials from this file, with `BROWSERSTACK_*` environment variables taking precedence.
    pub fn auth_provider(&self) -> StaticAuthProvider {
        StaticAuthProvider::new(self.username.clone(), self.access_key.clone()).with_env_overrides()
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Interpolation error: {0}")]
    Interpolation(#[from] InterpolationError),

    #[error("Validation error: {0}")]
    Validation(#[from] crate::config::ValidationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: ServerConfig = serde_json::from_str(
            r#"{
                "username": "alice",
                "accessKey": "${env:BS_KEY}",
                "requestTimeoutSecs": 5
            }"#,
        )
        .expect("valid config");

        assert_eq!(config.username.as_deref(), Some("alice"));
        assert_eq!(config.access_key.as_deref(), Some("${env:BS_KEY}"));
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.endpoint_candidates.len(), 3);
        assert_eq!(config.probe_path, "/api/v2/projects/");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let error = serde_json::from_str::<ServerConfig>(r#"{"userName": "alice"}"#).expect_err("typo");
        assert!(error.to_string().contains("unknown field"), "{error}");
    }
}
