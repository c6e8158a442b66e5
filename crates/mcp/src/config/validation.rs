//! Load-time validation of the server configuration.

use std::net::SocketAddr;

use bstack_api::validate_base_url;
use thiserror::Error;
use tracing::debug;

use crate::config::ServerConfig;

/// Validate the entire server configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), ValidationError> {
    if config.endpoint_candidates.is_empty() {
        return Err(ValidationError::NoEndpoints);
    }
    for candidate in &config.endpoint_candidates {
        validate_url_field("endpointCandidates", candidate)?;
    }
    validate_url_field("percyApiBase", &config.percy_api_base)?;
    validate_url_field("devicesUrl", &config.devices_url)?;

    if config.request_timeout_secs == 0 {
        return Err(ValidationError::InvalidTimeout);
    }
    validate_bind_address(&config.http_bind_address)?;

    debug!(endpoints = config.endpoint_candidates.len(), "validated server configuration");
    Ok(())
}

fn validate_url_field(field: &'static str, value: &str) -> Result<(), ValidationError> {
    validate_base_url(value)
        .map(|_| ())
        .map_err(|reason| ValidationError::InvalidUrl { field, reason })
}

/// The HTTP host only ever binds to loopback.
pub fn validate_bind_address(address: &str) -> Result<SocketAddr, ValidationError> {
    let parsed: SocketAddr = address.parse().map_err(|error| ValidationError::InvalidBindAddress {
        address: address.to_string(),
        reason: format!("{error}"),
    })?;
    if !parsed.ip().is_loopback() {
        return Err(ValidationError::InvalidBindAddress {
            address: address.to_string(),
            reason: "must be a loopback address".to_string(),
        });
    }
    Ok(parsed)
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("endpointCandidates must list at least one URL")]
    NoEndpoints,

    #[error("invalid {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },

    #[error("requestTimeoutSecs must be greater than zero")]
    InvalidTimeout,

    #[error("invalid bind address '{address}': {reason}")]
    InvalidBindAddress { address: String, reason: String },
}
