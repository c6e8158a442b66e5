//! `reqwest`-backed transport.
//!
//! Builds one pooled client with a consistent User-Agent and Accept header
//! and maps each [`HttpRequest`] onto it. Only failures that prevent a
//! response (DNS, connect, timeout, body read) surface as
//! [`TransportError`]; HTTP error statuses come back as ordinary responses.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header};
use tracing::debug;
use url::Url;

use crate::transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

/// Hostnames allowed over plain HTTP for local development.
const LOCALHOST_DOMAINS: &[&str] = &["localhost", "127.0.0.1", "[::1]"];

/// Thin wrapper around a configured `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: Client,
    user_agent: String,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let mut default_headers = header::HeaderMap::new();
        default_headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()
            .map_err(|error| TransportError::InvalidRequest {
                url: String::new(),
                message: format!("build http client: {error}"),
            })?;

        Ok(Self {
            http,
            user_agent: format!("bstack/{}; {}", env!("CARGO_PKG_VERSION"), env::consts::OS),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let HttpRequest {
            method,
            url,
            basic_auth,
            body,
        } = request;
        let parsed_url = Url::parse(&url).map_err(|error| TransportError::InvalidRequest {
            url: url.clone(),
            message: error.to_string(),
        })?;

        let mut builder = match method {
            HttpMethod::Get => self.http.get(parsed_url),
            HttpMethod::Post => self.http.post(parsed_url),
        }
        .header(header::USER_AGENT, &self.user_agent);

        if let Some(credentials) = basic_auth.as_ref() {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.access_key));
        }
        if let Some(body) = body.as_ref() {
            builder = builder.json(body);
        }

        debug!(method = ?method, %url, "sending request");
        let response = builder.send().await.map_err(|error| TransportError::Network {
            url: url.clone(),
            message: error.to_string(),
        })?;
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|error| TransportError::Network {
            url: url.clone(),
            message: format!("read body: {error}"),
        })?;
        debug!(%url, status, "received response");

        Ok(HttpResponse { status, body })
    }
}

/// Validate that a base URL is acceptable for outbound requests.
///
/// Rules:
/// - `localhost`, `127.0.0.1`, `[::1]`: http or https
/// - otherwise: https only
pub fn validate_base_url(base: &str) -> Result<Url, String> {
    let parsed = Url::parse(base).map_err(|error| format!("invalid URL '{base}': {error}"))?;
    let host = parsed.host_str().ok_or_else(|| format!("URL '{base}' must include a host"))?;

    let is_local = LOCALHOST_DOMAINS.iter().any(|allowed| host.eq_ignore_ascii_case(allowed));
    match parsed.scheme() {
        "https" => Ok(parsed),
        "http" if is_local => Ok(parsed),
        scheme => Err(format!("URL '{base}' must use https for non-localhost hosts; got '{scheme}://'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_https_and_local_http() {
        assert!(validate_base_url("https://test-management.browserstack.com").is_ok());
        assert!(validate_base_url("http://127.0.0.1:8080").is_ok());
        assert!(validate_base_url("http://localhost").is_ok());
    }

    #[test]
    fn rejects_remote_http_and_garbage() {
        let error = validate_base_url("http://example.com").expect_err("plain http to a remote host");
        assert!(error.contains("must use https"), "error: {error}");
        assert!(validate_base_url("not a url").is_err());
    }

    #[tokio::test]
    async fn invalid_url_surfaces_as_invalid_request() {
        let transport = ReqwestTransport::new(Duration::from_secs(1)).expect("client builds");
        let error = transport.send(HttpRequest::get("::not-a-url")).await.expect_err("url is invalid");
        assert!(matches!(error, TransportError::InvalidRequest { .. }));
    }
}
