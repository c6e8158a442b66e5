use async_trait::async_trait;
use bstack_types::Credentials;
use serde_json::Value;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// A single outbound request.
#[derive(Clone, Debug)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub basic_auth: Option<Credentials>,
    pub body: Option<Value>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            basic_auth: None,
            body: None,
        }
    }

    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: HttpMethod::Post,
            body: Some(body),
            ..Self::get(url)
        }
    }

    pub fn with_basic_auth(mut self, credentials: &Credentials) -> Self {
        self.basic_auth = Some(credentials.clone());
        self
    }
}

/// Status and body of a completed exchange. Non-success statuses are not errors
/// at this layer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures that prevented a response from being received at all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Invalid request for {url}: {message}")]
    InvalidRequest { url: String, message: String },
}

/// Capability to perform HTTP requests.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;

    async fn get(&self, url: &str, credentials: Option<&Credentials>) -> Result<HttpResponse, TransportError> {
        let mut request = HttpRequest::get(url);
        if let Some(credentials) = credentials {
            request = request.with_basic_auth(credentials);
        }
        self.send(request).await
    }

    async fn post(&self, url: &str, credentials: Option<&Credentials>, body: Value) -> Result<HttpResponse, TransportError> {
        let mut request = HttpRequest::post(url, body);
        if let Some(credentials) = credentials {
            request = request.with_basic_auth(credentials);
        }
        self.send(request).await
    }
}
