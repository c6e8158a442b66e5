//! Percy project token retrieval.

use std::fmt;
use std::sync::Arc;

use bstack_api::HttpTransport;
use bstack_types::{Credentials, IntegrationPath, ResolutionError};
use bstack_util::redact_sensitive;
use serde::Deserialize;
use tracing::debug;
use url::Url;

pub const DEFAULT_PERCY_API_BASE: &str = "https://api.browserstack.com";
const TOKEN_PATH: &str = "/api/app_percy/get_project_token";
const OPERATION: &str = "percy token fetch";

/// Which kind of Percy project a token is issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PercyProjectKind {
    /// Percy layered on an automated SDK session.
    Automate,
    /// Standalone Percy web project.
    Web,
}

impl PercyProjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PercyProjectKind::Automate => "automate",
            PercyProjectKind::Web => "web",
        }
    }

    /// Project kind needed by `path`, or `None` when the path needs no token.
    pub fn for_path(path: IntegrationPath) -> Option<Self> {
        match path {
            IntegrationPath::Sdk => None,
            IntegrationPath::PercyWithSdk => Some(PercyProjectKind::Automate),
            IntegrationPath::PercyStandalone => Some(PercyProjectKind::Web),
        }
    }
}

impl fmt::Display for PercyProjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    token: Option<String>,
}

/// Fetches (creating on first use) the token of a named Percy project.
pub struct PercyTokenClient {
    transport: Arc<dyn HttpTransport>,
    api_base: String,
}

impl PercyTokenClient {
    pub fn new(transport: Arc<dyn HttpTransport>, api_base: impl Into<String>) -> Self {
        Self {
            transport,
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn fetch(&self, project_name: &str, kind: PercyProjectKind, credentials: &Credentials) -> Result<String, ResolutionError> {
        let url = self.token_url(project_name, kind)?;
        let response = self
            .transport
            .get(url.as_str(), Some(credentials))
            .await
            .map_err(|error| ResolutionError::upstream(OPERATION, None, error.to_string()))?;

        if !response.is_success() {
            return Err(ResolutionError::upstream(
                OPERATION,
                Some(response.status),
                redact_sensitive(&response.body),
            ));
        }

        let parsed: TokenResponse = serde_json::from_str(&response.body)
            .map_err(|error| ResolutionError::upstream(OPERATION, Some(response.status), format!("invalid JSON: {error}")))?;
        match parsed.token.filter(|token| parsed.success && !token.is_empty()) {
            Some(token) => {
                debug!(project = project_name, %kind, "fetched percy project token");
                Ok(token)
            }
            None => Err(ResolutionError::upstream(
                OPERATION,
                Some(response.status),
                redact_sensitive(&response.body),
            )),
        }
    }

    fn token_url(&self, project_name: &str, kind: PercyProjectKind) -> Result<Url, ResolutionError> {
        let mut url = Url::parse(&format!("{}{TOKEN_PATH}", self.api_base))
            .map_err(|error| ResolutionError::upstream(OPERATION, None, format!("invalid Percy API base '{}': {error}", self.api_base)))?;
        url.query_pairs_mut()
            .append_pair("name", project_name)
            .append_pair("type", kind.as_str());
        Ok(url)
    }
}
