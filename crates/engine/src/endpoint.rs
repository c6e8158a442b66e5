//! Regional API endpoint discovery.
//!
//! The probe walks an ordered list of candidate base URLs, issues an
//! authenticated request against each, and keeps the first one that answers
//! with a success status for the rest of the process. When nothing answers,
//! the first candidate is used as an unverified fallback so callers always get
//! a usable URL.

use std::sync::{Arc, PoisonError, RwLock};

use bstack_api::HttpTransport;
use bstack_types::Credentials;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_ENDPOINT_CANDIDATES: &[&str] = &[
    "https://test-management.browserstack.com",
    "https://test-management-eu.browserstack.com",
    "https://test-management-in.browserstack.com",
];

pub const DEFAULT_PROBE_PATH: &str = "/api/v2/projects/";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("endpoint candidate list is empty")]
pub struct EmptyEndpointSet;

/// Ordered, non-empty list of candidate base URLs. Earlier entries are preferred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSet {
    candidates: Vec<String>,
}

impl EndpointSet {
    pub fn new(candidates: Vec<String>) -> Result<Self, EmptyEndpointSet> {
        let candidates: Vec<String> = candidates
            .into_iter()
            .map(|candidate| candidate.trim().trim_end_matches('/').to_string())
            .filter(|candidate| !candidate.is_empty())
            .collect();
        if candidates.is_empty() {
            return Err(EmptyEndpointSet);
        }
        Ok(Self { candidates })
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn primary(&self) -> &str {
        // Non-empty by construction.
        &self.candidates[0]
    }
}

impl Default for EndpointSet {
    fn default() -> Self {
        Self {
            candidates: DEFAULT_ENDPOINT_CANDIDATES.iter().map(|url| url.to_string()).collect(),
        }
    }
}

/// A base URL together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedEndpoint {
    pub url: String,
    /// `true` when the URL answered a probe; `false` for the fallback.
    pub verified: bool,
}

/// Probes candidate endpoints once and caches the outcome.
///
/// Concurrent cold callers may each probe; the first verified answer to land
/// stays. No lock is held across a request.
pub struct EndpointProbe {
    endpoints: EndpointSet,
    probe_path: String,
    transport: Arc<dyn HttpTransport>,
    resolved: RwLock<Option<ResolvedEndpoint>>,
}

impl EndpointProbe {
    pub fn new(endpoints: EndpointSet, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            endpoints,
            probe_path: DEFAULT_PROBE_PATH.to_string(),
            transport,
            resolved: RwLock::new(None),
        }
    }

    pub fn with_probe_path(mut self, probe_path: impl Into<String>) -> Self {
        let probe_path = probe_path.into();
        self.probe_path = if probe_path.starts_with('/') {
            probe_path
        } else {
            format!("/{probe_path}")
        };
        self
    }

    /// Base URL to use for API calls. Never fails.
    pub async fn resolve_base_url(&self, credentials: &Credentials) -> String {
        self.resolve(credentials).await.url
    }

    /// Like [`Self::resolve_base_url`], but also reports whether the URL was verified.
    pub async fn resolve(&self, credentials: &Credentials) -> ResolvedEndpoint {
        if let Some(cached) = self.cached() {
            debug!(url = %cached.url, verified = cached.verified, "endpoint cache hit");
            return cached;
        }

        for candidate in self.endpoints.candidates() {
            let probe_url = format!("{candidate}{}", self.probe_path);
            match self.transport.get(&probe_url, Some(credentials)).await {
                Ok(response) if response.is_success() => {
                    info!(url = %candidate, "resolved API endpoint");
                    return self.store(ResolvedEndpoint {
                        url: candidate.clone(),
                        verified: true,
                    });
                }
                Ok(response) => debug!(url = %probe_url, status = response.status, "endpoint probe rejected"),
                Err(error) => debug!(url = %probe_url, %error, "endpoint probe failed"),
            }
        }

        let fallback = self.endpoints.primary().to_string();
        warn!(url = %fallback, "no endpoint answered the probe; using the primary endpoint unverified");
        self.store(ResolvedEndpoint {
            url: fallback,
            verified: false,
        })
    }

    /// Current cached resolution, if any.
    pub fn cached(&self) -> Option<ResolvedEndpoint> {
        self.resolved.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Forgets the cached resolution so the next call probes again.
    pub fn clear_cache(&self) {
        *self.resolved.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    // A verified entry is never replaced; everything else is last-write-wins.
    fn store(&self, resolved: ResolvedEndpoint) -> ResolvedEndpoint {
        let mut slot = self.resolved.write().unwrap_or_else(PoisonError::into_inner);
        match slot.as_ref() {
            Some(existing) if existing.verified => existing.clone(),
            _ => {
                *slot = Some(resolved.clone());
                resolved
            }
        }
    }
}
