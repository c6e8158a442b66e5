//! Error taxonomy for resolution failures.
//!
//! Each variant carries the attempted value and the alternatives that would
//! have worked, so the rendered message can go straight to an end user (or an
//! agent) without a follow-up lookup.

use serde_json::{Value, json};
use thiserror::Error;

/// Errors raised by the fail-fast resolvers and their collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    #[error("no match found for '{query}'. Available: {}", .available.join(", "))]
    NotFound { query: String, available: Vec<String> },

    #[error("'{query}' is ambiguous. Matching candidates: {}. Use one of these names exactly", .candidates.join(", "))]
    AmbiguousMatch { query: String, candidates: Vec<String> },

    #[error("language '{language}' is not supported. Supported languages: {}", .supported.join(", "))]
    UnsupportedLanguage { language: String, supported: Vec<String> },

    #[error("framework '{framework}' is not supported for {language}. Supported frameworks: {}", .supported.join(", "))]
    UnsupportedFramework {
        language: String,
        framework: String,
        supported: Vec<String>,
    },

    #[error(
        "test framework '{test_framework}' is not supported for {language} with {framework}. Supported test frameworks: {}",
        .supported.join(", ")
    )]
    UnsupportedTestFramework {
        language: String,
        framework: String,
        test_framework: String,
        supported: Vec<String>,
    },

    #[error("missing credentials: {missing} is not set")]
    Credential { missing: String },

    #[error("{operation} failed{}: {body}", .status.map(|code| format!(" with status {code}")).unwrap_or_default())]
    Upstream {
        operation: String,
        status: Option<u16>,
        body: String,
    },
}

impl ResolutionError {
    pub fn not_found(query: impl Into<String>, available: Vec<String>) -> Self {
        Self::NotFound {
            query: query.into(),
            available,
        }
    }

    pub fn ambiguous(query: impl Into<String>, candidates: Vec<String>) -> Self {
        Self::AmbiguousMatch {
            query: query.into(),
            candidates,
        }
    }

    pub fn credential(missing: impl Into<String>) -> Self {
        Self::Credential { missing: missing.into() }
    }

    pub fn upstream(operation: impl Into<String>, status: Option<u16>, body: impl Into<String>) -> Self {
        Self::Upstream {
            operation: operation.into(),
            status,
            body: body.into(),
        }
    }

    /// Stable machine-readable discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::AmbiguousMatch { .. } => "ambiguous_match",
            Self::UnsupportedLanguage { .. } => "unsupported_language",
            Self::UnsupportedFramework { .. } => "unsupported_framework",
            Self::UnsupportedTestFramework { .. } => "unsupported_test_framework",
            Self::Credential { .. } => "credential",
            Self::Upstream { .. } => "upstream",
        }
    }

    /// The values a caller could retry with, if the error has any.
    pub fn alternatives(&self) -> &[String] {
        match self {
            Self::NotFound { available, .. } => available,
            Self::AmbiguousMatch { candidates, .. } => candidates,
            Self::UnsupportedLanguage { supported, .. }
            | Self::UnsupportedFramework { supported, .. }
            | Self::UnsupportedTestFramework { supported, .. } => supported,
            Self::Credential { .. } | Self::Upstream { .. } => &[],
        }
    }

    /// Structured payload for tool surfaces.
    pub fn details(&self) -> Value {
        let next_step = match self {
            Self::NotFound { .. } => "Retry with one of the available names.",
            Self::AmbiguousMatch { .. } => "Retry with one candidate name exactly as listed.",
            Self::UnsupportedLanguage { .. } | Self::UnsupportedFramework { .. } | Self::UnsupportedTestFramework { .. } => {
                "Retry with a supported value for the failing dimension."
            }
            Self::Credential { .. } => "Set BROWSERSTACK_USERNAME and BROWSERSTACK_ACCESS_KEY, or add them to the config file.",
            Self::Upstream { .. } => "Check credentials and service availability, then retry.",
        };
        json!({
            "kind": self.kind(),
            "message": self.to_string(),
            "supported": self.alternatives(),
            "next_step": next_step,
        })
    }
}
