//! Transport and credential collaborators for the resolution engine.
//!
//! The engine never talks to `reqwest` directly. It depends on the
//! [`HttpTransport`] capability (perform a request, get status + body back)
//! and on an [`AuthProvider`] that either yields [`Credentials`] or fails with
//! a credential error. [`ReqwestTransport`] and [`StaticAuthProvider`] are the
//! production implementations; tests substitute their own.

mod auth;
mod client;
mod transport;

pub use auth::{ACCESS_KEY_ENV, AuthProvider, StaticAuthProvider, USERNAME_ENV};
pub use client::{ReqwestTransport, validate_base_url};
pub use transport::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, TransportError};

pub use bstack_types::Credentials;
