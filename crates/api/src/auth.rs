use std::env;

use bstack_types::{Credentials, ResolutionError};

pub const USERNAME_ENV: &str = "BROWSERSTACK_USERNAME";
pub const ACCESS_KEY_ENV: &str = "BROWSERSTACK_ACCESS_KEY";

/// Source of the credentials used for authenticated calls.
pub trait AuthProvider: Send + Sync {
    /// Returns both credential parts, or a credential error naming the missing one.
    fn credentials(&self) -> Result<Credentials, ResolutionError>;
}

/// Credentials fixed at construction time, typically from config plus environment.
#[derive(Clone, Default)]
pub struct StaticAuthProvider {
    username: Option<String>,
    access_key: Option<String>,
}

impl StaticAuthProvider {
    pub fn new(username: Option<String>, access_key: Option<String>) -> Self {
        Self {
            username: non_blank(username),
            access_key: non_blank(access_key),
        }
    }

    /// Environment values win over whatever was configured.
    pub fn with_env_overrides(self) -> Self {
        Self {
            username: non_blank(env::var(USERNAME_ENV).ok()).or(self.username),
            access_key: non_blank(env::var(ACCESS_KEY_ENV).ok()).or(self.access_key),
        }
    }
}

impl AuthProvider for StaticAuthProvider {
    fn credentials(&self) -> Result<Credentials, ResolutionError> {
        let username = self
            .username
            .clone()
            .ok_or_else(|| ResolutionError::credential(format!("username ({USERNAME_ENV})")))?;
        let access_key = self
            .access_key
            .clone()
            .ok_or_else(|| ResolutionError::credential(format!("access key ({ACCESS_KEY_ENV})")))?;
        Ok(Credentials::new(username, access_key))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|inner| inner.trim().to_string()).filter(|inner| !inner.is_empty())
}
