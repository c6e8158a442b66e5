use std::fmt;

/// Username/access-key pair used for basic authentication against the cloud.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub access_key: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, access_key: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            access_key: access_key.into(),
        }
    }

    /// The `user:secret` form expected by instruction templates.
    pub fn as_pair(&self) -> String {
        format!("{}:{}", self.username, self.access_key)
    }
}

// Keep the access key out of logs and panic messages.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("access_key", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_access_key() {
        let credentials = Credentials::new("alice", "s3cr3t-key");
        let rendered = format!("{credentials:?}");
        assert!(rendered.contains("alice"));
        assert!(!rendered.contains("s3cr3t-key"));
        assert_eq!(credentials.as_pair(), "alice:s3cr3t-key");
    }
}
