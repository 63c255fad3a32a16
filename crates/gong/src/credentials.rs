//! Gong API credentials.

use secrecy::{ExposeSecret, SecretString};

use crate::{Error, Result};

/// Access key and secret issued by Gong.
///
/// Validated once on construction and read-only afterwards. The secret is
/// redacted from `Debug` output.
#[derive(Debug, Clone)]
pub struct Credentials {
    access_key: String,
    access_secret: SecretString,
}

impl Credentials {
    /// Create credentials, rejecting an empty key or secret.
    pub fn new(access_key: impl Into<String>, access_secret: impl Into<String>) -> Result<Self> {
        let access_key = access_key.into();
        let access_secret = access_secret.into();

        if access_key.trim().is_empty() {
            return Err(Error::Configuration("Gong access key is missing".into()));
        }
        if access_secret.trim().is_empty() {
            return Err(Error::Configuration("Gong access secret is missing".into()));
        }

        Ok(Self {
            access_key,
            access_secret: SecretString::from(access_secret),
        })
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub(crate) fn secret(&self) -> &str {
        self.access_secret.expose_secret()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_key() {
        let err = Credentials::new("", "secret").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn rejects_blank_secret() {
        let err = Credentials::new("key", "   ").unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn debug_hides_secret() {
        let creds = Credentials::new("key", "hunter2").unwrap();
        let debug = format!("{creds:?}");
        assert!(debug.contains("key"));
        assert!(!debug.contains("hunter2"));
    }
}
