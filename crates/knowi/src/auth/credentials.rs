//! Client credentials type.

use std::fmt;

use crate::error::{ConfigError, Error};

/// Client credentials for the management API.
///
/// Holds the client id and secret that are exchanged for a bearer token.
/// Both values are validated at construction and never change afterwards.
///
/// # Security
///
/// The secret is never exposed in Debug output to prevent accidental logging.
///
/// # Example
///
/// ```
/// use knowi::Credentials;
///
/// let creds = Credentials::new("client-id", "client-secret").unwrap();
/// assert_eq!(creds.client_id(), "client-id");
///
/// assert!(Credentials::new("client-id", "").is_err());
/// ```
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
}

impl Credentials {
    /// Create new credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if either value is empty or only
    /// whitespace.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, Error> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();

        if client_id.trim().is_empty() {
            return Err(ConfigError::Missing { field: "client_id" }.into());
        }
        if client_secret.trim().is_empty() {
            return Err(ConfigError::Missing {
                field: "client_secret",
            }
            .into());
        }

        Ok(Self {
            client_id,
            client_secret,
        })
    }

    /// Returns the client id.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the client secret.
    ///
    /// Only used when building the credential exchange request.
    pub(crate) fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credentials_hides_secret_in_debug() {
        let creds = Credentials::new("abc", "xyz-secret").unwrap();
        let debug = format!("{:?}", creds);
        assert!(debug.contains("abc"));
        assert!(!debug.contains("xyz-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn blank_values_are_rejected() {
        let err = Credentials::new("", "xyz").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::Missing { field: "client_id" })
        ));

        let err = Credentials::new("abc", "   ").unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::Missing {
                field: "client_secret"
            })
        ));
    }
}
