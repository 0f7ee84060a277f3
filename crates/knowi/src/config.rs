//! Client configuration and defaults.

use std::time::Duration;

use url::Url;

use crate::Result;
use crate::error::ConfigError;
use crate::types::BaseUrl;

/// Management API root used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://www.knowi.com/api/1.0";

/// Host serving the customer-token (`/sso`) endpoints.
pub const DEFAULT_SSO_HOST: &str = "https://www.knowi.com";

/// Credential exchange path, relative to the base URL.
///
/// The hosted service also answers on `/login`.
pub const DEFAULT_AUTH_PATH: &str = "/auth";

/// Default timeout for requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Tokens with a known lifetime are refreshed this long before they expire.
pub const DEFAULT_EXPIRY_MARGIN: Duration = Duration::from_secs(30);

/// Settings shared by every request a client makes.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root every endpoint path is joined to.
    pub base_url: BaseUrl,
    /// Credential exchange path, relative to `base_url`.
    pub auth_path: String,
    /// Timeout for each HTTP request, including the exchange.
    pub timeout: Duration,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
    /// How long before a reported expiry a token is refreshed. Capped at half
    /// the token's lifetime.
    pub expiry_margin: Duration,
}

impl ClientConfig {
    /// Defaults for everything except the base URL.
    pub fn new(base_url: BaseUrl) -> Self {
        Self {
            base_url,
            auth_path: DEFAULT_AUTH_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: default_user_agent(),
            expiry_margin: DEFAULT_EXPIRY_MARGIN,
        }
    }

    /// Resolve the credential exchange URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::AuthPath`] if the path is blank or carries a
    /// query string.
    pub fn auth_url(&self) -> Result<Url> {
        let path = self.auth_path.trim();
        if path.trim_start_matches('/').is_empty() || path.contains('?') {
            return Err(ConfigError::AuthPath {
                value: self.auth_path.clone(),
            }
            .into());
        }
        self.base_url.endpoint(path).map_err(|_| {
            ConfigError::AuthPath {
                value: self.auth_path.clone(),
            }
            .into()
        })
    }
}

pub(crate) fn default_user_agent() -> String {
    format!("knowi-rs/{}", env!("CARGO_PKG_VERSION"))
}
