//! Customer-token client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::Result;
use crate::config::{DEFAULT_SSO_HOST, DEFAULT_TIMEOUT, default_user_agent};
use crate::error::{ConfigError, InvalidInputError};
use crate::http::{ApiRequest, ApiResponse, ReqwestTransport, Transport, send_unauthenticated};
use crate::types::BaseUrl;

/// Client for the single sign-on endpoints under `/sso`.
///
/// These endpoints authenticate with the account's customer token, or with
/// a user session token obtained from [`SsoClient::create_session`], passed
/// as a request parameter. No bearer token is involved, so a rejected call
/// is reported as is and never retried.
///
/// # Example
///
/// ```no_run
/// use knowi::SsoClient;
///
/// # async fn example() -> knowi::Result<()> {
/// let sso = SsoClient::new("customer-token")?;
/// let user_token = sso.create_user(&knowi::SsoUser::new("viewer@example.com")).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SsoClient {
    inner: Arc<SsoInner>,
}

struct SsoInner {
    host: BaseUrl,
    customer_token: String,
    transport: Arc<dyn Transport>,
}

impl SsoClient {
    /// Create a new client builder.
    pub fn builder() -> SsoClientBuilder {
        SsoClientBuilder::default()
    }

    /// Create a client for the hosted service.
    pub fn new(customer_token: impl Into<String>) -> Result<Self> {
        Self::builder().customer_token(customer_token).build()
    }

    /// Returns the host the `/sso` paths are resolved against.
    pub fn host(&self) -> &BaseUrl {
        &self.inner.host
    }

    pub(crate) fn customer_token(&self) -> &str {
        &self.inner.customer_token
    }

    /// Execute a request against an `/sso` path.
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        if !request.path().trim_start_matches('/').starts_with("sso/") {
            return Err(InvalidInputError::Other {
                message: format!(
                    "'{}' is not a customer-token endpoint; use the management client",
                    request.path()
                ),
            }
            .into());
        }
        send_unauthenticated(self.inner.transport.as_ref(), &self.inner.host, request).await
    }
}

impl fmt::Debug for SsoClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsoClient")
            .field("host", &self.inner.host.as_str())
            .field("customer_token", &"[REDACTED]")
            .finish()
    }
}

/// Builder for [`SsoClient`].
#[derive(Default)]
pub struct SsoClientBuilder {
    customer_token: Option<String>,
    host: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    transport: Option<Arc<dyn Transport>>,
}

impl SsoClientBuilder {
    /// Set the customer token.
    pub fn customer_token(mut self, token: impl Into<String>) -> Self {
        self.customer_token = Some(token.into());
        self
    }

    /// Set the host. Defaults to the hosted service.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Send requests through a custom transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<SsoClient> {
        let customer_token = self
            .customer_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::Missing {
                field: "customer_token",
            })?;

        let host = BaseUrl::new(self.host.as_deref().unwrap_or(DEFAULT_SSO_HOST))?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => {
                let user_agent = self.user_agent.unwrap_or_else(default_user_agent);
                Arc::new(ReqwestTransport::new(
                    self.timeout.unwrap_or(DEFAULT_TIMEOUT),
                    &user_agent,
                )?)
            }
        };

        Ok(SsoClient {
            inner: Arc::new(SsoInner {
                host,
                customer_token,
                transport,
            }),
        })
    }
}
