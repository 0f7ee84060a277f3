//! Management API client.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::Result;
use crate::api::{
    CategoriesApi, DashboardsApi, DatasetsApi, DatasourcesApi, GroupsApi, NlpApi, QueriesApi,
    SystemApi, UsersApi, WidgetsApi,
};
use crate::auth::{BearerToken, Credentials, TokenSession};
use crate::config::{ClientConfig, DEFAULT_BASE_URL};
use crate::http::{ApiRequest, ApiResponse, ReqwestTransport, RequestExecutor, Transport};
use crate::types::BaseUrl;

/// Client for the bearer-token management API.
///
/// Every request goes through one [`TokenSession`]: the first call performs
/// the credential exchange, later calls reuse the cached token, and a call
/// rejected with 401 or 403 is retried once with a fresh token.
///
/// Cheap to clone; clones share the token cache.
///
/// # Example
///
/// ```no_run
/// use knowi::Knowi;
///
/// # async fn example() -> knowi::Result<()> {
/// let client = Knowi::builder()
///     .client_id("my-client-id")
///     .client_secret("my-client-secret")
///     .build()?;
///
/// let dashboards = client.dashboards().list(&[]).await?;
/// println!("{}", dashboards);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Knowi {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    executor: RequestExecutor,
}

impl Knowi {
    /// Create a new client builder.
    pub fn builder() -> KnowiBuilder {
        KnowiBuilder::new()
    }

    /// Create a client for the hosted service with default settings.
    pub fn new(credentials: Credentials) -> Result<Self> {
        let config = ClientConfig::new(BaseUrl::new(DEFAULT_BASE_URL)?);
        Self::from_config(credentials, config)
    }

    /// Create a client from explicit configuration and the default transport.
    pub fn from_config(credentials: Credentials, config: ClientConfig) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.timeout, &config.user_agent)?);
        Self::with_transport(credentials, config, transport)
    }

    /// Create a client that sends requests through `transport`.
    pub fn with_transport(
        credentials: Credentials,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Result<Self> {
        let auth_url = config.auth_url()?;
        let session = Arc::new(
            TokenSession::new(credentials, auth_url, transport.clone())
                .with_expiry_margin(config.expiry_margin),
        );
        let executor = RequestExecutor::new(config.base_url.clone(), transport, session);

        Ok(Self {
            inner: Arc::new(ClientInner { config, executor }),
        })
    }

    /// Returns the client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Returns the API root.
    pub fn base_url(&self) -> &BaseUrl {
        &self.inner.config.base_url
    }

    /// Returns the token session.
    pub fn session(&self) -> &TokenSession {
        self.inner.executor.session()
    }

    /// Returns a valid bearer token, exchanging credentials if needed.
    pub async fn bearer_token(&self) -> Result<BearerToken> {
        self.session().get_valid_token().await
    }

    /// Discard the cached token so that the next call exchanges again.
    pub async fn invalidate_token(&self) {
        self.session().invalidate().await
    }

    /// Execute an arbitrary request against the management API.
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        self.inner.executor.execute(request).await
    }

    /// Execute an arbitrary request and decode the body as JSON.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        self.inner.executor.execute_json(request).await
    }

    /// Access the dashboards API.
    pub fn dashboards(&self) -> DashboardsApi {
        DashboardsApi::new(self.clone())
    }

    /// Access the widgets API.
    pub fn widgets(&self) -> WidgetsApi {
        WidgetsApi::new(self.clone())
    }

    /// Access the datasources API.
    pub fn datasources(&self) -> DatasourcesApi {
        DatasourcesApi::new(self.clone())
    }

    /// Access the queries API.
    pub fn queries(&self) -> QueriesApi {
        QueriesApi::new(self.clone())
    }

    /// Access the categories API.
    pub fn categories(&self) -> CategoriesApi {
        CategoriesApi::new(self.clone())
    }

    /// Access the groups API.
    pub fn groups(&self) -> GroupsApi {
        GroupsApi::new(self.clone())
    }

    /// Access the users API.
    pub fn users(&self) -> UsersApi {
        UsersApi::new(self.clone())
    }

    /// Access the datasets API.
    pub fn datasets(&self) -> DatasetsApi {
        DatasetsApi::new(self.clone())
    }

    /// Access the system health API.
    pub fn system(&self) -> SystemApi {
        SystemApi::new(self.clone())
    }

    /// Access the natural language query API.
    pub fn nlp(&self) -> NlpApi {
        NlpApi::new(self.clone())
    }
}

impl fmt::Debug for Knowi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Knowi")
            .field("base_url", &self.inner.config.base_url.as_str())
            .field("session", self.session())
            .finish()
    }
}

/// Builder for [`Knowi`].
///
/// Validation happens in [`KnowiBuilder::build`], before any network call:
/// missing credentials or an unusable URL fail there with a configuration
/// error.
#[derive(Default)]
pub struct KnowiBuilder {
    client_id: Option<String>,
    client_secret: Option<String>,
    base_url: Option<String>,
    auth_path: Option<String>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    expiry_margin: Option<Duration>,
    transport: Option<Arc<dyn Transport>>,
}

impl KnowiBuilder {
    /// Create a builder with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the client id.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Set the client secret.
    pub fn client_secret(mut self, client_secret: impl Into<String>) -> Self {
        self.client_secret = Some(client_secret.into());
        self
    }

    /// Set both credentials from a validated value.
    pub fn credentials(mut self, credentials: &Credentials) -> Self {
        self.client_id = Some(credentials.client_id().to_string());
        self.client_secret = Some(credentials.client_secret().to_string());
        self
    }

    /// Set the API root. Defaults to the hosted service.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the credential exchange path, relative to the base URL.
    pub fn auth_path(mut self, path: impl Into<String>) -> Self {
        self.auth_path = Some(path.into());
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

    /// Refresh tokens with a known lifetime this long before they expire.
    pub fn expiry_margin(mut self, margin: Duration) -> Self {
        self.expiry_margin = Some(margin);
        self
    }

    /// Send requests through a custom transport.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<Knowi> {
        let credentials = Credentials::new(
            self.client_id.unwrap_or_default(),
            self.client_secret.unwrap_or_default(),
        )?;

        let base_url = BaseUrl::new(self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))?;
        let mut config = ClientConfig::new(base_url);
        if let Some(auth_path) = self.auth_path {
            config.auth_path = auth_path;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(user_agent) = self.user_agent {
            config.user_agent = user_agent;
        }
        if let Some(margin) = self.expiry_margin {
            config.expiry_margin = margin;
        }

        match self.transport {
            Some(transport) => Knowi::with_transport(credentials, config, transport),
            None => Knowi::from_config(credentials, config),
        }
    }
}

impl fmt::Debug for KnowiBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnowiBuilder")
            .field("client_id", &self.client_id)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("auth_path", &self.auth_path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::error::ConfigError;

    #[test]
    fn builder_requires_secret() {
        let err = Knowi::builder().client_id("abc").build().unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::Missing {
                field: "client_secret"
            })
        ));
    }

    #[test]
    fn builder_accepts_plain_http_hosts() {
        let client = Knowi::builder()
            .client_id("abc")
            .client_secret("xyz")
            .base_url("http://knowi.internal:8080/api/1.0")
            .build()
            .unwrap();
        assert_eq!(
            client.session().auth_url().as_str(),
            "http://knowi.internal:8080/api/1.0/auth"
        );
    }

    #[test]
    fn builder_rejects_other_schemes() {
        let err = Knowi::builder()
            .client_id("abc")
            .client_secret("xyz")
            .base_url("ftp://knowi.internal/api/1.0")
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::BaseUrl { .. })));
    }

    #[test]
    fn builder_applies_overrides() {
        let client = Knowi::builder()
            .client_id("abc")
            .client_secret("xyz")
            .base_url("http://localhost:9090/api/1.0/")
            .auth_path("/login")
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();

        assert_eq!(client.config().timeout, Duration::from_secs(5));
        assert_eq!(
            client.session().auth_url().as_str(),
            "http://localhost:9090/api/1.0/login"
        );
    }

    #[test]
    fn debug_hides_secret() {
        let builder = Knowi::builder().client_id("abc").client_secret("xyz-secret");
        assert!(!format!("{:?}", builder).contains("xyz-secret"));

        let client = builder.build().unwrap();
        let debug = format!("{:?}", client);
        assert!(debug.contains("abc"));
        assert!(!debug.contains("xyz-secret"));
    }
}
