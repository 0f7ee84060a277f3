//! Authenticated request execution with a single refresh-and-retry.

use std::fmt;
use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use super::request::ApiRequest;
use super::response::ApiResponse;
use super::transport::{HttpRequest, HttpResponse, Transport};
use crate::Result;
use crate::auth::{BearerToken, TokenSession};
use crate::error::{ApiError, AuthError, InvalidInputError, error_message};
use crate::types::BaseUrl;

/// Sends management API requests with a bearer token attached.
///
/// A response with status 401 or 403 is treated as a token rejection: the
/// token that was sent is invalidated, a fresh one is obtained, and the call
/// is retried exactly once. Any other status is returned to the caller
/// without a retry.
#[derive(Clone)]
pub struct RequestExecutor {
    base_url: BaseUrl,
    transport: Arc<dyn Transport>,
    session: Arc<TokenSession>,
}

impl RequestExecutor {
    /// Create an executor for `base_url` that authorizes through `session`.
    pub fn new(base_url: BaseUrl, transport: Arc<dyn Transport>, session: Arc<TokenSession>) -> Self {
        Self {
            base_url,
            transport,
            session,
        }
    }

    /// Returns the API root requests are resolved against.
    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    /// Returns the token session.
    pub fn session(&self) -> &Arc<TokenSession> {
        &self.session
    }

    /// Execute a request and return the successful response.
    ///
    /// # Errors
    ///
    /// - [`AuthError::Rejected`] if the retried call is rejected again
    /// - [`ApiError`] for any other non-success status
    /// - Token acquisition and network errors as they occur
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    pub async fn execute(&self, request: &ApiRequest) -> Result<ApiResponse> {
        if request.path().trim_start_matches('/').starts_with("sso/") {
            return Err(InvalidInputError::Other {
                message: format!(
                    "'{}' is a customer-token endpoint and cannot be called with a bearer token",
                    request.path()
                ),
            }
            .into());
        }

        let url = build_url(&self.base_url, request)?;

        let token = self.session.get_valid_token().await?;
        let response = self.send(request, &url, &token).await?;
        if !is_rejection(response.status) {
            return into_result(response);
        }

        warn!(
            status = response.status.as_u16(),
            "Token rejected, refreshing and retrying once"
        );
        self.session.invalidate_if_current(&token).await;

        let token = self.session.get_valid_token().await?;
        let response = self.send(request, &url, &token).await?;
        if is_rejection(response.status) {
            let body = String::from_utf8_lossy(&response.body);
            return Err(AuthError::Rejected {
                status: response.status.as_u16(),
                message: error_message(&body),
            }
            .into());
        }

        into_result(response)
    }

    /// Execute a request and decode its body as JSON.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T> {
        self.execute(request).await?.json()
    }

    async fn send(
        &self,
        request: &ApiRequest,
        url: &Url,
        token: &BearerToken,
    ) -> Result<HttpResponse> {
        let mut headers = default_headers();
        let authorization = HeaderValue::from_str(&token.authorization())
            .map_err(|_| AuthError::InvalidTokenCharacters)?;
        headers.insert(AUTHORIZATION, authorization);

        let response = self
            .transport
            .send(HttpRequest {
                method: request.method().clone(),
                url: url.clone(),
                headers,
                body: request.body().clone(),
            })
            .await?;

        debug!(status = response.status.as_u16(), "Response received");
        Ok(response)
    }
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Send a request that carries no bearer token and map its status.
pub(crate) async fn send_unauthenticated(
    transport: &dyn Transport,
    base_url: &BaseUrl,
    request: &ApiRequest,
) -> Result<ApiResponse> {
    let url = build_url(base_url, request)?;
    let response = transport
        .send(HttpRequest {
            method: request.method().clone(),
            url,
            headers: default_headers(),
            body: request.body().clone(),
        })
        .await?;

    debug!(status = response.status.as_u16(), "Response received");
    into_result(response)
}

/// Resolve a request's path and query against a base URL.
fn build_url(base_url: &BaseUrl, request: &ApiRequest) -> Result<Url> {
    let mut url = base_url.endpoint(request.path())?;
    if !request.query_pairs().is_empty() {
        url.query_pairs_mut().extend_pairs(request.query_pairs());
    }
    Ok(url)
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers
}

fn is_rejection(status: StatusCode) -> bool {
    status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN
}

fn into_result(response: HttpResponse) -> Result<ApiResponse> {
    if response.status.is_success() {
        Ok(ApiResponse::from(response))
    } else {
        let body = String::from_utf8_lossy(&response.body).into_owned();
        Err(ApiError::new(response.status.as_u16(), body).into())
    }
}
