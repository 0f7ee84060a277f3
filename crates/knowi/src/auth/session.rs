//! Bearer token acquisition and caching.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, trace};
use url::Url;

use crate::Result;
use crate::config::DEFAULT_EXPIRY_MARGIN;
use crate::error::{AuthError, error_message};
use crate::http::{HttpRequest, RequestBody, Transport};

use super::credentials::Credentials;
use super::tokens::BearerToken;

/// Owns the credentials and the cached bearer token.
///
/// At most one token is cached at a time. The first call to
/// [`TokenSession::get_valid_token`] performs the credential exchange, and
/// later calls reuse the cached token until it is invalidated or known to be
/// expired.
///
/// # Thread Safety
///
/// The token slot is guarded by an async mutex that is held across the
/// exchange, so concurrent callers that find the slot empty trigger a single
/// exchange and all receive its token.
pub struct TokenSession {
    credentials: Credentials,
    auth_url: Url,
    transport: Arc<dyn Transport>,
    expiry_margin: Duration,
    slot: Mutex<TokenSlot>,
}

#[derive(Default)]
struct TokenSlot {
    token: Option<BearerToken>,
    exchanges: u64,
}

#[derive(Deserialize)]
struct ExchangeResponse {
    #[serde(alias = "access_token")]
    token: String,
    #[serde(rename = "expiresIn", alias = "expires_in", default)]
    expires_in: Option<u64>,
}

impl TokenSession {
    /// Create a session with an empty token slot.
    pub fn new(credentials: Credentials, auth_url: Url, transport: Arc<dyn Transport>) -> Self {
        Self {
            credentials,
            auth_url,
            transport,
            expiry_margin: DEFAULT_EXPIRY_MARGIN,
            slot: Mutex::new(TokenSlot::default()),
        }
    }

    /// Treat tokens as expired this long before their reported expiry.
    pub fn with_expiry_margin(mut self, margin: Duration) -> Self {
        self.expiry_margin = margin;
        self
    }

    /// Returns the credentials this session exchanges.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Returns the credential exchange endpoint.
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Returns a usable bearer token, exchanging credentials if needed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::ExchangeRejected`] or
    /// [`AuthError::MalformedExchange`] if the exchange fails, or a network
    /// error if the auth endpoint is unreachable. The slot stays empty in
    /// every failure case.
    #[instrument(skip(self), fields(client_id = %self.credentials.client_id()))]
    pub async fn get_valid_token(&self) -> Result<BearerToken> {
        let mut slot = self.slot.lock().await;

        if let Some(token) = &slot.token {
            if !token.is_expired(self.expiry_margin) {
                trace!("Reusing cached token");
                return Ok(token.clone());
            }
            debug!("Cached token is about to expire");
            slot.token = None;
        }

        slot.exchanges += 1;
        let token = self.exchange().await?.with_generation(slot.exchanges);
        slot.token = Some(token.clone());
        Ok(token)
    }

    /// Discard the cached token. The next call exchanges again.
    pub async fn invalidate(&self) {
        let mut slot = self.slot.lock().await;
        if slot.token.take().is_some() {
            debug!("Cached token invalidated");
        }
    }

    /// Discard the cached token only if it is still `rejected`.
    ///
    /// Returns false when another caller already replaced it, in which case
    /// the newer token is kept.
    pub(crate) async fn invalidate_if_current(&self, rejected: &BearerToken) -> bool {
        let mut slot = self.slot.lock().await;
        match &slot.token {
            Some(current) if current.same_as(rejected) => {
                slot.token = None;
                debug!("Rejected token invalidated");
                true
            }
            _ => false,
        }
    }

    /// Returns true if a token is currently cached.
    pub async fn has_token(&self) -> bool {
        self.slot.lock().await.token.is_some()
    }

    /// Returns how many credential exchanges this session has attempted.
    pub async fn exchange_count(&self) -> u64 {
        self.slot.lock().await.exchanges
    }

    async fn exchange(&self) -> Result<BearerToken> {
        info!("Exchanging client credentials for a bearer token");

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let request = HttpRequest {
            method: Method::POST,
            url: self.auth_url.clone(),
            headers,
            body: RequestBody::Form(vec![
                (
                    "client_id".to_string(),
                    self.credentials.client_id().to_string(),
                ),
                (
                    "client_secret".to_string(),
                    self.credentials.client_secret().to_string(),
                ),
            ]),
        };

        let response = self.transport.send(request).await?;

        if !response.status.is_success() {
            let body = String::from_utf8_lossy(&response.body);
            return Err(AuthError::ExchangeRejected {
                status: response.status.as_u16(),
                message: error_message(&body),
            }
            .into());
        }

        let parsed: ExchangeResponse =
            serde_json::from_slice(&response.body).map_err(|e| AuthError::MalformedExchange {
                reason: e.to_string(),
            })?;

        if parsed.token.trim().is_empty() {
            return Err(AuthError::MalformedExchange {
                reason: "token is empty".to_string(),
            }
            .into());
        }

        let token = BearerToken::new(parsed.token, parsed.expires_in.map(Duration::from_secs));
        if HeaderValue::from_str(&token.authorization()).is_err() {
            return Err(AuthError::MalformedExchange {
                reason: "token is not a valid header value".to_string(),
            }
            .into());
        }

        debug!(expires_in = ?parsed.expires_in, "Credential exchange succeeded");
        Ok(token)
    }
}

impl fmt::Debug for TokenSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSession")
            .field("credentials", &self.credentials)
            .field("auth_url", &self.auth_url.as_str())
            .field("expiry_margin", &self.expiry_margin)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, NetworkError};
    use crate::test_support::ScriptedTransport;

    fn session(transport: ScriptedTransport) -> (TokenSession, Arc<ScriptedTransport>) {
        let transport = Arc::new(transport);
        let session = TokenSession::new(
            Credentials::new("id-1", "secret-1").unwrap(),
            Url::parse("https://www.knowi.com/api/1.0/auth").unwrap(),
            transport.clone(),
        );
        (session, transport)
    }

    #[tokio::test]
    async fn first_call_exchanges_and_caches() {
        let (session, transport) = session(ScriptedTransport::new().respond(200, r#"{"token":"T1"}"#));

        let first = session.get_valid_token().await.unwrap();
        let second = session.get_valid_token().await.unwrap();

        assert_eq!(first.as_str(), "T1");
        assert_eq!(second.as_str(), "T1");
        assert_eq!(transport.request_count(), 1);
        assert_eq!(session.exchange_count().await, 1);

        let request = &transport.requests()[0];
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url.path(), "/api/1.0/auth");
        match &request.body {
            RequestBody::Form(pairs) => {
                assert!(pairs.contains(&("client_id".to_string(), "id-1".to_string())));
                assert!(pairs.contains(&("client_secret".to_string(), "secret-1".to_string())));
            }
            other => panic!("unexpected body {:?}", other),
        }
    }

    #[tokio::test]
    async fn hosted_field_names_are_accepted() {
        let (session, _) = session(
            ScriptedTransport::new().respond(200, r#"{"access_token":"T1","expires_in":3600}"#),
        );

        let token = session.get_valid_token().await.unwrap();
        assert_eq!(token.as_str(), "T1");
        assert!(token.expires_at().is_some());
    }

    #[tokio::test]
    async fn invalidate_forces_new_exchange() {
        let (session, transport) = session(
            ScriptedTransport::new()
                .respond(200, r#"{"token":"T1"}"#)
                .respond(200, r#"{"token":"T2"}"#),
        );

        assert_eq!(session.get_valid_token().await.unwrap().as_str(), "T1");
        session.invalidate().await;
        assert!(!session.has_token().await);
        assert_eq!(session.get_valid_token().await.unwrap().as_str(), "T2");
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn stale_rejection_keeps_newer_token() {
        let (session, _) = session(
            ScriptedTransport::new()
                .respond(200, r#"{"token":"T1"}"#)
                .respond(200, r#"{"token":"T2"}"#),
        );

        let stale = session.get_valid_token().await.unwrap();
        assert!(session.invalidate_if_current(&stale).await);
        let fresh = session.get_valid_token().await.unwrap();

        assert!(!session.invalidate_if_current(&stale).await);
        assert!(session.has_token().await);
        assert_eq!(session.get_valid_token().await.unwrap().as_str(), fresh.as_str());
    }

    #[tokio::test(start_paused = true)]
    async fn known_expiry_triggers_refresh() {
        let (session, transport) = session(
            ScriptedTransport::new()
                .respond(200, r#"{"token":"T1","expiresIn":120}"#)
                .respond(200, r#"{"token":"T2","expiresIn":120}"#),
        );

        assert_eq!(session.get_valid_token().await.unwrap().as_str(), "T1");

        tokio::time::advance(Duration::from_secs(60)).await;
        assert_eq!(session.get_valid_token().await.unwrap().as_str(), "T1");

        // Inside the 30 second margin
        tokio::time::advance(Duration::from_secs(45)).await;
        assert_eq!(session.get_valid_token().await.unwrap().as_str(), "T2");
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn rejected_exchange_leaves_slot_empty() {
        let (session, _) =
            session(ScriptedTransport::new().respond(401, r#"{"message":"bad secret"}"#));

        let err = session.get_valid_token().await.unwrap_err();
        match err {
            Error::Auth(AuthError::ExchangeRejected { status, message }) => {
                assert_eq!(status, 401);
                assert_eq!(message, "bad secret");
            }
            other => panic!("unexpected error {:?}", other),
        }
        assert!(!session.has_token().await);
    }

    #[tokio::test]
    async fn malformed_exchange_is_reported() {
        let (session, _) = session(
            ScriptedTransport::new()
                .respond(200, "not json")
                .respond(200, r#"{"token":""}"#),
        );

        assert!(matches!(
            session.get_valid_token().await.unwrap_err(),
            Error::Auth(AuthError::MalformedExchange { .. })
        ));
        assert!(matches!(
            session.get_valid_token().await.unwrap_err(),
            Error::Auth(AuthError::MalformedExchange { .. })
        ));
        assert!(!session.has_token().await);
    }

    #[tokio::test]
    async fn unsendable_token_is_not_cached() {
        let (session, transport) = session(
            ScriptedTransport::new()
                .respond(200, r#"{"token":"bad\ntoken"}"#)
                .respond(200, r#"{"token":"GOOD"}"#),
        );

        assert!(matches!(
            session.get_valid_token().await.unwrap_err(),
            Error::Auth(AuthError::MalformedExchange { .. })
        ));
        assert!(!session.has_token().await);

        assert_eq!(session.get_valid_token().await.unwrap().as_str(), "GOOD");
        assert_eq!(transport.request_count(), 2);
        assert_eq!(session.exchange_count().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn token_shorter_than_margin_is_reused() {
        let (session, transport) = session(
            ScriptedTransport::new()
                .respond(200, r#"{"token":"T1","expiresIn":20}"#)
                .respond(200, r#"{"token":"T2","expiresIn":20}"#),
        );

        for _ in 0..3 {
            assert_eq!(session.get_valid_token().await.unwrap().as_str(), "T1");
        }
        assert_eq!(session.exchange_count().await, 1);

        // Half the lifetime has passed
        tokio::time::advance(Duration::from_secs(10)).await;
        assert_eq!(session.get_valid_token().await.unwrap().as_str(), "T2");
        assert_eq!(transport.request_count(), 2);
    }

    #[tokio::test]
    async fn transport_failure_is_network_error() {
        let (session, _) = session(ScriptedTransport::new().fail(NetworkError::Connection {
            message: "refused".to_string(),
        }));

        assert!(matches!(
            session.get_valid_token().await.unwrap_err(),
            Error::Network(NetworkError::Connection { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_share_one_exchange() {
        let (session, transport) = session(ScriptedTransport::new().respond(200, r#"{"token":"T1"}"#));
        let session = Arc::new(session);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let session = session.clone();
                tokio::spawn(async move { session.get_valid_token().await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap().as_str(), "T1");
        }
        assert_eq!(transport.request_count(), 1);
    }

    #[test]
    fn debug_hides_secret() {
        let (session, _) = session(ScriptedTransport::new());
        let debug = format!("{:?}", session);
        assert!(!debug.contains("secret-1"));
        assert!(debug.contains("[REDACTED]"));
    }
}
