//! Error types for the knowi library.
//!
//! This module provides a unified error type with explicit variants for
//! configuration, authentication, transport, API, protocol, and input
//! validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for knowi operations.
///
/// Every public operation surfaces failures through this type. Nothing is
/// retried or suppressed internally except the single retry that follows an
/// authorization rejection.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid client configuration (credentials, base URL, HTTP client).
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Authentication errors (credential exchange failed, call rejected twice).
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Network transport errors (DNS, TLS, connection, timeout).
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Non-success status other than an authorization rejection.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Response body could not be decoded as expected.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Endpoint parameters rejected before anything was sent.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(err) => Some(err.status),
            Error::Auth(AuthError::ExchangeRejected { status, .. })
            | Error::Auth(AuthError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Auth(_))
    }

    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api(ApiError { status: 404, .. }))
    }
}

/// Configuration errors, raised at construction time before any network call.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required setting is absent or blank.
    #[error("missing required setting: {field}")]
    Missing { field: &'static str },

    /// The base URL is not usable.
    #[error("invalid base URL '{value}': {reason}")]
    BaseUrl { value: String, reason: String },

    /// The auth endpoint path is not usable.
    #[error("invalid auth path '{value}'")]
    AuthPath { value: String },

    /// The underlying HTTP client could not be built.
    #[error("failed to build HTTP client: {message}")]
    HttpClient { message: String },
}

/// Authentication-related errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credential exchange returned a non-success status.
    #[error("credential exchange rejected (HTTP {status}): {message}")]
    ExchangeRejected { status: u16, message: String },

    /// The credential exchange succeeded but its body was unusable.
    #[error("malformed credential exchange response: {reason}")]
    MalformedExchange { reason: String },

    /// The call was still rejected after refreshing the token once.
    #[error("request rejected after token refresh (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// The token cannot be placed in an Authorization header.
    #[error("bearer token contains characters not allowed in a header")]
    InvalidTokenCharacters,
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            NetworkError::Connection {
                message: err.to_string(),
            }
        } else {
            NetworkError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Network(NetworkError::from(err))
    }
}

/// A non-success response that was not an authorization rejection.
#[derive(Debug)]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// The `message` field of a JSON error body, or the raw body text.
    pub message: String,
    /// The raw response body.
    pub body: String,
}

impl ApiError {
    /// Build an error from a status and raw body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        let message = error_message(&body);
        Self {
            status,
            message,
            body,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

/// Response decoding errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The body was not valid JSON of the expected shape.
    #[error("failed to decode {expected} from response body: {reason}")]
    Decode { expected: &'static str, reason: String },

    /// The body was not valid UTF-8 text.
    #[error("response body is not valid UTF-8")]
    NotText,

    /// A field the operation relies on was absent.
    #[error("response is missing field '{field}'")]
    MissingField { field: &'static str },

    /// Request parameters could not be encoded.
    #[error("failed to encode request parameters: {reason}")]
    Encode { reason: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// A required parameter was absent or blank.
    #[error("missing parameter '{name}'")]
    Missing { name: &'static str },

    /// Parameters that must be supplied together were not.
    #[error("'{name}' requires '{requires}'")]
    Requires {
        name: &'static str,
        requires: &'static str,
    },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}

/// Extract a human-readable message from an error body.
///
/// The platform reports errors as `{"message": "..."}` on most endpoints and
/// as plain text on the rest.
pub(crate) fn error_message(body: &str) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            message: Some(message),
            ..
        }) => message,
        Ok(ErrorBody {
            error: Some(error), ..
        }) => error,
        _ => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_prefers_json_message() {
        let err = ApiError::new(500, r#"{"message":"query failed","code":12}"#);
        assert_eq!(err.message, "query failed");
        assert_eq!(err.to_string(), "HTTP 500: query failed");
    }

    #[test]
    fn api_error_falls_back_to_text() {
        let err = ApiError::new(502, "Bad Gateway\n");
        assert_eq!(err.message, "Bad Gateway");
        assert!(err.body.ends_with('\n'));
    }

    #[test]
    fn status_covers_api_and_auth_errors() {
        let api: Error = ApiError::new(404, "").into();
        assert_eq!(api.status(), Some(404));
        assert!(api.is_not_found());
        assert_eq!(api.to_string(), "API error: HTTP 404");

        let auth: Error = AuthError::Rejected {
            status: 401,
            message: "expired".to_string(),
        }
        .into();
        assert_eq!(auth.status(), Some(401));
        assert!(auth.is_auth_error());

        let config: Error = ConfigError::Missing {
            field: "client_secret",
        }
        .into();
        assert_eq!(config.status(), None);
    }
}
