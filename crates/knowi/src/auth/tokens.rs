//! Bearer token type.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// A bearer token obtained from a credential exchange.
///
/// Tokens are replaced wholesale on refresh and never mutated in place.
///
/// # Security
///
/// - Never logged or displayed in Debug output
/// - Treat as opaque; do not parse or inspect
#[derive(Clone)]
pub struct BearerToken {
    value: String,
    generation: u64,
    expires_at: Option<Instant>,
    expires_at_utc: Option<DateTime<Utc>>,
    ttl: Option<Duration>,
}

impl BearerToken {
    /// Create a token issued now with an optional time to live.
    pub(crate) fn new(value: impl Into<String>, ttl: Option<Duration>) -> Self {
        let issued_at = Instant::now();
        let expires_at = ttl.and_then(|ttl| issued_at.checked_add(ttl));
        let expires_at_utc = ttl
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .and_then(|ttl| Utc::now().checked_add_signed(ttl));

        Self {
            value: value.into(),
            generation: 0,
            expires_at,
            expires_at_utc,
            ttl,
        }
    }

    /// Tag the token with the exchange counter of the session that issued it.
    pub(crate) fn with_generation(mut self, generation: u64) -> Self {
        self.generation = generation;
        self
    }

    /// Returns the token value.
    ///
    /// # Security
    ///
    /// Use only when constructing authorization headers.
    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Returns the monotonic instant the token expires at, if the exchange
    /// reported a lifetime.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }

    /// Returns the wall-clock expiry, if known.
    pub fn expires_at_utc(&self) -> Option<DateTime<Utc>> {
        self.expires_at_utc
    }

    /// Returns true if the token is known to expire within `margin` from now.
    ///
    /// The margin is capped at half the token's lifetime, so a token that was
    /// issued with a lifetime shorter than `margin` is still usable when
    /// fresh. A token without a known lifetime is never considered expired;
    /// the server's rejection is the only signal for it.
    pub fn is_expired(&self, margin: Duration) -> bool {
        self.is_expired_at(Instant::now(), margin)
    }

    pub(crate) fn is_expired_at(&self, now: Instant, margin: Duration) -> bool {
        match (self.expires_at, self.ttl) {
            (Some(expires_at), Some(ttl)) => now + margin.min(ttl / 2) >= expires_at,
            _ => false,
        }
    }

    /// Returns true if both values came from the same exchange.
    pub(crate) fn same_as(&self, other: &BearerToken) -> bool {
        self.generation == other.generation && self.value == other.value
    }

    /// The `Authorization` header value for this token.
    pub(crate) fn authorization(&self) -> String {
        format!("Bearer {}", self.value)
    }
}

// Hide token value in Debug output
impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BearerToken")
            .field("value", &"[REDACTED]")
            .field("expires_at", &self.expires_at_utc)
            .finish()
    }
}
