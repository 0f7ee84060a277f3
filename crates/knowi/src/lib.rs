//! knowi - Client for the Knowi management and single sign-on APIs
//!
//! The management API authenticates with a bearer token obtained by
//! exchanging a client ID and secret. [`Knowi`] owns that exchange: it
//! fetches a token on first use, caches it, and on a 401 or 403 response
//! discards it, fetches a fresh one and retries the call once.
//!
//! Endpoint groups hang off the client ([`Knowi::dashboards`],
//! [`Knowi::queries`], ...). Anything not covered by a group can be sent
//! through [`Knowi::execute`] and still gets the same authorization.
//!
//! The single sign-on endpoints use a customer token instead and are served
//! by [`SsoClient`].
//!
//! # Example
//!
//! ```no_run
//! use knowi::{ApiRequest, Credentials, Knowi};
//!
//! # async fn example() -> knowi::Result<()> {
//! let client = Knowi::new(Credentials::new("client-id", "client-secret")?)?;
//!
//! let queries = client.queries().list(&[]).await?;
//! let raw: serde_json::Value = client
//!     .execute_json(&ApiRequest::get("/kpi"))
//!     .await?;
//! # let _ = (queries, raw);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod sso;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-export primary types at crate root for convenience
pub use auth::{BearerToken, Credentials, TokenSession};
pub use client::{Knowi, KnowiBuilder};
pub use config::ClientConfig;
pub use error::Error;
pub use http::{ApiRequest, ApiResponse, Transport};
pub use sso::{NewSubCustomer, SsoClient, SsoSession, SsoUser, SubCustomerUpdate};
pub use types::{
    AccessLevel, AssetType, BaseUrl, ContentFilter, FilterOperator, ShareLink, ShareTarget,
    ShareType,
};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
