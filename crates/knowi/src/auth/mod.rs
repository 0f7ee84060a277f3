//! Credentials, bearer tokens and the token session.
//!
//! Every management call obtains its `Authorization` header from a
//! [`TokenSession`], which performs the credential exchange lazily and
//! caches the resulting [`BearerToken`].

mod credentials;
mod session;
mod tokens;

pub use credentials::Credentials;
pub use session::TokenSession;
pub use tokens::BearerToken;
