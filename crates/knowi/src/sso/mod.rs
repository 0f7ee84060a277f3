//! Single sign-on: customer-token provisioning and user sessions.
//!
//! The customer token identifies the account and is sent as a request
//! parameter. Users created here get a user token, which opens sessions;
//! a session token then scopes the listing, keep-alive and natural
//! language endpoints to that user.

mod client;
mod customers;
mod users;

pub use client::{SsoClient, SsoClientBuilder};
pub use customers::{NewSubCustomer, SubCustomerUpdate};
pub use users::{SsoSession, SsoUser};
