//! HTTP plumbing: transport seam, request shaping and the authenticated
//! executor.

mod executor;
mod request;
mod response;
mod transport;

pub use executor::RequestExecutor;
pub use request::{ApiRequest, RequestBody, to_pairs};
pub use response::ApiResponse;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

pub(crate) use executor::send_unauthenticated;
pub(crate) use request::encode;
