//! Validated value types shared across the API surface.

mod base_url;
mod filters;
mod sharing;

pub use base_url::BaseUrl;
pub use filters::{ContentFilter, FilterOperator};
pub use sharing::{AccessLevel, AssetType, ShareLink, ShareTarget, ShareType};

pub(crate) use sharing::ShareProperties;
