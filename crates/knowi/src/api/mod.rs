//! Management API endpoint groups.
//!
//! Each group is a thin, typed layer over [`crate::Knowi::execute`]: it
//! shapes parameters and decodes results, while authorization and the
//! rejection retry stay in the executor.

mod categories;
mod dashboards;
mod datasets;
mod datasources;
mod groups;
mod nlp;
mod queries;
mod system;
mod users;
mod widgets;

pub use categories::CategoriesApi;
pub use dashboards::{DashboardsApi, PdfExport, ScreenSize};
pub use datasets::{DatasetData, DatasetQuery, DatasetsApi, ExportFormat, RuntimeToken};
pub use datasources::DatasourcesApi;
pub use groups::GroupsApi;
pub use nlp::{NlpApi, NlpFormat};
pub(crate) use nlp::ParseForm;
pub use queries::{QueriesApi, QueryDefinition};
pub use system::{SystemApi, SystemCheck};
pub use users::{GroupAccess, NewUser, UserUpdate, UsersApi};
pub use widgets::{NewWidget, WidgetUpdate, WidgetsApi};

use serde::Serialize;
use serde_json::Value;

use crate::Result;
use crate::error::{InvalidInputError, ProtocolError};
use crate::http::encode;
use crate::types::{ContentFilter, ShareLink};

/// `byCategory` filter used by the list endpoints.
#[derive(Debug, Serialize)]
struct CategoryFilter<'a> {
    #[serde(rename = "byCategory")]
    by_category: &'a [u64],
}

/// `withSharing` flag used by detail endpoints.
#[derive(Debug, Serialize)]
struct SharingFlag {
    #[serde(rename = "withSharing")]
    with_sharing: bool,
}

/// Form body carrying content filters as embedded JSON.
#[derive(Debug, Serialize)]
struct ContentFiltersForm<'a> {
    #[serde(
        rename = "contentFilters",
        serialize_with = "encode::json_string_or_null"
    )]
    content_filters: &'a [ContentFilter],
}

/// Build a [`ShareLink`] from a share-URL response.
///
/// The token is read from `data.<key>`, falling back to a top-level `<key>`.
fn share_link(response: Value, key: &'static str, prefix: String) -> Result<ShareLink> {
    let token = response
        .get("data")
        .and_then(|data| data.get(key))
        .or_else(|| response.get(key))
        .and_then(Value::as_str)
        .ok_or(ProtocolError::MissingField { field: key })?
        .to_string();

    Ok(ShareLink {
        url: format!("{}{}", prefix, token),
        token,
        response,
    })
}

/// Reject a blank required string parameter.
fn require(name: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(InvalidInputError::Missing { name }.into());
    }
    Ok(())
}
