//! Dashboards API.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::{CategoryFilter, ContentFiltersForm, require, share_link};
use crate::Result;
use crate::client::Knowi;
use crate::http::ApiRequest;
use crate::types::{ContentFilter, ShareLink, ShareProperties, ShareTarget, ShareType};

/// Dashboard canvas size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSize {
    pub width: u32,
    pub height: u32,
}

impl Default for ScreenSize {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 800,
        }
    }
}

/// A rendered dashboard PDF.
#[derive(Debug, Clone)]
pub struct PdfExport {
    /// File name suggested by the server, if any.
    pub filename: Option<String>,
    /// The PDF document.
    pub bytes: Vec<u8>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardBody<'a> {
    dash_name: &'a str,
    screen_width: u32,
    screen_height: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardEdit<'a> {
    dash_name: &'a str,
    categories: &'a [u64],
}

/// Dashboards API client.
pub struct DashboardsApi {
    client: Knowi,
}

impl DashboardsApi {
    pub(crate) fn new(client: Knowi) -> Self {
        Self { client }
    }

    /// List dashboards, optionally restricted to some categories.
    pub async fn list(&self, categories: &[u64]) -> Result<Value> {
        let request = ApiRequest::get("/dashboards").query(&CategoryFilter {
            by_category: categories,
        })?;
        self.client.execute_json(&request).await
    }

    /// Get a dashboard by id.
    pub async fn get(&self, id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::get(format!("/dashboards/{}", id)))
            .await
    }

    /// List the widgets on a dashboard.
    pub async fn widgets(&self, id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::get(format!("/dashboards/{}/widgets", id)))
            .await
    }

    /// Share a dashboard with users and groups.
    pub async fn share(&self, id: u64, targets: &[ShareTarget]) -> Result<Value> {
        let request = ApiRequest::put(format!("/dashboards/{}/share", id))
            .json(&ShareProperties::new(targets)?)?;
        self.client.execute_json(&request).await
    }

    /// Create an empty dashboard.
    #[instrument(skip(self))]
    pub async fn create(&self, name: &str, size: ScreenSize) -> Result<Value> {
        require("dashName", name)?;
        let request = ApiRequest::post("/dashboards").json(&DashboardBody {
            dash_name: name,
            screen_width: size.width,
            screen_height: size.height,
        })?;
        self.client.execute_json(&request).await
    }

    /// Clone a dashboard under a new name.
    #[instrument(skip(self))]
    pub async fn clone_dashboard(&self, id: u64, name: &str, size: ScreenSize) -> Result<Value> {
        require("dashName", name)?;
        let request = ApiRequest::post(format!("/dashboards/{}", id)).json(&DashboardBody {
            dash_name: name,
            screen_width: size.width,
            screen_height: size.height,
        })?;
        self.client.execute_json(&request).await
    }

    /// Rename a dashboard and replace its categories.
    pub async fn edit(&self, id: u64, name: &str, categories: &[u64]) -> Result<Value> {
        require("dashName", name)?;
        let request = ApiRequest::put(format!("/dashboards/{}", id)).json(&DashboardEdit {
            dash_name: name,
            categories,
        })?;
        self.client.execute_json(&request).await
    }

    /// Delete a dashboard.
    pub async fn delete(&self, id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::delete(format!("/dashboards/{}", id)))
            .await
    }

    /// Generate a share link, optionally restricted by content filters.
    ///
    /// Each call replaces the dashboard's previous share link.
    #[instrument(skip(self, filters))]
    pub async fn share_url(
        &self,
        id: u64,
        share_type: ShareType,
        filters: &[ContentFilter],
    ) -> Result<ShareLink> {
        let (path, key, prefix) = match share_type {
            ShareType::Simple => ("share/url", "shareUrl", "/d/"),
            ShareType::Secure => ("share/url/secure", "secureShareUrl", "/share/secure/"),
        };
        let request = ApiRequest::post(format!("/dashboards/{}/{}", id, path)).form(
            &ContentFiltersForm {
                content_filters: filters,
            },
        )?;

        let response: Value = self.client.execute_json(&request).await?;
        let link = share_link(
            response,
            key,
            format!("{}{}", self.client.base_url().site_root(), prefix),
        )?;
        debug!(url = %link.url, "Share link generated");
        Ok(link)
    }

    /// Hash content filters for a secure link without changing the link.
    pub async fn hash_content_filters(&self, id: u64, filters: &[ContentFilter]) -> Result<Value> {
        let request = ApiRequest::post(format!("/dashboards/{}/share/url/secure/hash", id))
            .form(&ContentFiltersForm {
                content_filters: filters,
            })?;
        self.client.execute(&request).await?.json_or_text()
    }

    /// Render a dashboard to PDF.
    #[instrument(skip(self))]
    pub async fn export_pdf(&self, id: u64) -> Result<PdfExport> {
        let response = self
            .client
            .execute(&ApiRequest::get(format!("/dashboards/{}/export/pdf", id)))
            .await?;
        let filename = response.attachment_filename();
        debug!(?filename, bytes = response.bytes().len(), "PDF exported");
        Ok(PdfExport {
            filename,
            bytes: response.into_bytes(),
        })
    }

    /// List saved filter sets.
    pub async fn filter_sets(&self) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::get("/dashboards/filterset"))
            .await
    }

    /// Share a filter set with users and groups.
    pub async fn share_filter_set(&self, id: u64, targets: &[ShareTarget]) -> Result<Value> {
        let request = ApiRequest::put(format!("/dashboards/filterset/{}/share", id))
            .json(&ShareProperties::new(targets)?)?;
        self.client.execute_json(&request).await
    }

    /// Delete a filter set.
    pub async fn delete_filter_set(&self, id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::delete(format!("/dashboards/filterset/{}", id)))
            .await
    }
}
