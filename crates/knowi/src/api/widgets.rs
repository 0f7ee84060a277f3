//! Widgets API.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;

use super::{CategoryFilter, ContentFiltersForm, require, share_link};
use crate::Result;
use crate::client::Knowi;
use crate::http::ApiRequest;
use crate::types::{ContentFilter, ShareLink, ShareProperties, ShareTarget, ShareType};

/// A widget to create on top of an existing dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWidget {
    pub widget_name: String,
    pub dataset_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_type: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_properties: Option<Map<String, Value>>,
}

impl NewWidget {
    pub fn new(dataset_id: u64, name: impl Into<String>) -> Self {
        Self {
            widget_name: name.into(),
            dataset_id,
            widget_type: None,
            chart_properties: None,
        }
    }
}

/// Changes to an existing widget. `categories` replaces the current set.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_name: Option<String>,
    pub categories: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub widget_type: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_properties: Option<Map<String, Value>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WidgetName<'a> {
    widget_name: &'a str,
}

/// Widgets API client.
pub struct WidgetsApi {
    client: Knowi,
}

impl WidgetsApi {
    pub(crate) fn new(client: Knowi) -> Self {
        Self { client }
    }

    /// List widgets, optionally restricted to some categories.
    pub async fn list(&self, categories: &[u64]) -> Result<Value> {
        let request = ApiRequest::get("/widgets").query(&CategoryFilter {
            by_category: categories,
        })?;
        self.client.execute_json(&request).await
    }

    /// Get a widget by id.
    pub async fn get(&self, id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::get(format!("/widgets/{}", id)))
            .await
    }

    /// Generate a share link, optionally restricted by content filters.
    #[instrument(skip(self, filters))]
    pub async fn share_url(
        &self,
        id: u64,
        share_type: ShareType,
        filters: &[ContentFilter],
    ) -> Result<ShareLink> {
        let (path, key, prefix) = match share_type {
            ShareType::Simple => ("share/url", "shareUrl", "/w/"),
            ShareType::Secure => ("share/url/secure", "secureShareUrl", "/w-secure/"),
        };
        let request = ApiRequest::post(format!("/widgets/{}/{}", id, path)).form(
            &ContentFiltersForm {
                content_filters: filters,
            },
        )?;

        let response: Value = self.client.execute_json(&request).await?;
        share_link(
            response,
            key,
            format!("{}{}", self.client.base_url().site_root(), prefix),
        )
    }

    /// Share a widget with users and groups.
    pub async fn share(&self, id: u64, targets: &[ShareTarget]) -> Result<Value> {
        let request = ApiRequest::put(format!("/widgets/{}/share", id))
            .json(&ShareProperties::new(targets)?)?;
        self.client.execute_json(&request).await
    }

    /// Create a widget.
    pub async fn create(&self, widget: &NewWidget) -> Result<Value> {
        require("widgetName", &widget.widget_name)?;
        let request = ApiRequest::post("/widgets").json(widget)?;
        self.client.execute_json(&request).await
    }

    /// Clone a widget under a new name.
    pub async fn clone_widget(&self, id: u64, name: &str) -> Result<Value> {
        require("widgetName", name)?;
        let request =
            ApiRequest::post(format!("/widgets/{}", id)).json(&WidgetName { widget_name: name })?;
        self.client.execute_json(&request).await
    }

    /// Update a widget.
    pub async fn edit(&self, id: u64, update: &WidgetUpdate) -> Result<Value> {
        let request = ApiRequest::put(format!("/widgets/{}", id)).json(update)?;
        self.client.execute_json(&request).await
    }

    /// Delete a widget.
    pub async fn delete(&self, id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::delete(format!("/widgets/{}", id)))
            .await
    }
}
