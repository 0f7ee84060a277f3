//! Datasources API.

use serde::Serialize;
use serde_json::Value;

use super::require;
use crate::Result;
use crate::client::Knowi;
use crate::http::ApiRequest;
use crate::types::{ShareProperties, ShareTarget};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CloneName<'a> {
    pub(super) cloned_query_name: &'a str,
}

/// Datasources API client.
pub struct DatasourcesApi {
    client: Knowi,
}

impl DatasourcesApi {
    pub(crate) fn new(client: Knowi) -> Self {
        Self { client }
    }

    /// List datasources.
    pub async fn list(&self) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::get("/datasources"))
            .await
    }

    /// Get a datasource by id.
    pub async fn get(&self, id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::get(format!("/datasources/{}", id)))
            .await
    }

    /// Share a datasource with users and groups.
    pub async fn share(&self, id: u64, targets: &[ShareTarget]) -> Result<Value> {
        let request = ApiRequest::put(format!("/datasources/{}/share", id))
            .json(&ShareProperties::new(targets)?)?;
        self.client.execute_json(&request).await
    }

    /// Clone a datasource under a new name.
    pub async fn clone_datasource(&self, id: u64, name: &str) -> Result<Value> {
        require("clonedQueryName", name)?;
        let request = ApiRequest::post(format!("/datasources/{}", id)).json(&CloneName {
            cloned_query_name: name,
        })?;
        self.client.execute_json(&request).await
    }

    /// Delete a datasource.
    pub async fn delete(&self, id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::delete(format!("/datasources/{}", id)))
            .await
    }
}
