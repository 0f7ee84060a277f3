//! Queries API.

use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::datasources::CloneName;
use super::{CategoryFilter, require};
use crate::Result;
use crate::client::Knowi;
use crate::http::ApiRequest;
use crate::types::{ShareProperties, ShareTarget};

/// Properties of a query against an existing datasource.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDefinition {
    /// Query name.
    pub entity_name: String,
    pub datasource_id: u64,
    /// Native query text sent to the datasource.
    pub query_str: String,
    /// Post-processing applied to the result. Defaults to `select *`.
    #[serde(rename = "c9QLFilter")]
    pub c9ql_filter: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Run directly against the datasource instead of storing results.
    pub direct: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ds_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triggered: Option<bool>,
    pub override_vals: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub c9_export_dataset: Option<Value>,
    /// Save as a draft. Sent next to the properties, not inside them.
    #[serde(skip)]
    pub drafted: Option<bool>,
}

impl QueryDefinition {
    pub fn new(name: impl Into<String>, datasource_id: u64, query_str: impl Into<String>) -> Self {
        Self {
            entity_name: name.into(),
            datasource_id,
            query_str: query_str.into(),
            c9ql_filter: "select *".to_string(),
            categories: Vec::new(),
            description: None,
            direct: false,
            ds_name: None,
            triggered: None,
            override_vals: "All".to_string(),
            c9_export_dataset: None,
            drafted: None,
        }
    }

    fn validate(&self) -> Result<()> {
        require("entityName", &self.entity_name)?;
        require("queryStr", &self.query_str)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryBody<'a> {
    properties: &'a QueryDefinition,
    run_now: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    drafted: Option<bool>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JoinFlag {
    load_join_data_sources: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunNow {
    run_now: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveWidgets {
    remove_widgets: bool,
}

/// Queries API client.
pub struct QueriesApi {
    client: Knowi,
}

impl QueriesApi {
    pub(crate) fn new(client: Knowi) -> Self {
        Self { client }
    }

    /// List queries, optionally restricted to some categories.
    pub async fn list(&self, categories: &[u64]) -> Result<Value> {
        let request = ApiRequest::get("/queries").query(&CategoryFilter {
            by_category: categories,
        })?;
        self.client.execute_json(&request).await
    }

    /// Get a query, optionally with the datasources of its joins.
    pub async fn get(&self, id: u64, with_joins: bool) -> Result<Value> {
        let request = ApiRequest::get(format!("/queries/{}", id)).query(&JoinFlag {
            load_join_data_sources: with_joins,
        })?;
        self.client.execute_json(&request).await
    }

    /// Run a query now.
    #[instrument(skip(self))]
    pub async fn refresh(&self, id: u64) -> Result<Value> {
        let request = ApiRequest::post(format!("/queries/{}/refreshQuery", id))
            .json(&RunNow { run_now: true })?;
        self.client.execute_json(&request).await
    }

    /// Create a query, running it immediately if `run_now` is set.
    #[instrument(skip(self, definition), fields(name = %definition.entity_name))]
    pub async fn create(&self, definition: &QueryDefinition, run_now: bool) -> Result<Value> {
        definition.validate()?;
        let request = ApiRequest::post("/queries").json(&QueryBody {
            properties: definition,
            run_now,
            drafted: definition.drafted,
        })?;
        self.client.execute_json(&request).await
    }

    /// Replace a query's definition.
    #[instrument(skip(self, definition))]
    pub async fn edit(&self, id: u64, definition: &QueryDefinition, run_now: bool) -> Result<Value> {
        definition.validate()?;
        let request = ApiRequest::put(format!("/queries/{}", id)).json(&QueryBody {
            properties: definition,
            run_now,
            drafted: definition.drafted,
        })?;
        self.client.execute_json(&request).await
    }

    /// Delete a query, and its widgets when `remove_widgets` is set.
    pub async fn delete(&self, id: u64, remove_widgets: bool) -> Result<Value> {
        let request = ApiRequest::delete(format!("/queries/{}", id))
            .query(&RemoveWidgets { remove_widgets })?;
        self.client.execute_json(&request).await
    }

    /// Clone a query under a new name.
    pub async fn clone_query(&self, id: u64, name: &str) -> Result<Value> {
        require("clonedQueryName", name)?;
        let request = ApiRequest::post(format!("/queries/{}", id)).json(&CloneName {
            cloned_query_name: name,
        })?;
        self.client.execute_json(&request).await
    }

    /// Share a query with users and groups.
    pub async fn share(&self, id: u64, targets: &[ShareTarget]) -> Result<Value> {
        let request = ApiRequest::put(format!("/queries/{}/share", id))
            .json(&ShareProperties::new(targets)?)?;
        self.client.execute_json(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn definition_defaults_match_platform() {
        let definition = QueryDefinition::new("Sales", 42, "db.sales.find()");
        let body = serde_json::to_value(QueryBody {
            properties: &definition,
            run_now: true,
            drafted: None,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "properties": {
                    "entityName": "Sales",
                    "datasourceId": 42,
                    "queryStr": "db.sales.find()",
                    "c9QLFilter": "select *",
                    "direct": false,
                    "overrideVals": "All"
                },
                "runNow": true
            })
        );
    }

    #[test]
    fn blank_query_text_is_rejected() {
        assert!(QueryDefinition::new("Sales", 42, " ").validate().is_err());
        assert!(QueryDefinition::new("", 42, "select 1").validate().is_err());
    }
}
