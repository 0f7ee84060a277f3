//! Natural language queries.

use serde::Serialize;
use serde_json::Value;

use super::require;
use crate::Result;
use crate::client::Knowi;
use crate::http::ApiRequest;

/// Output format of a parsed natural language query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NlpFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Serialize)]
struct Suggestions<'a> {
    query: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ParseForm<'a> {
    pub(crate) query: &'a str,
    pub(crate) dataset_id: u64,
    pub(crate) format: NlpFormat,
}

/// Natural language query API client.
pub struct NlpApi {
    client: Knowi,
}

impl NlpApi {
    pub(crate) fn new(client: Knowi) -> Self {
        Self { client }
    }

    /// Suggest completions for a partial question.
    pub async fn suggestions(&self, query: &str) -> Result<Value> {
        require("query", query)?;
        let request = ApiRequest::get("/nlp/suggestions").query(&Suggestions { query })?;
        self.client.execute_json(&request).await
    }

    /// Turn a question into a query against a dataset and run it.
    pub async fn parse(&self, query: &str, dataset_id: u64, format: NlpFormat) -> Result<Value> {
        require("query", query)?;
        let request = ApiRequest::post("/nlp/query/parse").form(&ParseForm {
            query,
            dataset_id,
            format,
        })?;
        self.client.execute(&request).await?.json_or_text()
    }
}
