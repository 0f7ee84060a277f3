//! Dataset data access.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::Value;
use tracing::instrument;

use crate::Result;
use crate::client::Knowi;
use crate::error::{Error, InvalidInputError};
use crate::http::{ApiRequest, encode};

/// Format of the returned rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            _ => Err(InvalidInputError::Other {
                message: format!("export format must be 'csv' or 'json', got '{}'", s),
            }
            .into()),
        }
    }
}

impl Serialize for ExportFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A value substituted into a direct query at run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeToken {
    /// Token name as written in the query, e.g. `$c9_customerName$`.
    pub parameter_name: String,
    pub parameter_value: String,
}

/// Parameters for [`DatasetsApi::get_data`].
///
/// One of `identifier` or `entity_name` must be set.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetQuery {
    /// Query identifier, as shown on the query status page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    /// Widget, dataset or query name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    /// C9QL applied while the data is read.
    #[serde(rename = "c9SqlFilter", skip_serializing_if = "Option::is_none")]
    pub c9_filter: Option<String>,
    pub export_format: ExportFormat,
    /// Request gzip-compressed JSON.
    pub optimized: bool,
    pub version: u32,
    pub limit: u32,
    #[serde(
        skip_serializing_if = "Vec::is_empty",
        serialize_with = "encode::json_string"
    )]
    pub runtime_tokens: Vec<RuntimeToken>,
}

impl Default for DatasetQuery {
    fn default() -> Self {
        Self {
            identifier: None,
            entity_name: None,
            c9_filter: None,
            export_format: ExportFormat::Json,
            optimized: false,
            version: 0,
            limit: 10000,
            runtime_tokens: Vec::new(),
        }
    }
}

impl DatasetQuery {
    /// Read by query identifier.
    pub fn by_identifier(identifier: impl Into<String>) -> Self {
        Self {
            identifier: Some(identifier.into()),
            ..Default::default()
        }
    }

    /// Read by widget, dataset or query name.
    pub fn by_name(entity_name: impl Into<String>) -> Self {
        Self {
            entity_name: Some(entity_name.into()),
            ..Default::default()
        }
    }

    fn validate(&self) -> Result<()> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !present(&self.identifier) && !present(&self.entity_name) {
            return Err(InvalidInputError::Requires {
                name: "dataset",
                requires: "identifier or entityName",
            }
            .into());
        }
        Ok(())
    }
}

/// Rows returned by [`DatasetsApi::get_data`].
#[derive(Debug, Clone, PartialEq)]
pub enum DatasetData {
    Json(Value),
    Csv(String),
}

/// Datasets API client.
pub struct DatasetsApi {
    client: Knowi,
}

impl DatasetsApi {
    pub(crate) fn new(client: Knowi) -> Self {
        Self { client }
    }

    /// Read the rows of a widget, dataset or query.
    #[instrument(skip(self, query), fields(format = %query.export_format, limit = query.limit))]
    pub async fn get_data(&self, query: &DatasetQuery) -> Result<DatasetData> {
        query.validate()?;
        let request = ApiRequest::get("/datasets").query(query)?;
        let response = self.client.execute(&request).await?;
        match query.export_format {
            ExportFormat::Json => Ok(DatasetData::Json(response.json()?)),
            ExportFormat::Csv => Ok(DatasetData::Csv(response.text()?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::to_pairs;

    #[test]
    fn identifier_or_name_is_required() {
        assert!(DatasetQuery::default().validate().is_err());
        assert!(DatasetQuery::by_name("Sales").validate().is_ok());
        assert!(DatasetQuery::by_identifier(" ").validate().is_err());
    }

    #[test]
    fn query_parameters_follow_platform_names() {
        let mut query = DatasetQuery::by_identifier("abc");
        query.export_format = ExportFormat::Csv;
        query.runtime_tokens.push(RuntimeToken {
            parameter_name: "$c9_customerName$".to_string(),
            parameter_value: "Facebook".to_string(),
        });

        let pairs = to_pairs(&query).unwrap();
        let get = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        assert_eq!(get("identifier"), Some("abc"));
        assert_eq!(get("exportFormat"), Some("csv"));
        assert_eq!(get("limit"), Some("10000"));
        assert_eq!(get("optimized"), Some("false"));
        assert_eq!(
            get("runtimeTokens"),
            Some(r#"[{"parameterName":"$c9_customerName$","parameterValue":"Facebook"}]"#)
        );
        assert_eq!(get("entityName"), None);
    }
}
