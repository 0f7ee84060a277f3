//! Request description handed to the executor.

use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::Result;
use crate::error::ProtocolError;

/// Body of an outgoing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// A JSON document.
    Json(Value),
    /// Form-encoded pairs. Keys may repeat.
    Form(Vec<(String, String)>),
}

/// A request against an API path, before URL resolution and authorization.
///
/// Parameters follow the endpoint's convention: reads carry them in the query
/// string, writes carry them in a JSON or form body.
///
/// # Example
///
/// ```
/// use knowi::ApiRequest;
///
/// let request = ApiRequest::get("/queries")
///     .query_pair("loadJoinDataSources", "true");
/// assert_eq!(request.path(), "/queries");
/// ```
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: RequestBody,
}

impl ApiRequest {
    /// Create a request with no parameters.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: RequestBody::Empty,
        }
    }

    /// Create a GET request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Create a POST request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Create a PUT request.
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// Create a DELETE request.
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Append the fields of `params` to the query string.
    ///
    /// See [`to_pairs`] for how values are flattened.
    pub fn query<P: Serialize + ?Sized>(mut self, params: &P) -> Result<Self> {
        self.query.extend(to_pairs(params)?);
        Ok(self)
    }

    /// Append a single query parameter.
    pub fn query_pair(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Use `body` as a JSON request body. `None` fields are dropped.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        let value = serde_json::to_value(body).map_err(|e| ProtocolError::Encode {
            reason: e.to_string(),
        })?;
        self.body = RequestBody::Json(value);
        Ok(self)
    }

    /// Use the fields of `body` as a form-encoded request body.
    pub fn form<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = RequestBody::Form(to_pairs(body)?);
        Ok(self)
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the API path, relative to the base URL.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the query parameters.
    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Returns the request body.
    pub fn body(&self) -> &RequestBody {
        &self.body
    }
}

/// Flatten a serializable value into key/value pairs.
///
/// The value must serialize to a map (or to `null`, which yields no pairs).
/// Null fields are skipped, scalars are rendered as text, arrays of scalars
/// become repeated keys, and nested objects or arrays are sent as JSON text.
pub fn to_pairs<P: Serialize + ?Sized>(params: &P) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(params).map_err(|e| ProtocolError::Encode {
        reason: e.to_string(),
    })?;

    let map = match value {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(ProtocolError::Encode {
                reason: format!("expected a map of parameters, got {}", kind(&other)),
            }
            .into());
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items {
                    if let Some(text) = scalar_text(&item) {
                        pairs.push((key.clone(), text));
                    }
                }
            }
            other => {
                if let Some(text) = scalar_text(&other) {
                    pairs.push((key, text));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        nested => Some(nested.to_string()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Serde helpers for fields the platform expects as embedded JSON text.
pub(crate) mod encode {
    use serde::{Serialize, Serializer};

    /// Serialize a value as a JSON string.
    pub fn json_string<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        let text = serde_json::to_string(value).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    /// Serialize a non-empty list as a JSON string, and an empty one as null.
    pub fn json_string_or_null<T, S>(value: &[T], serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        if value.is_empty() {
            serializer.serialize_none()
        } else {
            json_string(&value, serializer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Params<'a> {
        by_category: &'a [u64],
        with_sharing: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        filter_by_name: Option<&'a str>,
        limit: u32,
    }

    #[test]
    fn arrays_become_repeated_keys() {
        let pairs = to_pairs(&Params {
            by_category: &[1411, 1443],
            with_sharing: true,
            filter_by_name: None,
            limit: 10,
        })
        .unwrap();

        assert!(pairs.contains(&("byCategory".to_string(), "1411".to_string())));
        assert!(pairs.contains(&("byCategory".to_string(), "1443".to_string())));
        assert!(pairs.contains(&("withSharing".to_string(), "true".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "10".to_string())));
        assert!(!pairs.iter().any(|(k, _)| k == "filterByName"));
    }

    #[test]
    fn nested_values_are_sent_as_json_text() {
        let pairs = to_pairs(&json!({"properties": {"a": 1}, "skip": null})).unwrap();
        assert_eq!(
            pairs,
            vec![("properties".to_string(), r#"{"a":1}"#.to_string())]
        );
    }

    #[test]
    fn non_map_parameters_are_rejected() {
        assert!(to_pairs(&json!([1, 2])).is_err());
        assert!(to_pairs(&json!(null)).unwrap().is_empty());
    }

    #[test]
    fn json_string_helper_embeds_documents() {
        #[derive(Serialize)]
        struct Body {
            #[serde(
                rename = "contentFilters",
                serialize_with = "encode::json_string_or_null"
            )]
            content_filters: Vec<u32>,
        }

        let pairs = to_pairs(&Body {
            content_filters: vec![1, 2],
        })
        .unwrap();
        assert_eq!(pairs, vec![("contentFilters".to_string(), "[1,2]".to_string())]);

        let pairs = to_pairs(&Body {
            content_filters: vec![],
        })
        .unwrap();
        assert!(pairs.is_empty());
    }

    #[test]
    fn builder_collects_parameters() {
        let request = ApiRequest::post("/nlp/query/parse")
            .query_pair("token", "abc")
            .form(&json!({"query": "sales by region", "datasetId": 7}))
            .unwrap();

        assert_eq!(request.method(), &Method::POST);
        assert_eq!(
            request.query_pairs(),
            &[("token".to_string(), "abc".to_string())]
        );
        match request.body() {
            RequestBody::Form(pairs) => {
                assert!(pairs.contains(&("datasetId".to_string(), "7".to_string())));
            }
            other => panic!("unexpected body {:?}", other),
        }
    }
}
