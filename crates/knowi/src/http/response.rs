//! Successful response wrapper.

use reqwest::StatusCode;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::transport::HttpResponse;
use crate::Result;
use crate::error::ProtocolError;

/// A 2xx response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

impl ApiResponse {
    /// Returns the HTTP status.
    pub fn status(&self) -> u16 {
        self.status.as_u16()
    }

    /// Returns the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the `Content-Type` header, if present and readable.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get(CONTENT_TYPE)?.to_str().ok()
    }

    /// Returns the raw body.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Consume the response and return the raw body.
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// Returns the body as UTF-8 text.
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.clone()).map_err(|_| ProtocolError::NotText.into())
    }

    /// Decode the body as JSON. An empty body decodes as `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let body: &[u8] = if self.body.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &self.body
        };
        serde_json::from_slice(body).map_err(|e| {
            ProtocolError::Decode {
                expected: std::any::type_name::<T>(),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Decode the body as JSON, falling back to a JSON string of the text.
    ///
    /// Several endpoints answer with a bare token or message instead of a
    /// document.
    pub fn json_or_text(&self) -> Result<Value> {
        match self.json::<Value>() {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::String(self.text()?.trim().to_string())),
        }
    }

    /// Returns the file name announced by `Content-Disposition`, if any.
    pub fn attachment_filename(&self) -> Option<String> {
        let value = self.headers.get(CONTENT_DISPOSITION)?.to_str().ok()?;
        value
            .split(';')
            .map(str::trim)
            .find_map(|part| part.strip_prefix("filename="))
            .map(|name| name.trim_matches('"').to_string())
            .filter(|name| !name.is_empty())
    }
}

impl From<HttpResponse> for ApiResponse {
    fn from(response: HttpResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            body: response.body,
        }
    }
}
