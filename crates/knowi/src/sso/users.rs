//! Single sign-on users and their sessions.

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, instrument};

use super::client::SsoClient;
use crate::Result;
use crate::api::{NlpFormat, ParseForm};
use crate::error::{InvalidInputError, ProtocolError};
use crate::http::{ApiRequest, encode};
use crate::types::ContentFilter;

/// A user to provision through single sign-on.
#[derive(Debug, Clone)]
pub struct SsoUser {
    pub email: String,
    /// Group names. Missing groups are created under the user.
    pub groups: Vec<String>,
    pub content_filters: Vec<ContentFilter>,
    /// Role name. Defaults to `user`.
    pub role: String,
    /// Update groups, filters and role if the user already exists.
    pub update_existing: bool,
}

impl SsoUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            groups: Vec::new(),
            content_filters: Vec::new(),
            role: "user".to_string(),
            update_existing: false,
        }
    }
}

/// A user session created from a user token.
#[derive(Debug, Clone, PartialEq)]
pub struct SsoSession {
    /// Session token accepted by the session-scoped endpoints.
    pub token: String,
    /// URL that logs a browser into the session.
    pub login_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateUserForm<'a> {
    user: &'a str,
    sso_customer_token: &'a str,
    #[serde(rename = "userGroups[]")]
    user_groups: &'a [String],
    role: &'a str,
    #[serde(serialize_with = "encode::json_string_or_null")]
    content_filter: &'a [ContentFilter],
    refresh: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionForm<'a> {
    user: &'a str,
    user_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentFilterForm<'a> {
    sso_customer_token: &'a str,
    user: &'a str,
    #[serde(serialize_with = "encode::json_string_or_null")]
    content_filter: &'a [ContentFilter],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RemoveUserForm<'a> {
    user: &'a str,
    sso_customer_token: &'a str,
    user_token: &'a str,
}

#[derive(Serialize)]
struct SessionToken<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct SessionQuery<'a> {
    token: &'a str,
    query: &'a str,
}

impl SsoClient {
    /// Create a user, or update an existing one when
    /// [`SsoUser::update_existing`] is set.
    ///
    /// Returns the user token needed to open sessions for the user.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create_user(&self, user: &SsoUser) -> Result<Value> {
        require("user", &user.email)?;
        let request = ApiRequest::post("/sso/user/create").form(&CreateUserForm {
            user: &user.email,
            sso_customer_token: self.customer_token(),
            user_groups: &user.groups,
            role: &user.role,
            content_filter: &user.content_filters,
            refresh: user.update_existing,
        })?;
        self.execute(&request).await?.json_or_text()
    }

    /// Open a session for a user.
    #[instrument(skip(self, user_token))]
    pub async fn create_session(&self, email: &str, user_token: &str) -> Result<SsoSession> {
        require("user", email)?;
        require("userToken", user_token)?;
        let request = ApiRequest::post("/sso/session/create").form(&SessionForm {
            user: email,
            user_token,
        })?;

        let token = match self.execute(&request).await?.json_or_text()? {
            Value::String(token) if !token.is_empty() => token,
            Value::Object(map) => map
                .get("token")
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or(ProtocolError::MissingField { field: "token" })?,
            _ => return Err(ProtocolError::MissingField { field: "token" }.into()),
        };

        let mut login_url = self.host().endpoint("/sso/user/login")?;
        login_url.query_pairs_mut().append_pair("token", &token);
        debug!("Session created");

        Ok(SsoSession {
            token,
            login_url: login_url.to_string(),
        })
    }

    /// Replace a user's content filters.
    pub async fn update_user_content_filters(
        &self,
        email: &str,
        filters: &[ContentFilter],
    ) -> Result<Value> {
        require("user", email)?;
        let request = ApiRequest::post("/sso/user/contentfilters/update").form(
            &ContentFilterForm {
                sso_customer_token: self.customer_token(),
                user: email,
                content_filter: filters,
            },
        )?;
        self.execute(&request).await?.json_or_text()
    }

    /// Remove a user.
    #[instrument(skip(self, user_token))]
    pub async fn delete_user(&self, email: &str, user_token: &str) -> Result<Value> {
        require("user", email)?;
        let request = ApiRequest::post("/sso/user/remove").form(&RemoveUserForm {
            user: email,
            sso_customer_token: self.customer_token(),
            user_token,
        })?;
        self.execute(&request).await?.json_or_text()
    }

    /// List the dashboards visible in a session.
    pub async fn dashboards(&self, session_token: &str) -> Result<Value> {
        self.session_get("/sso/dashboards", session_token).await
    }

    /// List the widgets visible in a session.
    pub async fn widgets(&self, session_token: &str) -> Result<Value> {
        self.session_get("/sso/widgets", session_token).await
    }

    /// List the groups visible in a session.
    pub async fn groups(&self, session_token: &str) -> Result<Value> {
        self.session_get("/sso/groups", session_token).await
    }

    /// List the queries visible in a session.
    pub async fn queries(&self, session_token: &str) -> Result<Value> {
        self.session_get("/sso/queries", session_token).await
    }

    /// Millisecond timestamp of the last activity in a session, or `-1`
    /// when the user is inactive.
    pub async fn last_activity(&self, session_token: &str) -> Result<Value> {
        self.session_get("/sso/session/lastActive", session_token)
            .await
    }

    /// Extend a session by 30 minutes.
    pub async fn keep_alive(&self, session_token: &str) -> Result<Value> {
        require("token", session_token)?;
        let request = ApiRequest::put("/sso/session/keepAlive").query(&SessionToken {
            token: session_token,
        })?;
        self.execute(&request).await?.json_or_text()
    }

    /// End a session.
    pub async fn logout(&self, session_token: &str) -> Result<Value> {
        require("token", session_token)?;
        let request = ApiRequest::put("/sso/user/logout").query(&SessionToken {
            token: session_token,
        })?;
        self.execute(&request).await?.json_or_text()
    }

    /// Suggest completions for a partial question within a session.
    pub async fn nlp_suggestions(&self, session_token: &str, query: &str) -> Result<Value> {
        require("token", session_token)?;
        require("query", query)?;
        let request = ApiRequest::get("/sso/nlp/suggestions").query(&SessionQuery {
            token: session_token,
            query,
        })?;
        self.execute(&request).await?.json_or_text()
    }

    /// Answer a question against a dataset within a session.
    pub async fn nlp_parse(
        &self,
        session_token: &str,
        query: &str,
        dataset_id: u64,
        format: NlpFormat,
    ) -> Result<Value> {
        require("token", session_token)?;
        require("query", query)?;
        let request = ApiRequest::post("/sso/nlp/query/parse")
            .query(&SessionToken {
                token: session_token,
            })?
            .form(&ParseForm {
                query,
                dataset_id,
                format,
            })?;
        self.execute(&request).await?.json_or_text()
    }

    async fn session_get(&self, path: &str, session_token: &str) -> Result<Value> {
        require("token", session_token)?;
        let request = ApiRequest::get(path).query(&SessionToken {
            token: session_token,
        })?;
        self.execute(&request).await?.json_or_text()
    }
}

pub(super) fn require(name: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(InvalidInputError::Missing { name }.into());
    }
    Ok(())
}
