//! Sub-customers of a single sign-on account.

use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::client::SsoClient;
use super::users::require;
use crate::Result;
use crate::http::{ApiRequest, encode};
use crate::types::ContentFilter;

/// A sub-customer to create.
#[derive(Debug, Clone, Default)]
pub struct NewSubCustomer {
    /// Login of the sub-customer's administrator.
    pub user: String,
    pub name: String,
    pub content_filters: Vec<ContentFilter>,
    pub groups: Vec<String>,
    pub roles: Vec<String>,
}

impl NewSubCustomer {
    pub fn new(user: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

/// Changes to an existing sub-customer.
#[derive(Debug, Clone, Default)]
pub struct SubCustomerUpdate {
    /// Token of the sub-customer being changed.
    pub sub_customer_token: String,
    pub user: Option<String>,
    pub name: Option<String>,
    pub groups: Vec<String>,
    pub content_filters: Vec<ContentFilter>,
    pub roles: Vec<String>,
    /// Replace the existing roles instead of adding to them.
    pub overwrite_roles: bool,
    /// Issue a new sub-customer token.
    pub refresh_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateForm<'a> {
    sso_customer_token: &'a str,
    sub_customer_user: &'a str,
    sub_customer_name: &'a str,
    #[serde(serialize_with = "encode::json_string_or_null")]
    content_filter: &'a [ContentFilter],
    #[serde(rename = "userGroups[]")]
    user_groups: &'a [String],
    #[serde(rename = "roles[]")]
    roles: &'a [String],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateForm<'a> {
    sso_customer_token: &'a str,
    sub_customer_token: &'a str,
    sub_customer_user: Option<&'a str>,
    sub_customer_name: Option<&'a str>,
    #[serde(rename = "userGroups[]")]
    user_groups: &'a [String],
    #[serde(serialize_with = "encode::json_string_or_null")]
    content_filter: &'a [ContentFilter],
    refresh_token: bool,
    #[serde(rename = "roles[]")]
    roles: &'a [String],
    overwrite_roles: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery<'a> {
    sso_customer_token: &'a str,
    filter_by_name: Option<&'a str>,
}

impl SsoClient {
    /// Create a sub-customer.
    #[instrument(skip(self, customer), fields(name = %customer.name))]
    pub async fn create_sub_customer(&self, customer: &NewSubCustomer) -> Result<Value> {
        require("subCustomerUser", &customer.user)?;
        require("subCustomerName", &customer.name)?;
        let request = ApiRequest::post("/sso/customer").form(&CreateForm {
            sso_customer_token: self.customer_token(),
            sub_customer_user: &customer.user,
            sub_customer_name: &customer.name,
            content_filter: &customer.content_filters,
            user_groups: &customer.groups,
            roles: &customer.roles,
        })?;
        self.execute(&request).await?.json_or_text()
    }

    /// Change a sub-customer.
    #[instrument(skip(self, update))]
    pub async fn update_sub_customer(&self, update: &SubCustomerUpdate) -> Result<Value> {
        require("subCustomerToken", &update.sub_customer_token)?;
        let request = ApiRequest::put("/sso/customer").form(&UpdateForm {
            sso_customer_token: self.customer_token(),
            sub_customer_token: &update.sub_customer_token,
            sub_customer_user: update.user.as_deref(),
            sub_customer_name: update.name.as_deref(),
            user_groups: &update.groups,
            content_filter: &update.content_filters,
            refresh_token: update.refresh_token,
            roles: &update.roles,
            overwrite_roles: update.overwrite_roles,
        })?;
        self.execute(&request).await?.json_or_text()
    }

    /// List sub-customers, optionally filtered by name.
    pub async fn sub_customers(&self, by_name: Option<&str>) -> Result<Value> {
        let request = ApiRequest::get("/sso/customer").query(&ListQuery {
            sso_customer_token: self.customer_token(),
            filter_by_name: by_name.filter(|n| !n.trim().is_empty()),
        })?;
        self.execute(&request).await?.json_or_text()
    }

    /// Fetch a sub-customer by name or token.
    pub async fn sub_customer(&self, identifier: &str) -> Result<Value> {
        self.sub_customer_get(identifier, "").await
    }

    /// List the users of a sub-customer.
    pub async fn sub_customer_users(&self, identifier: &str) -> Result<Value> {
        self.sub_customer_get(identifier, "/users").await
    }

    async fn sub_customer_get(&self, identifier: &str, suffix: &str) -> Result<Value> {
        require("identifier", identifier)?;
        let path = format!("/sso/customer/{}{}", encode_segment(identifier), suffix);
        let request = ApiRequest::get(path).query(&ListQuery {
            sso_customer_token: self.customer_token(),
            filter_by_name: None,
        })?;
        self.execute(&request).await?.json_or_text()
    }
}

fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::http::RequestBody;
    use crate::test_support::ScriptedTransport;

    fn client(transport: Arc<ScriptedTransport>) -> SsoClient {
        SsoClient::builder()
            .customer_token("cust")
            .transport(transport)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn create_sends_repeated_roles() {
        let transport = Arc::new(ScriptedTransport::new().respond(200, r#"{"token":"sc"}"#));
        let sso = client(transport.clone());

        let mut customer = NewSubCustomer::new("admin@acme.test", "Acme");
        customer.roles = vec!["viewer".to_string(), "editor".to_string()];
        sso.create_sub_customer(&customer).await.unwrap();

        let request = &transport.requests()[0];
        assert_eq!(request.method, reqwest::Method::POST);
        let RequestBody::Form(pairs) = &request.body else {
            panic!("expected a form body");
        };
        let roles: Vec<_> = pairs
            .iter()
            .filter(|(k, _)| k == "roles[]")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(roles, ["viewer", "editor"]);
        assert!(pairs.contains(&("subCustomerName".to_string(), "Acme".to_string())));
    }

    #[tokio::test]
    async fn update_requires_sub_customer_token() {
        let transport = Arc::new(ScriptedTransport::new());
        let sso = client(transport.clone());

        let err = sso
            .update_sub_customer(&SubCustomerUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::Error::InvalidInput(_)));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn identifier_is_path_encoded() {
        let transport = Arc::new(ScriptedTransport::new().respond(200, "[]"));
        let sso = client(transport.clone());

        sso.sub_customer_users("Acme Corp").await.unwrap();
        assert_eq!(
            transport.requests()[0].url.as_str(),
            "https://www.knowi.com/sso/customer/Acme%20Corp/users?ssoCustomerToken=cust"
        );
    }

    #[tokio::test]
    async fn list_filter_is_optional() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .respond(200, "[]")
                .respond(200, "[]"),
        );
        let sso = client(transport.clone());

        sso.sub_customers(None).await.unwrap();
        sso.sub_customers(Some("Ac")).await.unwrap();

        let requests = transport.requests();
        assert_eq!(
            requests[0].url.as_str(),
            "https://www.knowi.com/sso/customer?ssoCustomerToken=cust"
        );
        assert_eq!(
            requests[1].url.as_str(),
            "https://www.knowi.com/sso/customer?ssoCustomerToken=cust&filterByName=Ac"
        );
    }
}
