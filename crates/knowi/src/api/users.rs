//! Users API.

use std::str::FromStr;

use chrono_tz::Tz;
use serde::Serialize;
use serde_json::Value;
use tracing::instrument;

use super::require;
use crate::Result;
use crate::client::Knowi;
use crate::error::InvalidInputError;
use crate::http::ApiRequest;
use crate::types::{AccessLevel, ContentFilter};

/// Membership of a user in a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupAccess {
    pub id: u64,
    pub access_level: AccessLevel,
}

impl GroupAccess {
    pub fn new(id: u64, access_level: AccessLevel) -> Self {
        Self { id, access_level }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
struct AssetId {
    id: u64,
}

/// A user to invite with a username and password.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password: String,
    /// Required when `two_factor` is set.
    pub phone: Option<String>,
    pub groups: Vec<GroupAccess>,
    /// Role name. Defaults to `user`.
    pub role: String,
    pub two_factor: bool,
    /// IANA time zone name, e.g. `America/New_York`.
    pub timezone: Option<String>,
    /// Groups whose new assets are shared with the user automatically.
    pub auto_share_to: Vec<u64>,
    pub content_filters: Vec<ContentFilter>,
    pub default_dashboard_id: Option<u64>,
}

impl NewUser {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            phone: None,
            groups: Vec::new(),
            role: "user".to_string(),
            two_factor: false,
            timezone: None,
            auto_share_to: Vec::new(),
            content_filters: Vec::new(),
            default_dashboard_id: None,
        }
    }

    fn validate(&self) -> Result<()> {
        require("username", &self.email)?;
        require("password", &self.password)?;
        validate_contact(Some(self.two_factor), self.phone.as_deref(), self.timezone.as_deref())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewUserBody<'a> {
    username: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    phone: Option<&'a str>,
    two_factor_auth: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    timezone: Option<&'a str>,
    auto_share_to: Vec<AssetId>,
    content_filters: &'a [ContentFilter],
    #[serde(skip_serializing_if = "Option::is_none")]
    default_dashboard_id: Option<u64>,
    user_invite_json: UserInvite<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserInvite<'a> {
    user_groups: &'a [GroupAccess],
    user_role: &'a str,
}

/// Changes to an existing user. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<GroupAccess>>,
    #[serde(skip_serializing_if = "Option::is_none", serialize_with = "asset_ids")]
    pub auto_share_to: Option<Vec<u64>>,
    #[serde(rename = "twoFactorAuth", skip_serializing_if = "Option::is_none")]
    pub two_factor: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_filters: Option<Vec<ContentFilter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_dashboard_id: Option<u64>,
}

fn asset_ids<S>(ids: &Option<Vec<u64>>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    let ids: Option<Vec<AssetId>> = ids
        .as_ref()
        .map(|ids| ids.iter().map(|&id| AssetId { id }).collect());
    ids.serialize(serializer)
}

fn validate_contact(
    two_factor: Option<bool>,
    phone: Option<&str>,
    timezone: Option<&str>,
) -> Result<()> {
    if two_factor == Some(true) && phone.is_none_or(|p| p.trim().is_empty()) {
        return Err(InvalidInputError::Requires {
            name: "twoFactorAuth",
            requires: "phone",
        }
        .into());
    }
    if let Some(tz) = timezone {
        if tz.trim().is_empty() {
            return Err(InvalidInputError::Missing { name: "timezone" }.into());
        }
        if Tz::from_str(tz).is_err() {
            return Err(InvalidInputError::Other {
                message: format!("unknown time zone '{}'", tz),
            }
            .into());
        }
    }
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MoveAssets {
    to_user_id: u64,
}

/// Users API client.
pub struct UsersApi {
    client: Knowi,
}

impl UsersApi {
    pub(crate) fn new(client: Knowi) -> Self {
        Self { client }
    }

    /// List users.
    pub async fn list(&self) -> Result<Value> {
        self.client.execute_json(&ApiRequest::get("/users")).await
    }

    /// Get a user by id.
    pub async fn get(&self, id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::get(format!("/users/{}", id)))
            .await
    }

    /// Invite a user.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError`] before sending anything if two-factor
    /// authentication is requested without a phone number, or if the time
    /// zone is not a known IANA name.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn create(&self, user: &NewUser) -> Result<Value> {
        user.validate()?;
        let body = NewUserBody {
            username: &user.email,
            password: &user.password,
            phone: user.phone.as_deref(),
            two_factor_auth: user.two_factor,
            timezone: user.timezone.as_deref(),
            auto_share_to: user.auto_share_to.iter().map(|&id| AssetId { id }).collect(),
            content_filters: &user.content_filters,
            default_dashboard_id: user.default_dashboard_id,
            user_invite_json: UserInvite {
                user_groups: &user.groups,
                user_role: &user.role,
            },
        };
        let request = ApiRequest::post("/users").json(&body)?;
        self.client.execute_json(&request).await
    }

    /// Update a user.
    #[instrument(skip(self, update))]
    pub async fn edit(&self, id: u64, update: &UserUpdate) -> Result<Value> {
        validate_contact(
            update.two_factor,
            update.phone.as_deref(),
            update.timezone.as_deref(),
        )?;
        let request = ApiRequest::put(format!("/users/{}", id)).json(update)?;
        self.client.execute_json(&request).await
    }

    /// Delete a user and every asset the user owns.
    ///
    /// Use [`UsersApi::transfer_assets`] first to keep the assets.
    pub async fn delete(&self, id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::delete(format!("/users/{}", id)))
            .await
    }

    /// Move every asset of one user to another.
    #[instrument(skip(self))]
    pub async fn transfer_assets(&self, from_user_id: u64, to_user_id: u64) -> Result<Value> {
        let request = ApiRequest::put(format!("/users/{}/moveAssets", from_user_id)).json(
            &MoveAssets {
                to_user_id,
            },
        )?;
        self.client.execute_json(&request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use serde_json::json;

    #[test]
    fn two_factor_requires_phone() {
        let mut user = NewUser::new("a@example.com", "pw");
        user.two_factor = true;
        assert!(matches!(
            user.validate().unwrap_err(),
            Error::InvalidInput(InvalidInputError::Requires {
                name: "twoFactorAuth",
                requires: "phone"
            })
        ));

        user.phone = Some("5551234".to_string());
        assert!(user.validate().is_ok());
    }

    #[test]
    fn blank_timezone_is_rejected() {
        let update = UserUpdate {
            timezone: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(validate_contact(update.two_factor, None, update.timezone.as_deref()).is_err());
    }

    #[test]
    fn timezone_must_be_iana_name() {
        assert!(validate_contact(None, None, Some("America/New_York")).is_ok());
        assert!(validate_contact(None, None, Some("UTC")).is_ok());
        assert!(matches!(
            validate_contact(None, None, Some("Mars/Base")).unwrap_err(),
            Error::InvalidInput(InvalidInputError::Other { .. })
        ));
    }

    #[test]
    fn update_omits_unset_fields() {
        let update = UserUpdate {
            name: Some("Ada".to_string()),
            auto_share_to: Some(vec![10, 11]),
            two_factor: Some(false),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(update).unwrap(),
            json!({
                "name": "Ada",
                "autoShareTo": [{"id": 10}, {"id": 11}],
                "twoFactorAuth": false
            })
        );
    }
}
