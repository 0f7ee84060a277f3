//! Groups API.
//!
//! Groups can be addressed directly or through the user that owns them
//! (`/users/{userId}/groups`).

use serde::Serialize;
use serde_json::Value;

use super::{SharingFlag, require};
use crate::Result;
use crate::client::Knowi;
use crate::http::ApiRequest;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GroupName<'a> {
    group_name: &'a str,
}

/// Groups API client.
pub struct GroupsApi {
    client: Knowi,
}

impl GroupsApi {
    pub(crate) fn new(client: Knowi) -> Self {
        Self { client }
    }

    /// List the groups of the current account.
    pub async fn list(&self) -> Result<Value> {
        self.client.execute_json(&ApiRequest::get("/groups")).await
    }

    /// List the groups of a user.
    pub async fn list_for_user(&self, user_id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::get(format!("/users/{}/groups", user_id)))
            .await
    }

    /// Get a group, with its shares when `sharing` is set.
    pub async fn get(&self, id: u64, sharing: bool) -> Result<Value> {
        let request = ApiRequest::get(format!("/groups/{}", id)).query(&SharingFlag {
            with_sharing: sharing,
        })?;
        self.client.execute_json(&request).await
    }

    /// Get one of a user's groups.
    pub async fn get_for_user(&self, user_id: u64, id: u64, sharing: bool) -> Result<Value> {
        let request = ApiRequest::get(format!("/users/{}/groups/{}", user_id, id)).query(
            &SharingFlag {
                with_sharing: sharing,
            },
        )?;
        self.client.execute_json(&request).await
    }

    /// Create a group.
    pub async fn create(&self, name: &str) -> Result<Value> {
        require("groupName", name)?;
        let request = ApiRequest::post("/groups").json(&GroupName { group_name: name })?;
        self.client.execute_json(&request).await
    }

    /// Create a group owned by a user.
    pub async fn create_for_user(&self, user_id: u64, name: &str) -> Result<Value> {
        require("groupName", name)?;
        let request = ApiRequest::post(format!("/users/{}/groups", user_id))
            .json(&GroupName { group_name: name })?;
        self.client.execute_json(&request).await
    }

    /// Rename a group.
    pub async fn edit(&self, id: u64, name: &str) -> Result<Value> {
        require("groupName", name)?;
        let request =
            ApiRequest::put(format!("/groups/{}", id)).form(&GroupName { group_name: name })?;
        self.client.execute_json(&request).await
    }

    /// Rename one of a user's groups.
    pub async fn edit_for_user(&self, user_id: u64, id: u64, name: &str) -> Result<Value> {
        require("groupName", name)?;
        let request = ApiRequest::put(format!("/users/{}/groups/{}", user_id, id))
            .form(&GroupName { group_name: name })?;
        self.client.execute_json(&request).await
    }

    /// Delete a group.
    pub async fn delete(&self, id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::delete(format!("/groups/{}", id)))
            .await
    }

    /// Delete one of a user's groups.
    pub async fn delete_for_user(&self, user_id: u64, id: u64) -> Result<Value> {
        self.client
            .execute_json(&ApiRequest::delete(format!(
                "/users/{}/groups/{}",
                user_id, id
            )))
            .await
    }
}
