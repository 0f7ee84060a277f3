//! Categories API.
//!
//! Every call is scoped to one [`AssetType`], sent as `objectType`.

use serde::Serialize;
use serde_json::Value;

use super::require;
use crate::Result;
use crate::client::Knowi;
use crate::http::ApiRequest;
use crate::types::{AssetType, ShareProperties, ShareTarget};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ObjectType {
    object_type: AssetType,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ListParams {
    object_type: AssetType,
    with_sharing: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CategoryBody<'a> {
    category_name: &'a str,
    parent_id: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssignBody<'a> {
    categories: &'a [u64],
    object_id: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MembershipBody {
    category: u64,
    object_id: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CopyBody {
    source_category_id: u64,
    target_parent_category_id: u64,
}

/// Categories API client.
pub struct CategoriesApi {
    client: Knowi,
}

impl CategoriesApi {
    pub(crate) fn new(client: Knowi) -> Self {
        Self { client }
    }

    /// List categories, with their shares when `sharing` is set.
    pub async fn list(&self, asset: AssetType, sharing: bool) -> Result<Value> {
        let request = ApiRequest::get("/category").query(&ListParams {
            object_type: asset,
            with_sharing: sharing,
        })?;
        self.client.execute_json(&request).await
    }

    /// Share a category with users and groups.
    pub async fn share(&self, asset: AssetType, id: u64, targets: &[ShareTarget]) -> Result<Value> {
        let request = ApiRequest::put(format!("/category/{}/share", id))
            .query(&ObjectType { object_type: asset })?
            .json(&ShareProperties::new(targets)?)?;
        self.client.execute_json(&request).await
    }

    /// Create a category. A `parent_id` of 0 creates a top-level category.
    pub async fn create(&self, asset: AssetType, name: &str, parent_id: u64) -> Result<Value> {
        require("categoryName", name)?;
        let request = ApiRequest::post("/category")
            .query(&ObjectType { object_type: asset })?
            .json(&CategoryBody {
                category_name: name,
                parent_id,
            })?;
        self.client.execute_json(&request).await
    }

    /// Delete a category.
    pub async fn delete(&self, asset: AssetType, id: u64) -> Result<Value> {
        let request = ApiRequest::delete(format!("/category/{}", id))
            .query(&ObjectType { object_type: asset })?;
        self.client.execute_json(&request).await
    }

    /// Rename or move a category.
    pub async fn edit(&self, asset: AssetType, id: u64, name: &str, parent_id: u64) -> Result<Value> {
        require("categoryName", name)?;
        let request = ApiRequest::put(format!("/category/{}", id))
            .query(&ObjectType { object_type: asset })?
            .json(&CategoryBody {
                category_name: name,
                parent_id,
            })?;
        self.client.execute_json(&request).await
    }

    /// Replace the categories of an asset.
    pub async fn assign(&self, asset: AssetType, category_ids: &[u64], asset_id: u64) -> Result<Value> {
        let request = ApiRequest::post("/category/assign")
            .query(&ObjectType { object_type: asset })?
            .json(&AssignBody {
                categories: category_ids,
                object_id: asset_id,
            })?;
        self.client.execute_json(&request).await
    }

    /// Add an asset to a category.
    pub async fn add(&self, asset: AssetType, category_id: u64, asset_id: u64) -> Result<Value> {
        self.membership("/category/add", asset, category_id, asset_id)
            .await
    }

    /// Remove an asset from a category.
    pub async fn remove(&self, asset: AssetType, category_id: u64, asset_id: u64) -> Result<Value> {
        self.membership("/category/remove", asset, category_id, asset_id)
            .await
    }

    /// Copy a category tree under another category.
    pub async fn copy(&self, asset: AssetType, source_id: u64, target_parent_id: u64) -> Result<Value> {
        let request = ApiRequest::post("/category/copy")
            .query(&ObjectType { object_type: asset })?
            .json(&CopyBody {
                source_category_id: source_id,
                target_parent_category_id: target_parent_id,
            })?;
        self.client.execute_json(&request).await
    }

    async fn membership(
        &self,
        path: &str,
        asset: AssetType,
        category_id: u64,
        asset_id: u64,
    ) -> Result<Value> {
        let request = ApiRequest::post(path)
            .query(&ObjectType { object_type: asset })?
            .json(&MembershipBody {
                category: category_id,
                object_id: asset_id,
            })?;
        self.client.execute_json(&request).await
    }
}
