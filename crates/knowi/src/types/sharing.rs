//! Asset kinds, access levels and share targets.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::{Error, InvalidInputError};

/// The kinds of asset that can be organised into categories.
///
/// Serialized as the numeric object type the platform expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    Dashboard,
    Widget,
    Query,
}

impl AssetType {
    /// The numeric object type code.
    pub fn code(self) -> u8 {
        match self {
            AssetType::Dashboard => 1,
            AssetType::Widget => 2,
            AssetType::Query => 4,
        }
    }

    /// Returns the lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            AssetType::Dashboard => "dashboard",
            AssetType::Widget => "widget",
            AssetType::Query => "query",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "dashboard" | "dashboards" | "1" => Ok(AssetType::Dashboard),
            "widget" | "widgets" | "2" => Ok(AssetType::Widget),
            "query" | "queries" | "4" => Ok(AssetType::Query),
            _ => Err(InvalidInputError::Other {
                message: format!("unknown asset type '{}'", s),
            }
            .into()),
        }
    }
}

impl Serialize for AssetType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// Access granted through a share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AccessLevel {
    Edit,
    #[default]
    View,
}

impl AccessLevel {
    /// The numeric access level code.
    pub fn code(self) -> u8 {
        match self {
            AccessLevel::Edit => 1,
            AccessLevel::View => 2,
        }
    }
}

impl Serialize for AccessLevel {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// A user or group an asset is shared with.
///
/// # Example
///
/// ```
/// use knowi::{AccessLevel, ShareTarget};
///
/// let targets = vec![
///     ShareTarget::user("analyst@example.com", AccessLevel::Edit),
///     ShareTarget::group(10001, AccessLevel::View),
/// ];
/// let json = serde_json::to_value(&targets).unwrap();
/// assert_eq!(json[0]["type"], "Users");
/// assert_eq!(json[1]["id"], 10001);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum ShareTarget {
    /// A user, addressed by email.
    #[serde(rename = "Users")]
    User {
        name: String,
        access_level: AccessLevel,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        sso_user: bool,
    },
    /// A group, addressed by id.
    #[serde(rename = "Groups")]
    Group { id: u64, access_level: AccessLevel },
}

impl ShareTarget {
    /// Share with a user by email.
    pub fn user(email: impl Into<String>, access_level: AccessLevel) -> Self {
        ShareTarget::User {
            name: email.into(),
            access_level,
            sso_user: false,
        }
    }

    /// Share with a user provisioned through single sign-on.
    pub fn sso_user(email: impl Into<String>, access_level: AccessLevel) -> Self {
        ShareTarget::User {
            name: email.into(),
            access_level,
            sso_user: true,
        }
    }

    /// Share with a group by id.
    pub fn group(id: u64, access_level: AccessLevel) -> Self {
        ShareTarget::Group { id, access_level }
    }
}

/// The JSON body used by every share endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct ShareProperties<'a> {
    #[serde(rename = "shareProperties")]
    pub share_properties: &'a [ShareTarget],
}

impl<'a> ShareProperties<'a> {
    pub(crate) fn new(targets: &'a [ShareTarget]) -> Result<Self, Error> {
        if targets.is_empty() {
            return Err(InvalidInputError::Missing {
                name: "shareProperties",
            }
            .into());
        }
        Ok(Self {
            share_properties: targets,
        })
    }
}

/// Which form of share link to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShareType {
    /// A plain share link.
    #[default]
    Simple,
    /// An encrypted share link.
    Secure,
}

/// A share link returned by a share-URL operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareLink {
    /// The share token the platform returned.
    pub token: String,
    /// The full URL a browser can open.
    pub url: String,
    /// The complete response document.
    pub response: serde_json::Value,
}
