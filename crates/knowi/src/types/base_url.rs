//! Base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;
use url::Url;

use crate::error::{ConfigError, Error, InvalidInputError};

/// A validated API root URL.
///
/// The URL must be absolute and use HTTP or HTTPS. Plain HTTP is accepted for
/// self-hosted installs but logged as a warning. A trailing slash is dropped
/// so that endpoint paths can be joined without doubling it.
///
/// # Example
///
/// ```
/// use knowi::BaseUrl;
///
/// let base = BaseUrl::new("https://www.knowi.com/api/1.0/").unwrap();
/// assert_eq!(base.endpoint("/dashboards").unwrap().as_str(),
///            "https://www.knowi.com/api/1.0/dashboards");
/// assert_eq!(base.origin(), "https://www.knowi.com");
/// assert_eq!(base.site_root(), "https://www.knowi.com");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct BaseUrl(Url);

impl BaseUrl {
    /// Create a base URL from a string, validating the format.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::BaseUrl`] if the URL is not usable.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let mut url = Url::parse(s).map_err(|e| ConfigError::BaseUrl {
            value: s.to_string(),
            reason: e.to_string(),
        })?;

        Self::validate(&url, s)?;

        let path = url.path().trim_end_matches('/').to_string();
        url.set_path(&path);

        Ok(Self(url))
    }

    /// Resolve an endpoint path against this base.
    ///
    /// Leading slashes on `path` are ignored, so `"dashboards"` and
    /// `"/dashboards"` resolve to the same URL.
    pub fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let base = self.0.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let joined = if path.is_empty() {
            base.to_string()
        } else {
            format!("{}/{}", base, path)
        };

        Url::parse(&joined).map_err(|e| {
            InvalidInputError::Other {
                message: format!("invalid endpoint path '{}': {}", path, e),
            }
            .into()
        })
    }

    /// Returns scheme, host and port, without any path.
    pub fn origin(&self) -> String {
        self.0.origin().ascii_serialization()
    }

    /// Returns the site root that share links hang off.
    ///
    /// This is the base URL with a trailing `/api/<version>` removed, so a
    /// deployment under a path prefix keeps it:
    /// `https://corp.example/knowi/api/1.0` gives `https://corp.example/knowi`.
    pub fn site_root(&self) -> String {
        let path = self.0.path().trim_end_matches('/');
        let prefix = path
            .rsplit_once('/')
            .and_then(|(head, _)| head.strip_suffix("/api"))
            .unwrap_or(path);
        format!("{}{}", self.origin(), prefix)
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the inner URL.
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }

    fn validate(url: &Url, original: &str) -> Result<(), Error> {
        let invalid = |reason: &str| -> Error {
            ConfigError::BaseUrl {
                value: original.to_string(),
                reason: reason.to_string(),
            }
            .into()
        };

        if url.cannot_be_a_base() {
            return Err(invalid("must be an absolute URL"));
        }

        let scheme = url.scheme();
        if scheme != "https" && scheme != "http" {
            return Err(invalid("must use http or https"));
        }

        let Some(host) = url.host_str() else {
            return Err(invalid("must have a host"));
        };

        if scheme == "http" {
            let is_localhost = host == "localhost" || host == "127.0.0.1" || host == "[::1]";
            if !is_localhost {
                warn!(host, "Base URL uses plain HTTP; credentials are sent unencrypted");
            }
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("must not carry a query or fragment"));
        }

        Ok(())
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for BaseUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for BaseUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        BaseUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for BaseUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
