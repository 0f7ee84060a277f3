//! Subcommand implementations.

pub mod auth;
pub mod call;
pub mod dashboards;
pub mod datasets;
pub mod groups;
pub mod queries;
pub mod sso;
pub mod system;
pub mod users;
pub mod widgets;

use anyhow::{Context, Result};

/// Parse `key=value`.
pub(crate) fn key_value(pair: &str) -> Result<(String, String)> {
    let (key, value) = pair
        .split_once('=')
        .with_context(|| format!("expected key=value, got '{}'", pair))?;
    Ok((key.to_string(), value.to_string()))
}

/// Parse a comma separated list of ids.
pub(crate) fn ids(list: Option<&str>) -> Result<Vec<u64>> {
    let Some(list) = list else {
        return Ok(Vec::new());
    };
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().with_context(|| format!("invalid id '{}'", s)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_value_splits_on_first_equals() {
        assert_eq!(
            key_value("filter=a=b").unwrap(),
            ("filter".to_string(), "a=b".to_string())
        );
        assert!(key_value("novalue").is_err());
    }

    #[test]
    fn ids_accept_spaces_and_reject_words() {
        assert_eq!(ids(Some("1411, 1443")).unwrap(), vec![1411, 1443]);
        assert!(ids(None).unwrap().is_empty());
        assert!(ids(Some("12,abc")).is_err());
    }
}
