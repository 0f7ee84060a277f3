//! Row-level content filters.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::{Error, InvalidInputError};

/// Comparison applied by a [`ContentFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
    Contains,
    DoesNotContain,
}

impl FilterOperator {
    /// The operator symbol sent on the wire.
    pub fn symbol(self) -> &'static str {
        match self {
            FilterOperator::Equals => "=",
            FilterOperator::NotEquals => "!=",
            FilterOperator::GreaterThan => ">",
            FilterOperator::GreaterThanOrEquals => ">=",
            FilterOperator::LessThan => "<",
            FilterOperator::LessThanOrEquals => "<=",
            FilterOperator::Contains => "like",
            FilterOperator::DoesNotContain => "not like",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Accepts either the symbol (`"!="`) or the spelled-out name
/// (`"not equals"`).
impl FromStr for FilterOperator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim().to_ascii_lowercase().as_str() {
            "=" | "equals" => FilterOperator::Equals,
            "!=" | "not equals" => FilterOperator::NotEquals,
            ">" | "greater than" => FilterOperator::GreaterThan,
            ">=" | "greater than or equals" => FilterOperator::GreaterThanOrEquals,
            "<" | "less than" => FilterOperator::LessThan,
            "<=" | "less than or equals" => FilterOperator::LessThanOrEquals,
            "like" | "contains" => FilterOperator::Contains,
            "not like" | "does not contain" => FilterOperator::DoesNotContain,
            _ => {
                return Err(InvalidInputError::Other {
                    message: format!("invalid content filter operator '{}'", s),
                }
                .into());
            }
        };
        Ok(op)
    }
}

impl Serialize for FilterOperator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.symbol())
    }
}

/// A row-level restriction applied to a share link, user or sub-customer.
///
/// # Example
///
/// ```
/// use knowi::{ContentFilter, FilterOperator};
///
/// let filter = ContentFilter::new("State", FilterOperator::Equals, ["AZ"]);
/// let json = serde_json::to_value(&filter).unwrap();
/// assert_eq!(json, serde_json::json!({
///     "fieldName": "State",
///     "values": ["AZ"],
///     "operator": "="
/// }));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentFilter {
    pub field_name: String,
    pub values: Vec<Value>,
    pub operator: FilterOperator,
}

impl ContentFilter {
    pub fn new<I, V>(field_name: impl Into<String>, operator: FilterOperator, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            field_name: field_name.into(),
            values: values.into_iter().map(Into::into).collect(),
            operator,
        }
    }

    /// Parse `field<op>value[,value...]`, as typed on a command line.
    ///
    /// Operators are matched longest first, so `Year>=2016` is a
    /// greater-or-equal filter rather than a greater-than filter on `=2016`.
    pub fn parse(expr: &str) -> Result<Self, Error> {
        const OPERATORS: [&str; 6] = [">=", "<=", "!=", "=", ">", "<"];

        for op in OPERATORS {
            if let Some((field, values)) = expr.split_once(op) {
                let field = field.trim();
                if field.is_empty() {
                    break;
                }
                let values: Vec<Value> = values
                    .split(',')
                    .map(str::trim)
                    .filter(|v| !v.is_empty())
                    .map(|v| Value::String(v.to_string()))
                    .collect();
                return Ok(Self {
                    field_name: field.to_string(),
                    values,
                    operator: op.parse()?,
                });
            }
        }

        Err(InvalidInputError::Other {
            message: format!("content filter must look like 'field=value', got '{}'", expr),
        }
        .into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn operator_accepts_names_and_symbols() {
        assert_eq!("not equals".parse::<FilterOperator>().unwrap(), FilterOperator::NotEquals);
        assert_eq!("like".parse::<FilterOperator>().unwrap(), FilterOperator::Contains);
        assert!("~".parse::<FilterOperator>().is_err());
    }

    #[test]
    fn mixed_value_types_are_kept() {
        let filter = ContentFilter::new(
            "orgId",
            FilterOperator::Equals,
            [json!(123), json!("7893")],
        );
        assert_eq!(
            serde_json::to_value(filter).unwrap(),
            json!({"fieldName": "orgId", "values": [123, "7893"], "operator": "="})
        );
    }

    #[test]
    fn parse_command_line_filter() {
        let filter = ContentFilter::parse("Year>=2016").unwrap();
        assert_eq!(filter.field_name, "Year");
        assert_eq!(filter.operator, FilterOperator::GreaterThanOrEquals);
        assert_eq!(filter.values, vec![json!("2016")]);

        let filter = ContentFilter::parse("region=Canada, Spain").unwrap();
        assert_eq!(filter.values, vec![json!("Canada"), json!("Spain")]);

        assert!(ContentFilter::parse("=AZ").is_err());
        assert!(ContentFilter::parse("State").is_err());
    }
}
