//! System health checks.

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::Result;
use crate::client::Knowi;
use crate::error::{Error, InvalidInputError};
use crate::http::ApiRequest;

/// A component whose status can be checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SystemCheck {
    /// Every component at once.
    #[default]
    All,
    MySql,
    MongoDb,
    MessageMq,
    HostedConnector,
    QueryPreview,
    QuerySaveAndRunNow,
    DashboardLoad,
    WidgetLoad,
}

impl SystemCheck {
    pub const ALL: [SystemCheck; 9] = [
        SystemCheck::All,
        SystemCheck::MySql,
        SystemCheck::MongoDb,
        SystemCheck::MessageMq,
        SystemCheck::HostedConnector,
        SystemCheck::QueryPreview,
        SystemCheck::QuerySaveAndRunNow,
        SystemCheck::DashboardLoad,
        SystemCheck::WidgetLoad,
    ];

    /// API path of the check.
    pub fn path(self) -> &'static str {
        match self {
            SystemCheck::All => "/kpi",
            SystemCheck::MySql => "/kpi/checkMySQL",
            SystemCheck::MongoDb => "/kpi/checkMongoDB",
            SystemCheck::MessageMq => "/kpi/checkMessageMQ",
            SystemCheck::HostedConnector => "/kpi/checkHostedConnector",
            SystemCheck::QueryPreview => "/kpi/checkQueryPreview",
            SystemCheck::QuerySaveAndRunNow => "/kpi/checkQuerySaveAndRunNow",
            SystemCheck::DashboardLoad => "/kpi/checkDashboardLoad",
            SystemCheck::WidgetLoad => "/kpi/checkWidgetLoad",
        }
    }

    /// Short name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            SystemCheck::All => "all",
            SystemCheck::MySql => "mysql",
            SystemCheck::MongoDb => "mongodb",
            SystemCheck::MessageMq => "messagemq",
            SystemCheck::HostedConnector => "hosted-connector",
            SystemCheck::QueryPreview => "query-preview",
            SystemCheck::QuerySaveAndRunNow => "query-save-and-run-now",
            SystemCheck::DashboardLoad => "dashboard-load",
            SystemCheck::WidgetLoad => "widget-load",
        }
    }
}

impl fmt::Display for SystemCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SystemCheck {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.to_ascii_lowercase();
        SystemCheck::ALL
            .into_iter()
            .find(|check| check.name() == wanted)
            .ok_or_else(|| {
                InvalidInputError::Other {
                    message: format!("unknown system check '{}'", s),
                }
                .into()
            })
    }
}

/// System health API client.
pub struct SystemApi {
    client: Knowi,
}

impl SystemApi {
    pub(crate) fn new(client: Knowi) -> Self {
        Self { client }
    }

    /// Check the status of a component.
    pub async fn check(&self, check: SystemCheck) -> Result<Value> {
        self.client
            .execute(&ApiRequest::get(check.path()))
            .await?
            .json_or_text()
    }
}
