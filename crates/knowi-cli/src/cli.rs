//! CLI argument definitions.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use knowi::Knowi;
use tracing::debug;

use crate::commands::{
    auth::AuthArgs, call::CallArgs, dashboards::DashboardsCommand, datasets::DatasetsCommand,
    groups::GroupsCommand, queries::QueriesCommand, sso::SsoCommand, system::SystemCommand,
    users::UsersCommand, widgets::WidgetsCommand,
};

/// Command line client for the Knowi management API.
#[derive(Parser, Debug)]
#[command(name = "knowi")]
#[command(author, version = env!("KNOWI_CLI_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where and as whom to connect.
#[derive(Args, Debug, Clone)]
pub struct ConnectionArgs {
    /// API client id
    #[arg(long, env = "KNOWI_CLIENT_ID", global = true, hide_env_values = true)]
    pub client_id: Option<String>,

    /// API client secret
    #[arg(long, env = "KNOWI_CLIENT_SECRET", global = true, hide_env_values = true)]
    pub client_secret: Option<String>,

    /// API root, e.g. https://www.knowi.com/api/1.0
    #[arg(long, env = "KNOWI_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Credential exchange path, relative to the API root
    #[arg(long, env = "KNOWI_AUTH_PATH", global = true)]
    pub auth_path: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

impl ConnectionArgs {
    /// Build a management client from the flags.
    pub fn client(&self) -> Result<Knowi> {
        let mut builder = Knowi::builder();
        if let Some(id) = &self.client_id {
            builder = builder.client_id(id);
        }
        if let Some(secret) = &self.client_secret {
            builder = builder.client_secret(secret);
        }
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url);
        }
        if let Some(path) = &self.auth_path {
            builder = builder.auth_path(path);
        }
        if let Some(secs) = self.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        debug!(base_url = ?self.base_url, auth_path = ?self.auth_path, "Building client");
        builder.build().context(
            "Invalid client configuration (set --client-id/--client-secret or KNOWI_CLIENT_ID/KNOWI_CLIENT_SECRET)",
        )
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Exchange credentials and report the token
    Auth(AuthArgs),

    /// Send an arbitrary authenticated request
    Call(CallArgs),

    /// Dashboard operations
    Dashboards(DashboardsCommand),

    /// Widget operations
    Widgets(WidgetsCommand),

    /// Query operations
    Queries(QueriesCommand),

    /// User operations
    Users(UsersCommand),

    /// Group operations
    Groups(GroupsCommand),

    /// Read dataset rows
    Datasets(DatasetsCommand),

    /// System health checks
    System(SystemCommand),

    /// Single sign-on operations (customer token)
    Sso(SsoCommand),
}
