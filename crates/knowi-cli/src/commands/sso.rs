//! Single sign-on subcommands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use knowi::SsoClient;

use crate::output::Printer;

#[derive(Args, Debug)]
pub struct SsoCommand {
    /// Customer token of the single sign-on account
    #[arg(long, env = "KNOWI_CUSTOMER_TOKEN", hide_env_values = true)]
    pub customer_token: String,

    /// Host serving the /sso endpoints
    #[arg(long, env = "KNOWI_SSO_HOST")]
    pub host: Option<String>,

    #[command(subcommand)]
    pub command: SsoSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SsoSubcommand {
    /// List sub-customers
    SubCustomers {
        /// Only sub-customers whose name matches
        #[arg(long)]
        name: Option<String>,
    },

    /// Show a sub-customer by name or token
    SubCustomer { identifier: String },
}

pub async fn handle(out: &Printer, cmd: SsoCommand) -> Result<()> {
    let mut builder = SsoClient::builder().customer_token(cmd.customer_token);
    if let Some(host) = cmd.host {
        builder = builder.host(host);
    }
    let sso = builder.build().context("Invalid single sign-on configuration")?;

    let value = match cmd.command {
        SsoSubcommand::SubCustomers { name } => sso
            .sub_customers(name.as_deref())
            .await
            .context("Failed to list sub-customers")?,
        SsoSubcommand::SubCustomer { identifier } => sso
            .sub_customer(&identifier)
            .await
            .with_context(|| format!("Failed to get sub-customer '{}'", identifier))?,
    };

    out.json(&value)
}
