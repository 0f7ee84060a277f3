//! System health subcommands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use knowi::api::SystemCheck;

use crate::cli::ConnectionArgs;
use crate::output::Printer;

#[derive(Args, Debug)]
pub struct SystemCommand {
    #[command(subcommand)]
    pub command: SystemSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum SystemSubcommand {
    /// Check a component (all, mysql, mongodb, messagemq, hosted-connector,
    /// query-preview, query-save-and-run-now, dashboard-load, widget-load)
    Check {
        #[arg(default_value = "all")]
        component: String,
    },
}

pub async fn handle(connection: &ConnectionArgs, out: &Printer, cmd: SystemCommand) -> Result<()> {
    let SystemSubcommand::Check { component } = cmd.command;
    let check: SystemCheck = component.parse()?;

    let status = connection
        .client()?
        .system()
        .check(check)
        .await
        .with_context(|| format!("System check '{}' failed", check))?;

    out.json(&status)
}
