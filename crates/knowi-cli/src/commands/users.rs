//! User subcommands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::ConnectionArgs;
use crate::output::Printer;

#[derive(Args, Debug)]
pub struct UsersCommand {
    #[command(subcommand)]
    pub command: UsersSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum UsersSubcommand {
    /// List users
    List,

    /// Show a user
    Get { id: u64 },
}

pub async fn handle(connection: &ConnectionArgs, out: &Printer, cmd: UsersCommand) -> Result<()> {
    let users = connection.client()?.users();

    let value = match cmd.command {
        UsersSubcommand::List => users.list().await.context("Failed to list users")?,
        UsersSubcommand::Get { id } => users
            .get(id)
            .await
            .with_context(|| format!("Failed to get user {}", id))?,
    };

    out.json(&value)
}
