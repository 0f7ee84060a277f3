//! Group subcommands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::ConnectionArgs;
use crate::output::Printer;

#[derive(Args, Debug)]
pub struct GroupsCommand {
    #[command(subcommand)]
    pub command: GroupsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum GroupsSubcommand {
    /// List groups
    List {
        /// Only the groups of this user
        #[arg(long)]
        user: Option<u64>,
    },
}

pub async fn handle(connection: &ConnectionArgs, out: &Printer, cmd: GroupsCommand) -> Result<()> {
    let groups = connection.client()?.groups();

    let value = match cmd.command {
        GroupsSubcommand::List { user: None } => {
            groups.list().await.context("Failed to list groups")?
        }
        GroupsSubcommand::List { user: Some(user) } => groups
            .list_for_user(user)
            .await
            .with_context(|| format!("Failed to list groups of user {}", user))?,
    };

    out.json(&value)
}
