//! Query subcommands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;

use super::ids;
use crate::cli::ConnectionArgs;
use crate::output::Printer;

#[derive(Args, Debug)]
pub struct QueriesCommand {
    #[command(subcommand)]
    pub command: QueriesSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum QueriesSubcommand {
    /// List queries
    List {
        /// Only queries in these categories (comma separated ids)
        #[arg(long)]
        categories: Option<String>,
    },

    /// Show a query
    Get {
        id: u64,

        /// Include joined datasources
        #[arg(long)]
        joins: bool,
    },

    /// Run a query now
    Refresh { id: u64 },
}

pub async fn handle(connection: &ConnectionArgs, out: &Printer, cmd: QueriesCommand) -> Result<()> {
    let queries = connection.client()?.queries();

    let value = match cmd.command {
        QueriesSubcommand::List { categories } => queries
            .list(&ids(categories.as_deref())?)
            .await
            .context("Failed to list queries")?,
        QueriesSubcommand::Get { id, joins } => queries
            .get(id, joins)
            .await
            .with_context(|| format!("Failed to get query {}", id))?,
        QueriesSubcommand::Refresh { id } => {
            eprintln!("{}", format!("Refreshing query {}...", id).dimmed());
            queries
                .refresh(id)
                .await
                .with_context(|| format!("Failed to refresh query {}", id))?
        }
    };

    out.json(&value)
}
