//! Widget subcommands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use super::ids;
use crate::cli::ConnectionArgs;
use crate::output::Printer;

#[derive(Args, Debug)]
pub struct WidgetsCommand {
    #[command(subcommand)]
    pub command: WidgetsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum WidgetsSubcommand {
    /// List widgets
    List {
        /// Only widgets in these categories (comma separated ids)
        #[arg(long)]
        categories: Option<String>,
    },

    /// Show a widget
    Get { id: u64 },
}

pub async fn handle(connection: &ConnectionArgs, out: &Printer, cmd: WidgetsCommand) -> Result<()> {
    let widgets = connection.client()?.widgets();

    let value = match cmd.command {
        WidgetsSubcommand::List { categories } => widgets
            .list(&ids(categories.as_deref())?)
            .await
            .context("Failed to list widgets")?,
        WidgetsSubcommand::Get { id } => widgets
            .get(id)
            .await
            .with_context(|| format!("Failed to get widget {}", id))?,
    };

    out.json(&value)
}
