//! Dashboard subcommands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use super::ids;
use crate::cli::ConnectionArgs;
use crate::output::{self, Printer};

#[derive(Args, Debug)]
pub struct DashboardsCommand {
    #[command(subcommand)]
    pub command: DashboardsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum DashboardsSubcommand {
    /// List dashboards
    List {
        /// Only dashboards in these categories (comma separated ids)
        #[arg(long)]
        categories: Option<String>,
    },

    /// Show a dashboard
    Get { id: u64 },

    /// List the widgets on a dashboard
    Widgets { id: u64 },

    /// Render a dashboard to PDF
    ExportPdf {
        id: u64,

        /// Output file (defaults to the name the server suggests)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

pub async fn handle(connection: &ConnectionArgs, out: &Printer, cmd: DashboardsCommand) -> Result<()> {
    let client = connection.client()?;
    let dashboards = client.dashboards();

    match cmd.command {
        DashboardsSubcommand::List { categories } => {
            let categories = ids(categories.as_deref())?;
            let list = dashboards
                .list(&categories)
                .await
                .context("Failed to list dashboards")?;
            out.json(&list)
        }
        DashboardsSubcommand::Get { id } => {
            let dashboard = dashboards
                .get(id)
                .await
                .with_context(|| format!("Failed to get dashboard {}", id))?;
            out.json(&dashboard)
        }
        DashboardsSubcommand::Widgets { id } => {
            let widgets = dashboards
                .widgets(id)
                .await
                .with_context(|| format!("Failed to list widgets of dashboard {}", id))?;
            out.json(&widgets)
        }
        DashboardsSubcommand::ExportPdf { id, output: path } => {
            let pdf = dashboards
                .export_pdf(id)
                .await
                .with_context(|| format!("Failed to export dashboard {}", id))?;

            let path = path
                .or_else(|| pdf.filename.as_ref().map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(format!("dashboard-{}.pdf", id)));

            tokio::fs::write(&path, &pdf.bytes)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;

            output::success("PDF exported");
            output::field("File", &path.display().to_string());
            output::field("Bytes", &pdf.bytes.len().to_string());
            Ok(())
        }
    }
}
