//! Dataset subcommands.

use anyhow::{Context, Result, bail};
use clap::{Args, Subcommand};
use knowi::api::{DatasetData, DatasetQuery, ExportFormat, RuntimeToken};

use super::key_value;
use crate::cli::ConnectionArgs;
use crate::output::Printer;

#[derive(Args, Debug)]
pub struct DatasetsCommand {
    #[command(subcommand)]
    pub command: DatasetsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum DatasetsSubcommand {
    /// Read the rows of a widget, dataset or query
    Get(GetArgs),
}

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Query identifier
    #[arg(long, required_unless_present = "name")]
    pub identifier: Option<String>,

    /// Widget, dataset or query name
    #[arg(long)]
    pub name: Option<String>,

    /// C9QL applied while reading
    #[arg(long)]
    pub c9_filter: Option<String>,

    /// Output format: json or csv
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Maximum number of rows
    #[arg(long, default_value_t = 10000)]
    pub limit: u32,

    /// Runtime token as NAME=VALUE (repeatable)
    #[arg(long = "token", value_name = "NAME=VALUE")]
    pub tokens: Vec<String>,
}

pub async fn handle(connection: &ConnectionArgs, out: &Printer, cmd: DatasetsCommand) -> Result<()> {
    let DatasetsSubcommand::Get(args) = cmd.command;

    let mut query = match (args.identifier, args.name) {
        (Some(identifier), _) => DatasetQuery::by_identifier(identifier),
        (None, Some(name)) => DatasetQuery::by_name(name),
        (None, None) => bail!("--identifier or --name is required"),
    };
    query.export_format = args.format.parse::<ExportFormat>()?;
    query.c9_filter = args.c9_filter;
    query.limit = args.limit;
    for pair in &args.tokens {
        let (parameter_name, parameter_value) = key_value(pair)?;
        query.runtime_tokens.push(RuntimeToken {
            parameter_name,
            parameter_value,
        });
    }

    let data = connection
        .client()?
        .datasets()
        .get_data(&query)
        .await
        .context("Failed to read dataset")?;

    match data {
        DatasetData::Json(value) => out.json(&value),
        DatasetData::Csv(text) => {
            out.text(&text);
            Ok(())
        }
    }
}
