//! Auth command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use crate::cli::ConnectionArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct AuthArgs {
    /// Print the bearer token itself
    #[arg(long)]
    pub show_token: bool,
}

pub async fn run(connection: &ConnectionArgs, args: AuthArgs) -> Result<()> {
    let client = connection.client()?;

    eprintln!("{}", "Exchanging credentials...".dimmed());

    let token = client
        .bearer_token()
        .await
        .context("Credential exchange failed")?;

    output::success("Authenticated");
    output::field("API", client.base_url().as_str());
    match token.expires_at_utc() {
        Some(at) => output::field("Expires", &at.to_rfc3339()),
        None => output::field("Expires", "unknown (refreshed on rejection)"),
    }

    if args.show_token {
        println!("{}", token.as_str());
    }

    Ok(())
}
