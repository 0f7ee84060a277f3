//! knowi - command line client for the Knowi management API.
//!
//! A thin wrapper over the `knowi` library for scripting and for poking at
//! an account by hand. Results are printed as JSON on stdout.

mod cli;
mod commands;
mod output;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{auth, call, dashboards, datasets, groups, queries, sso, system, users, widgets};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    if let Err(e) = run(cli).await {
        output::error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let out = output::Printer::new(cli.pretty);
    let connection = cli.connection;

    match cli.command {
        Commands::Auth(args) => auth::run(&connection, args).await,
        Commands::Call(args) => call::run(&connection, &out, args).await,
        Commands::Dashboards(cmd) => dashboards::handle(&connection, &out, cmd).await,
        Commands::Widgets(cmd) => widgets::handle(&connection, &out, cmd).await,
        Commands::Queries(cmd) => queries::handle(&connection, &out, cmd).await,
        Commands::Users(cmd) => users::handle(&connection, &out, cmd).await,
        Commands::Groups(cmd) => groups::handle(&connection, &out, cmd).await,
        Commands::Datasets(cmd) => datasets::handle(&connection, &out, cmd).await,
        Commands::System(cmd) => system::handle(&connection, &out, cmd).await,
        Commands::Sso(cmd) => sso::handle(&out, cmd).await,
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
