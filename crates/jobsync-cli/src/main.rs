//! jobsync - incremental job posting harvester.
//!
//! A thin wrapper over the jobsync crates: each run lists the postings the
//! search API currently offers, fetches the ones the local store has not
//! seen, and appends them after taking a snapshot of the store.

mod args;
mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{encode, fetch, keys, known, run};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Run(args) => run::run(args).await,
        Commands::Keys(args) => keys::run(args).await,
        Commands::Fetch(args) => fetch::run(args).await,
        Commands::Encode(args) => encode::run(args),
        Commands::Known(args) => known::run(args),
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

    // stdout is reserved for command output
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
