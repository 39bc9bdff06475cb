//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{encode, fetch, keys, known, run};

/// Incremental harvester for the public job search API.
#[derive(Parser, Debug)]
#[command(name = "jobsync")]
#[command(author, version = env!("JOBSYNC_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch new postings and append them to the store
    Run(run::RunArgs),

    /// Print the keys the listing currently offers
    Keys(keys::KeysArgs),

    /// Fetch a single posting and print it as JSON
    Fetch(fetch::FetchArgs),

    /// Print the transport token for a posting key
    Encode(encode::EncodeArgs),

    /// Print the number of postings already stored
    Known(known::KnownArgs),
}
