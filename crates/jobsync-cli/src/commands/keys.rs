//! Keys command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use jobsync_core::ListingSource;
use jobsync_http::{Fetcher, HttpListing};

use crate::args::SourceArgs;

#[derive(Args, Debug)]
pub struct KeysArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

pub async fn run(args: KeysArgs) -> Result<()> {
    let source = args.source.to_config()?;
    let fetcher = Fetcher::new(&source).context("Failed to create HTTP client")?;
    let listing = HttpListing::new(fetcher, &source);

    let keys = listing.list_all_keys().await;

    if keys.is_empty() {
        eprintln!("{}", "No postings found.".dimmed());
        return Ok(());
    }

    for key in &keys {
        println!("{}", key);
    }

    Ok(())
}
