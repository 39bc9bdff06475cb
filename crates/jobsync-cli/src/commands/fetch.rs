//! Fetch command implementation.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use jobsync_core::{NaturalKey, Schema};
use jobsync_http::{Fetcher, HttpDetails};

use crate::args::SourceArgs;
use crate::output;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Posting key (refnr)
    pub key: String,

    /// Print the row as it would be stored instead of the raw payload
    #[arg(long)]
    pub conform: bool,

    #[command(flatten)]
    pub source: SourceArgs,
}

pub async fn run(args: FetchArgs) -> Result<()> {
    let key = NaturalKey::new(&args.key).context("Invalid posting key")?;
    let source = args.source.to_config()?;
    let schema = Schema::job_postings();

    let fetcher = Fetcher::new(&source).context("Failed to create HTTP client")?;
    let details = HttpDetails::new(fetcher, &source, schema.clone());

    let record = details
        .fetch(&key)
        .await
        .with_context(|| format!("Failed to fetch posting {}", key))?;

    if args.conform {
        let row = schema.conform(&record, Utc::now());
        output::json(row.fields(), true)?;
    } else {
        output::json(record.fields(), true)?;
    }

    Ok(())
}
