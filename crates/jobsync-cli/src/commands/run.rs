//! Run command implementation.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use jobsync_core::{Reconciler, RunSummary, ScanPolicy, Schema, sync};
use jobsync_file::CsvStore;
use jobsync_http::{Fetcher, HttpDetails, HttpListing};

use crate::args::{SourceArgs, StoreArgs};
use crate::output;

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Stop scanning the listing at the first posting already stored
    #[arg(long)]
    pub stop_at_known: bool,

    /// Print the run summary as a single JSON line
    #[arg(long)]
    pub summary_json: bool,
}

pub async fn run(args: RunArgs) -> Result<()> {
    let source = args.source.to_config()?;
    let schema = Schema::job_postings();
    let store = CsvStore::new(args.store.to_config(), schema.clone());

    let lock = store.lock().context("Failed to lock the store")?;
    info!(lock = %lock.path().display(), "store locked");

    let fetcher = Fetcher::new(&source).context("Failed to create HTTP client")?;
    let listing = HttpListing::new(fetcher.clone(), &source);
    let details = HttpDetails::new(fetcher, &source, schema.clone());

    let policy = if args.stop_at_known {
        ScanPolicy::StopAtFirstKnown
    } else {
        ScanPolicy::SkipKnown
    };
    let reconciler = Reconciler::new(details, schema)
        .with_policy(policy)
        .with_request_delay(source.request_delay);

    let summary = sync::run(&listing, &reconciler, &store)
        .await
        .with_context(|| format!("Sync of {} failed", store.path().display()))?;

    if args.summary_json {
        output::json(&summary, false)?;
    } else {
        print_summary(&summary);
    }

    Ok(())
}

fn print_summary(summary: &RunSummary) {
    if summary.appended == 0 {
        output::success("Store is up to date");
    } else {
        output::success(&format!("Appended {} new postings", summary.appended));
    }

    output::field("Candidates", &summary.candidates.to_string());
    output::field("Already stored", &summary.known.to_string());
    output::field("Skipped", &summary.skipped_known.to_string());
    if let Some(backup) = &summary.backup {
        output::field("Backup", &backup.display().to_string());
    }

    if summary.failed > 0 {
        output::warning(&format!(
            "{} postings could not be fetched and will be retried next run",
            summary.failed
        ));
    }
}
