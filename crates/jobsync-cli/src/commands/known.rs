//! Known command implementation.

use anyhow::{Context, Result};
use clap::Args;

use jobsync_core::{RecordStore, Schema};
use jobsync_file::CsvStore;

use crate::args::StoreArgs;

#[derive(Args, Debug)]
pub struct KnownArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Print every stored key, sorted, instead of the count
    #[arg(long)]
    pub list: bool,
}

pub fn run(args: KnownArgs) -> Result<()> {
    let store = CsvStore::new(args.store.to_config(), Schema::job_postings());
    let known = store
        .load_known_keys()
        .with_context(|| format!("Failed to read {}", store.path().display()))?;

    if args.list {
        let mut keys: Vec<_> = known.into_iter().collect();
        keys.sort();
        for key in &keys {
            println!("{}", key);
        }
    } else {
        println!("{}", known.len());
    }

    Ok(())
}
