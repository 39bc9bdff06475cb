//! Encode command implementation.

use anyhow::{Context, Result};
use clap::Args;

use jobsync_core::{NaturalKey, codec};

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Posting key, or a token with --decode
    pub value: String,

    /// Decode a token back into its posting key
    #[arg(long)]
    pub decode: bool,
}

pub fn run(args: EncodeArgs) -> Result<()> {
    if args.decode {
        let key = codec::decode(&args.value).context("Invalid token")?;
        println!("{}", key);
    } else {
        let key = NaturalKey::new(&args.value).context("Invalid posting key")?;
        println!("{}", codec::encode(&key));
    }
    Ok(())
}
