//! Argument groups shared by several commands.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;

use jobsync_core::config::{DEFAULT_API_KEY, DEFAULT_BASE_URL};
use jobsync_core::{ApiKey, ApiUrl, ListingQuery, RetryPolicy, SourceConfig, StoreConfig};

/// Where the search API lives and how to query it.
#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Base URL of the job search API
    #[arg(long, env = "JOBSYNC_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// API key sent with every request
    #[arg(long, env = "JOBSYNC_API_KEY", default_value = DEFAULT_API_KEY, hide_env_values = true)]
    pub api_key: String,

    /// Search term
    #[arg(long, default_value = "data")]
    pub search: String,

    /// Offer type filter (1 = employment)
    #[arg(long, default_value = "1")]
    pub offer_type: String,

    /// Listing page size
    #[arg(long, default_value_t = 50)]
    pub page_size: u32,

    /// Listing sort order
    #[arg(long, default_value = "veroeffdatum")]
    pub sort: String,

    /// Only postings published within this many days
    #[arg(long, default_value_t = 1)]
    pub published_within: u32,

    /// Attempts per request, including the first
    #[arg(long, default_value_t = 3)]
    pub attempts: u32,

    /// Backoff before the first retry, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub backoff_ms: u64,

    /// Pause between requests, in milliseconds
    #[arg(long, default_value_t = 200)]
    pub delay_ms: u64,

    /// Request timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl SourceArgs {
    pub fn to_config(&self) -> Result<SourceConfig> {
        let base_url = ApiUrl::new(&self.base_url).context("Invalid base URL")?;
        let api_key = ApiKey::new(&self.api_key).context("Invalid API key")?;

        let mut config = SourceConfig::new(base_url, api_key);
        config.listing = ListingQuery {
            search_term: self.search.clone(),
            offer_type: self.offer_type.clone(),
            page_size: self.page_size,
            sort: self.sort.clone(),
            published_within_days: self.published_within,
        };
        config.retry = RetryPolicy::new(self.attempts, Duration::from_millis(self.backoff_ms));
        config.request_delay = Duration::from_millis(self.delay_ms);
        config.timeout = Duration::from_secs(self.timeout_secs);
        Ok(config)
    }
}

/// Where the store and its snapshots are kept.
#[derive(Args, Debug)]
pub struct StoreArgs {
    /// Store file
    #[arg(long, env = "JOBSYNC_STORE", default_value = "job_details.csv")]
    pub store: PathBuf,

    /// Directory for pre-append snapshots
    #[arg(long, env = "JOBSYNC_BACKUP_DIR", default_value = "job_details_backups")]
    pub backup_dir: PathBuf,
}

impl StoreArgs {
    pub fn to_config(&self) -> StoreConfig {
        StoreConfig::new(&self.store, &self.backup_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        source: SourceArgs,
        #[command(flatten)]
        store: StoreArgs,
    }

    #[test]
    fn defaults_match_library_defaults() {
        let harness = Harness::try_parse_from(["test"]).unwrap();
        let config = harness.source.to_config().unwrap();

        assert_eq!(config.base_url.as_str().trim_end_matches('/'), DEFAULT_BASE_URL);
        assert_eq!(config.api_key.expose(), DEFAULT_API_KEY);
        assert_eq!(config.listing, ListingQuery::default());
        assert_eq!(config.retry.max_attempts(), 3);
        assert_eq!(config.retry.base_delay(), Duration::from_millis(500));
        assert_eq!(config.request_delay, Duration::from_millis(200));
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(harness.store.to_config(), StoreConfig::default());
    }

    #[test]
    fn rejects_plain_http_to_remote_hosts() {
        let harness =
            Harness::try_parse_from(["test", "--base-url", "http://example.com/api"]).unwrap();
        assert!(harness.source.to_config().is_err());
    }

    #[test]
    fn overrides_reach_the_config() {
        let harness = Harness::try_parse_from([
            "test",
            "--search",
            "rust",
            "--page-size",
            "10",
            "--attempts",
            "1",
            "--delay-ms",
            "0",
        ])
        .unwrap();
        let config = harness.source.to_config().unwrap();

        assert_eq!(config.listing.search_term, "rust");
        assert_eq!(config.listing.page_size, 10);
        assert_eq!(config.retry.max_attempts(), 1);
        assert_eq!(config.request_delay, Duration::ZERO);
    }
}
