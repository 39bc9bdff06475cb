//! Harvester configuration.
//!
//! All settings are gathered into immutable structs that components receive
//! at construction.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::RetryPolicy;
use crate::types::{ApiKey, ApiUrl};

/// Default base URL of the job search API.
pub const DEFAULT_BASE_URL: &str = "https://rest.arbeitsagentur.de/jobboerse/jobsuche-service/pc/v4";

/// Default public API key of the job search API.
pub const DEFAULT_API_KEY: &str = "jobboerse-jobsuche";

/// Query sent to the listing endpoint on every page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// Free-text search term.
    pub search_term: String,
    /// Offer type filter (`1` = employment).
    pub offer_type: String,
    /// Number of items per page.
    pub page_size: u32,
    /// Sort order understood by the source.
    pub sort: String,
    /// Only postings published within this many days.
    pub published_within_days: u32,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            search_term: "data".to_string(),
            offer_type: "1".to_string(),
            page_size: 50,
            sort: "veroeffdatum".to_string(),
            published_within_days: 1,
        }
    }
}

/// How to reach the remote source.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Base URL of the API.
    pub base_url: ApiUrl,
    /// API-key credential sent with every request.
    pub api_key: ApiKey,
    /// Listing query parameters.
    pub listing: ListingQuery,
    /// Timeout of a single HTTP request.
    pub timeout: Duration,
    /// Retry policy for every request.
    pub retry: RetryPolicy,
    /// Pause between successive remote calls.
    pub request_delay: Duration,
}

impl SourceConfig {
    /// Create a configuration with default query, timeout, retry and pacing.
    pub fn new(base_url: ApiUrl, api_key: ApiKey) -> Self {
        Self {
            base_url,
            api_key,
            listing: ListingQuery::default(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            request_delay: Duration::from_millis(200),
        }
    }
}

/// Where records and backups are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// The tabular store file.
    pub path: PathBuf,
    /// Directory receiving one snapshot per committing run.
    pub backup_dir: PathBuf,
}

impl StoreConfig {
    /// Create a store configuration.
    pub fn new(path: impl AsRef<Path>, backup_dir: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            backup_dir: backup_dir.as_ref().to_path_buf(),
        }
    }

    /// File name stem used for snapshot names.
    pub fn backup_stem(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .unwrap_or("store")
            .to_string()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::new("job_details.csv", "job_details_backups")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_listing_query() {
        let query = ListingQuery::default();
        assert_eq!(query.search_term, "data");
        assert_eq!(query.page_size, 50);
        assert_eq!(query.published_within_days, 1);
    }

    #[test]
    fn default_source_config_parses() {
        let config = SourceConfig::new(
            ApiUrl::new(DEFAULT_BASE_URL).unwrap(),
            ApiKey::new(DEFAULT_API_KEY).unwrap(),
        );
        assert_eq!(config.retry.max_attempts(), 3);
        assert_eq!(config.request_delay, Duration::from_millis(200));
    }

    #[test]
    fn backup_stem_from_store_path() {
        assert_eq!(StoreConfig::default().backup_stem(), "job_details");
        assert_eq!(StoreConfig::new("/", "b").backup_stem(), "store");
    }
}
