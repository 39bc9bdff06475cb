//! Listing paginator.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use jobsync_core::{ApiUrl, ListingQuery, ListingSource, NaturalKey, SourceConfig};

use crate::client::Fetcher;
use crate::endpoints::{ListingPage, ListingParams};

/// Walks the listing endpoint page by page.
///
/// The walk ends when a page comes back empty, when the number of items
/// seen reaches the advertised total, or when a page cannot be fetched.
/// The page index strictly increases, so the walk always terminates.
#[derive(Debug, Clone)]
pub struct HttpListing {
    fetcher: Fetcher,
    base_url: ApiUrl,
    query: ListingQuery,
    page_delay: Duration,
}

impl HttpListing {
    /// Create a paginator over the configured listing query.
    pub fn new(fetcher: Fetcher, config: &SourceConfig) -> Self {
        Self {
            fetcher,
            base_url: config.base_url.clone(),
            query: config.listing.clone(),
            page_delay: config.request_delay,
        }
    }

    /// Returns the listing query.
    pub fn query(&self) -> &ListingQuery {
        &self.query
    }
}

#[async_trait]
impl ListingSource for HttpListing {
    #[instrument(skip(self), fields(search = %self.query.search_term))]
    async fn list_all_keys(&self) -> Vec<NaturalKey> {
        let url = self.base_url.listing_url();
        let mut keys = Vec::new();
        let mut seen: u64 = 0;
        let mut page: u32 = 1;

        loop {
            let params = ListingParams::new(&self.query, page);
            let listing: ListingPage = match self.fetcher.get(&url, &params).await {
                Ok(listing) => listing,
                Err(e) => {
                    warn!(page, error = %e, "listing page failed, keeping partial results");
                    break;
                }
            };

            if listing.items().is_empty() {
                debug!(page, "empty page, listing complete");
                break;
            }

            seen += listing.items().len() as u64;
            let total = listing.total();
            let before = keys.len();
            keys.extend(listing.keys());
            let skipped = listing.items().len() - (keys.len() - before);
            if skipped > 0 {
                warn!(page, skipped, "listing entries without a usable key");
            }
            debug!(page, seen, total, "listing page fetched");

            if seen >= total {
                break;
            }

            page += 1;
            if !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        info!(pages = page, keys = keys.len(), "listing walked");
        keys
    }
}
