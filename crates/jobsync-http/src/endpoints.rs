//! Wire types of the job search API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use jobsync_core::schema::scalar_text;
use jobsync_core::{ListingQuery, NaturalKey};

/// Header carrying the API key (`X-API-Key`, lowercased for `http`).
pub const API_KEY_HEADER: &str = "x-api-key";

/// Query parameters of the listing endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct ListingParams<'a> {
    /// Search term.
    pub was: &'a str,
    /// Offer type.
    pub angebotsart: &'a str,
    /// One-based page index.
    pub page: u32,
    /// Page size.
    pub size: u32,
    /// Sort order.
    pub sort: &'a str,
    /// Freshness window in days.
    pub veroeffentlichtseit: u32,
}

impl<'a> ListingParams<'a> {
    pub fn new(query: &'a ListingQuery, page: u32) -> Self {
        Self {
            was: &query.search_term,
            angebotsart: &query.offer_type,
            page,
            size: query.page_size,
            sort: &query.sort,
            veroeffentlichtseit: query.published_within_days,
        }
    }
}

/// One page of the listing endpoint.
///
/// Items are kept as raw JSON so one malformed entry cannot reject the
/// whole page.
#[derive(Debug, Deserialize)]
pub(crate) struct ListingPage {
    #[serde(default, rename = "stellenangebote")]
    items: Option<Vec<Value>>,
    #[serde(default, rename = "maxErgebnisse")]
    total: Option<Value>,
}

impl ListingPage {
    /// Listing entries; a null item array is an empty page.
    pub fn items(&self) -> &[Value] {
        self.items.as_deref().unwrap_or_default()
    }

    /// Keys of the entries that carry a usable `refnr`.
    pub fn keys(&self) -> impl Iterator<Item = NaturalKey> + '_ {
        self.items()
            .iter()
            .filter_map(|item| item.get("refnr"))
            .filter_map(scalar_text)
            .filter_map(|refnr| NaturalKey::new(refnr).ok())
    }

    /// Total number of results the source advertises.
    ///
    /// The source sends a number or a numeric string. Anything else counts
    /// as zero, which ends the walk after the current page.
    pub fn total(&self) -> u64 {
        match &self.total {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        }
    }
}
