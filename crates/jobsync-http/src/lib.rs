//! jobsync-http - HTTP listing and detail sources.

mod client;
mod detail;
mod endpoints;
mod listing;

pub use client::Fetcher;
pub use detail::HttpDetails;
pub use endpoints::API_KEY_HEADER;
pub use listing::HttpListing;
