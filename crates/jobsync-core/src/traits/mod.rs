//! Traits implemented by jobsync backends.

mod source;
mod store;

pub use source::{DetailSource, ListingSource};
pub use store::{CommitSummary, RecordStore};
