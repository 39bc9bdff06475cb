//! Record store trait.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::Result;
use crate::types::{NaturalKey, Record};

/// Outcome of committing a batch of new records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    /// Number of rows appended.
    pub appended: usize,
    /// Snapshot taken before appending, if the store already existed.
    pub backup: Option<PathBuf>,
}

/// An append-only store of ingested records.
pub trait RecordStore: Send + Sync {
    /// Load the natural keys already stored.
    ///
    /// Returns an empty set if the store does not exist yet.
    fn load_known_keys(&self) -> Result<HashSet<NaturalKey>>;

    /// Back up the store and append `records`.
    ///
    /// Committing an empty batch does nothing and reports zero rows.
    fn commit(&self, records: Vec<Record>) -> Result<CommitSummary>;
}
