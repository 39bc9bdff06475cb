//! Remote source traits.

use async_trait::async_trait;

use crate::types::{NaturalKey, Record};

/// A paginated listing of the postings the source currently exposes.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Collect the natural keys of every listed posting, in listing order.
    ///
    /// A page that cannot be fetched ends the walk early; the keys gathered
    /// so far are returned rather than an error.
    async fn list_all_keys(&self) -> Vec<NaturalKey>;
}

/// Full posting records addressed by natural key.
#[async_trait]
pub trait DetailSource: Send + Sync {
    /// Fetch the full record for a key.
    ///
    /// Returns `None` if the record could not be retrieved. The returned
    /// record always carries a usable natural key.
    async fn resolve(&self, key: &NaturalKey) -> Option<Record>;
}
