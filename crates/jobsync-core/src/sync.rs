//! One incremental synchronisation run.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, instrument};

use crate::Result;
use crate::reconcile::Reconciler;
use crate::traits::{DetailSource, ListingSource, RecordStore};

/// Machine-readable outcome of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Keys found in the listing.
    pub candidates: usize,
    /// Keys already in the store before the run.
    pub known: usize,
    /// Candidates skipped as already stored.
    pub skipped_known: usize,
    /// Candidates whose detail could not be fetched.
    pub failed: usize,
    /// Rows appended to the store.
    pub appended: usize,
    /// Snapshot taken before appending.
    pub backup: Option<PathBuf>,
}

/// Run one synchronisation: load stored keys, list candidates, reconcile,
/// then commit the new records.
///
/// Only store errors are returned; unreachable pages and postings reduce
/// the amount of work done but never fail the run.
#[instrument(skip_all)]
pub async fn run<L, D, S>(listing: &L, reconciler: &Reconciler<D>, store: &S) -> Result<RunSummary>
where
    L: ListingSource,
    D: DetailSource,
    S: RecordStore,
{
    let known = store.load_known_keys()?;
    info!(known = known.len(), "loaded stored keys");

    let candidates = listing.list_all_keys().await;
    info!(candidates = candidates.len(), "listed candidate keys");

    let reconciliation = reconciler.reconcile(&candidates, &known).await;
    let failed = reconciliation.failed.len();
    let skipped_known = reconciliation.skipped_known;

    let commit = store.commit(reconciliation.records)?;
    info!(appended = commit.appended, backup = ?commit.backup, "run finished");

    Ok(RunSummary {
        candidates: candidates.len(),
        known: known.len(),
        skipped_known,
        failed,
        appended: commit.appended,
        backup: commit.backup,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::traits::CommitSummary;
    use crate::types::{NaturalKey, Record};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct FixedListing(Vec<&'static str>);

    #[async_trait]
    impl ListingSource for FixedListing {
        async fn list_all_keys(&self) -> Vec<NaturalKey> {
            self.0.iter().map(|k| NaturalKey::new(k).unwrap()).collect()
        }
    }

    struct EchoDetails;

    #[async_trait]
    impl DetailSource for EchoDetails {
        async fn resolve(&self, key: &NaturalKey) -> Option<Record> {
            if key.as_str() == "broken" {
                return None;
            }
            let mut fields = serde_json::Map::new();
            fields.insert("refnr".to_string(), json!(key.as_str()));
            Some(Record::new(key.clone(), fields))
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        rows: Mutex<Vec<Record>>,
    }

    impl RecordStore for MemoryStore {
        fn load_known_keys(&self) -> Result<HashSet<NaturalKey>> {
            Ok(self.rows.lock().unwrap().iter().map(|r| r.key().clone()).collect())
        }

        fn commit(&self, records: Vec<Record>) -> Result<CommitSummary> {
            let appended = records.len();
            self.rows.lock().unwrap().extend(records);
            Ok(CommitSummary {
                appended,
                backup: None,
            })
        }
    }

    #[tokio::test]
    async fn consecutive_runs_only_add_new_postings() {
        let store = MemoryStore::default();
        let reconciler = Reconciler::new(EchoDetails, Schema::job_postings());

        let first = run(&FixedListing(vec!["A", "B", "broken"]), &reconciler, &store)
            .await
            .unwrap();
        assert_eq!(first.appended, 2);
        assert_eq!(first.failed, 1);
        assert_eq!(first.known, 0);

        let second = run(&FixedListing(vec!["C", "A", "B"]), &reconciler, &store)
            .await
            .unwrap();
        assert_eq!(second.known, 2);
        assert_eq!(second.skipped_known, 2);
        assert_eq!(second.appended, 1);
        assert_eq!(store.rows.lock().unwrap().len(), 3);
    }
}
