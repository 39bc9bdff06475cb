//! Incremental reconciliation of listed keys against stored keys.
//!
//! The reconciler walks the candidate keys in listing order, skips every key
//! the store already holds, and resolves the rest one by one. A key whose
//! detail cannot be fetched is skipped; it never stops the scan.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use crate::schema::Schema;
use crate::traits::DetailSource;
use crate::types::{NaturalKey, Record};

/// What to do when the scan reaches a key that is already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ScanPolicy {
    /// Skip the key and keep scanning.
    #[default]
    SkipKnown,
    /// Stop scanning at the first stored key.
    ///
    /// Only correct if the listing is strictly newest-first and stable
    /// between runs.
    StopAtFirstKnown,
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reconciliation {
    /// New records, stamped and schema-complete, in listing order.
    pub records: Vec<Record>,
    /// Candidates skipped because they were already stored or repeated.
    pub skipped_known: usize,
    /// Candidates whose detail could not be resolved.
    pub failed: Vec<NaturalKey>,
}

/// Computes the new-record set for a run.
pub struct Reconciler<D> {
    details: D,
    schema: Schema,
    policy: ScanPolicy,
    request_delay: Duration,
    clock: fn() -> DateTime<Utc>,
}

impl<D: DetailSource> Reconciler<D> {
    /// Create a reconciler resolving details from `details`.
    pub fn new(details: D, schema: Schema) -> Self {
        Self {
            details,
            schema,
            policy: ScanPolicy::default(),
            request_delay: Duration::ZERO,
            clock: Utc::now,
        }
    }

    /// Set the policy for stored keys.
    pub fn with_policy(mut self, policy: ScanPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Pause this long between successive detail requests.
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Use a different clock for ingestion timestamps.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the schema records are conformed to.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the detail source.
    pub fn details(&self) -> &D {
        &self.details
    }

    /// Compute the new records among `candidates`.
    #[instrument(skip_all, fields(candidates = candidates.len(), known = known.len()))]
    pub async fn reconcile(
        &self,
        candidates: &[NaturalKey],
        known: &HashSet<NaturalKey>,
    ) -> Reconciliation {
        let mut result = Reconciliation::default();
        let mut accepted: HashSet<NaturalKey> = HashSet::new();
        let mut requested = 0usize;

        for (index, key) in candidates.iter().enumerate() {
            if known.contains(key) {
                if self.policy == ScanPolicy::StopAtFirstKnown {
                    info!(key = %key, position = index, "reached stored key, stopping scan");
                    break;
                }
                debug!(key = %key, "already stored, skipping");
                result.skipped_known += 1;
                continue;
            }

            if accepted.contains(key) {
                debug!(key = %key, "listed twice, skipping");
                result.skipped_known += 1;
                continue;
            }

            if requested > 0 && !self.request_delay.is_zero() {
                tokio::time::sleep(self.request_delay).await;
            }
            requested += 1;

            debug!(key = %key, position = index + 1, "resolving candidate");
            let Some(record) = self.details.resolve(key).await else {
                warn!(key = %key, "could not resolve, skipping");
                result.failed.push(key.clone());
                continue;
            };

            // The payload may name a different key than the one requested.
            let resolved = record.key();
            if resolved != key && (known.contains(resolved) || accepted.contains(resolved)) {
                debug!(key = %key, resolved = %resolved, "resolved to a stored key, skipping");
                result.skipped_known += 1;
                continue;
            }

            let record = self.schema.conform(&record, (self.clock)());
            accepted.insert(key.clone());
            accepted.insert(record.key().clone());
            result.records.push(record);
        }

        info!(
            new = result.records.len(),
            skipped = result.skipped_known,
            failed = result.failed.len(),
            "reconciliation finished"
        );

        result
    }
}
