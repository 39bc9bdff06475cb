//! jobsync-core - Core types, traits and reconciliation for jobsync.
//!
//! jobsync incrementally harvests job postings from a paginated REST API
//! into an append-only table. This crate holds everything that does not
//! depend on a particular transport or file format.
//!
//! # Example
//!
//! ```
//! use std::collections::HashSet;
//! use jobsync_core::{NaturalKey, codec};
//!
//! let key = NaturalKey::new(" 10000-1191563787-S ").unwrap();
//! assert_eq!(codec::encode(&key), "MTAwMDAtMTE5MTU2Mzc4Ny1T");
//!
//! let known: HashSet<_> = [key.clone()].into_iter().collect();
//! assert!(known.contains(&NaturalKey::new("10000-1191563787-S").unwrap()));
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod retry;
pub mod schema;
pub mod sync;
pub mod traits;
pub mod types;

pub use config::{ListingQuery, SourceConfig, StoreConfig};
pub use error::Error;
pub use reconcile::{Reconciler, Reconciliation, ScanPolicy};
pub use retry::RetryPolicy;
pub use schema::{FieldSpec, Schema};
pub use sync::RunSummary;
pub use traits::{CommitSummary, DetailSource, ListingSource, RecordStore};
pub use types::{ApiKey, ApiUrl, NaturalKey, Record};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
