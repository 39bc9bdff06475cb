//! jobsync-file - CSV-backed record store.

mod lock;
mod store;

pub use lock::StoreLock;
pub use store::CsvStore;
