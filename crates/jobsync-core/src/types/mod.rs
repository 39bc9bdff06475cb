//! Core jobsync types.
//!
//! These types enforce their invariants at construction time.

mod api_key;
mod api_url;
mod natural_key;
mod record;

pub use api_key::ApiKey;
pub use api_url::ApiUrl;
pub use natural_key::NaturalKey;
pub use record::Record;
