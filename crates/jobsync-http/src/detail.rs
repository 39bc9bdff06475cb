//! Detail resolver.

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use jobsync_core::error::{Error, ProtocolError};
use jobsync_core::{ApiUrl, DetailSource, NaturalKey, Record, Result, Schema, SourceConfig, codec};

use crate::client::Fetcher;

const NO_PARAMS: &[(&str, &str)] = &[];

/// Fetches full postings from the detail endpoint.
#[derive(Debug, Clone)]
pub struct HttpDetails {
    fetcher: Fetcher,
    base_url: ApiUrl,
    schema: Schema,
}

impl HttpDetails {
    /// Create a resolver normalising keys with `schema`.
    pub fn new(fetcher: Fetcher, config: &SourceConfig, schema: Schema) -> Self {
        Self {
            fetcher,
            base_url: config.base_url.clone(),
            schema,
        }
    }

    /// Fetch the posting for `key`, surfacing the failure.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn fetch(&self, key: &NaturalKey) -> Result<Record> {
        let token = codec::encode(key);
        let url = self.base_url.detail_url(&token);
        debug!(%token, "fetching detail");

        let payload = match self.fetcher.get::<_, Value>(&url, NO_PARAMS).await? {
            Value::Object(map) => map,
            other => {
                return Err(Error::from(ProtocolError::malformed(format!(
                    "expected a JSON object, got {}",
                    json_kind(&other)
                ))));
            }
        };

        let resolved = self.schema.resolve_key(&payload, key);
        if &resolved != key {
            debug!(resolved = %resolved, "payload names a different key");
        }

        Ok(Record::new(resolved, payload))
    }
}

#[async_trait]
impl DetailSource for HttpDetails {
    async fn resolve(&self, key: &NaturalKey) -> Option<Record> {
        match self.fetch(key).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(key = %key, error = %e, "detail unavailable");
                None
            }
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
