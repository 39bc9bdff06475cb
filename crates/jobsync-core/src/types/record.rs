//! Job-posting record type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::NaturalKey;

/// One job posting.
///
/// A record always carries its natural key. The ingestion timestamp is set
/// once the record has been accepted by the reconciler; records straight
/// from the detail endpoint carry the raw payload and no timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    key: NaturalKey,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ingested_at: Option<DateTime<Utc>>,
    fields: Map<String, Value>,
}

impl Record {
    /// Create a record from a source payload.
    pub fn new(key: NaturalKey, fields: Map<String, Value>) -> Self {
        Self {
            key,
            ingested_at: None,
            fields,
        }
    }

    /// Create an ingested record.
    pub(crate) fn ingested(
        key: NaturalKey,
        ingested_at: DateTime<Utc>,
        fields: Map<String, Value>,
    ) -> Self {
        Self {
            key,
            ingested_at: Some(ingested_at),
            fields,
        }
    }

    /// Returns the natural key.
    pub fn key(&self) -> &NaturalKey {
        &self.key
    }

    /// Returns the ingestion timestamp, if the record has been ingested.
    pub fn ingested_at(&self) -> Option<DateTime<Utc>> {
        self.ingested_at
    }

    /// Returns the value of a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Returns all fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Consume the record, returning its fields.
    pub fn into_fields(self) -> Map<String, Value> {
        self.fields
    }
}
