//! Fixed output schema and field resolution.
//!
//! Every stored row follows a [`Schema`]: an ordered list of columns, each
//! with an ordered list of source fields to try in the payload. Resolution
//! is a pure function of the payload, so normalising a record never depends
//! on which endpoint or run produced it.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use crate::error::{Error, InvalidInputError};
use crate::types::{NaturalKey, Record};

/// Placeholder written for fields the source did not provide.
pub const EMPTY: &str = "";

/// Position of `refnr` in [`JOB_POSTING_FIELDS`].
const JOB_POSTING_KEY: usize = 20;

/// Columns of the job-posting store, each with its source-field candidates.
///
/// The listing endpoint and the detail endpoint name several fields
/// differently; the first candidate that is present wins.
const JOB_POSTING_FIELDS: &[(&str, &[&str])] = &[
    (
        "veroeffentlichungszeitraum",
        &["veroeffentlichungszeitraum", "aktuelleVeroeffentlichungsdatum"],
    ),
    ("angebotsart", &["angebotsart", "stellenangebotsart"]),
    ("arbeitgeber", &["arbeitgeber", "firma"]),
    ("branchengruppe", &["branchengruppe", "hauptberuf"]),
    ("branche", &["branche"]),
    ("arbeitgeberHashId", &["arbeitgeberHashId"]),
    ("arbeitsorte", &["arbeitsorte", "stellenlokationen"]),
    (
        "arbeitszeitmodelle",
        &["arbeitszeitmodelle", "arbeitszeitHeimarbeitTelearbeit"],
    ),
    ("befristung", &["befristung", "vertragsdauer"]),
    ("uebernahme", &["uebernahme"]),
    ("betriebsgroesse", &["betriebsgroesse"]),
    ("eintrittsdatum", &["eintrittsdatum", "eintrittszeitraum"]),
    ("ersteVeroeffentlichungsdatum", &["ersteVeroeffentlichungsdatum"]),
    ("allianzpartner", &["allianzpartner", "allianzpartnerName"]),
    ("allianzpartnerUrl", &["allianzpartnerUrl"]),
    ("titel", &["titel", "stellenangebotsTitel"]),
    ("hashId", &["hashId"]),
    ("beruf", &["beruf"]),
    (
        "modifikationsTimestamp",
        &["modifikationsTimestamp", "aenderungsdatum"],
    ),
    (
        "stellenbeschreibung",
        &["stellenbeschreibung", "stellenangebotsBeschreibung"],
    ),
    ("refnr", &["refnr", "referenznummer"]),
    (
        "fuerFluechtlingeGeeignet",
        &["fuerFluechtlingeGeeignet", "istGeringfuegigeBeschaeftigung"],
    ),
    (
        "nurFuerSchwerbehinderte",
        &["nurFuerSchwerbehinderte", "istBehinderungGefordert"],
    ),
    ("anzahlOffeneStellen", &["anzahlOffeneStellen"]),
    ("arbeitgeberAdresse", &["arbeitgeberAdresse", "arbeitsorte"]),
    ("fertigkeiten", &["fertigkeiten"]),
    ("mobilitaet", &["mobilitaet"]),
    ("fuehrungskompetenzen", &["fuehrungskompetenzen"]),
    ("verguetung", &["verguetung"]),
    ("arbeitgeberdarstellungUrl", &["arbeitgeberdarstellungUrl"]),
    ("arbeitgeberdarstellung", &["arbeitgeberdarstellung"]),
    ("hauptDkz", &["hauptDkz"]),
    ("istBetreut", &["istBetreut"]),
    ("istGoogleJobsRelevant", &["istGoogleJobsRelevant"]),
    ("anzeigeAnonym", &["anzeigeAnonym"]),
    ("scraping_date", &[]),
];

/// One output column and the payload fields it may be read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    column: String,
    sources: Vec<String>,
}

impl FieldSpec {
    /// Create a column read from the given source fields, in order.
    pub fn new<I, S>(column: impl Into<String>, sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            column: column.into(),
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }

    /// Create a column read from the payload field of the same name.
    pub fn same(column: impl Into<String>) -> Self {
        let column = column.into();
        Self {
            sources: vec![column.clone()],
            column,
        }
    }

    /// Returns the column name.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Returns the source-field candidates.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Returns the first candidate present and non-null in the payload.
    pub fn resolve<'a>(&self, payload: &'a Map<String, Value>) -> Option<&'a Value> {
        self.sources
            .iter()
            .filter_map(|source| payload.get(source))
            .find(|value| !value.is_null())
    }
}

/// The fixed, ordered schema of the record store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    key_index: usize,
    timestamp_index: usize,
    publication: Option<(String, String)>,
}

impl Schema {
    /// Create a schema.
    ///
    /// # Errors
    ///
    /// Returns an error if column names repeat, or if the key or timestamp
    /// column is not one of the schema's columns.
    pub fn new(
        fields: Vec<FieldSpec>,
        key_column: &str,
        timestamp_column: &str,
    ) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        for field in &fields {
            if !seen.insert(field.column()) {
                return Err(InvalidInputError::Other {
                    message: format!("duplicate schema column '{}'", field.column()),
                }
                .into());
            }
        }

        let position = |name: &str| {
            fields
                .iter()
                .position(|f| f.column() == name)
                .ok_or_else(|| {
                    Error::from(InvalidInputError::Other {
                        message: format!("schema has no '{}' column", name),
                    })
                })
        };

        let key_index = position(key_column)?;
        let timestamp_index = position(timestamp_column)?;

        if key_index == timestamp_index {
            return Err(InvalidInputError::Other {
                message: "key and timestamp columns must differ".to_string(),
            }
            .into());
        }

        Ok(Self {
            fields,
            key_index,
            timestamp_index,
            publication: None,
        })
    }

    /// Sort by the `start` member of a structured publication-period column.
    ///
    /// A plain string in that column is used as the start itself.
    pub fn with_publication_period(
        mut self,
        column: impl Into<String>,
        start: impl Into<String>,
    ) -> Self {
        self.publication = Some((column.into(), start.into()));
        self
    }

    /// The job-posting schema.
    pub fn job_postings() -> Self {
        let fields = JOB_POSTING_FIELDS
            .iter()
            .map(|(column, sources)| FieldSpec::new(*column, sources.iter().copied()))
            .collect();

        Self {
            fields,
            key_index: JOB_POSTING_KEY,
            timestamp_index: JOB_POSTING_FIELDS.len() - 1,
            publication: Some(("veroeffentlichungszeitraum".to_string(), "von".to_string())),
        }
    }

    /// Returns the column specs in output order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Returns the column names in output order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(FieldSpec::column)
    }

    /// Returns the natural-key column name.
    pub fn key_column(&self) -> &str {
        self.fields[self.key_index].column()
    }

    /// Returns the ingestion-timestamp column name.
    pub fn timestamp_column(&self) -> &str {
        self.fields[self.timestamp_index].column()
    }

    /// Resolve the natural key of a detail payload.
    ///
    /// Tries the key column's sources in order and falls back to the key the
    /// payload was requested by, so the result is always usable.
    pub fn resolve_key(&self, payload: &Map<String, Value>, requested: &NaturalKey) -> NaturalKey {
        self.fields[self.key_index]
            .sources()
            .iter()
            .filter_map(|source| payload.get(source))
            .filter_map(scalar_text)
            .find_map(|text| NaturalKey::new(text).ok())
            .unwrap_or_else(|| requested.clone())
    }

    /// Conform a resolved record to the schema and stamp its ingestion time.
    ///
    /// The output carries exactly the schema's columns. Columns with no
    /// source value hold [`EMPTY`].
    pub fn conform(&self, record: &Record, ingested_at: DateTime<Utc>) -> Record {
        let payload = record.fields();
        let mut fields = Map::with_capacity(self.fields.len());

        for (index, spec) in self.fields.iter().enumerate() {
            let value = if index == self.key_index {
                Value::String(record.key().to_string())
            } else if index == self.timestamp_index {
                Value::String(format_timestamp(ingested_at))
            } else {
                spec.resolve(payload)
                    .cloned()
                    .unwrap_or_else(|| Value::String(EMPTY.to_string()))
            };
            fields.insert(spec.column().to_string(), value);
        }

        Record::ingested(record.key().clone(), ingested_at, fields)
    }

    /// The value new records are ordered by, newest first.
    ///
    /// The publication-period start if present, else the ingestion timestamp.
    /// Keys compare as text: ISO 8601 dates and timestamps order
    /// chronologically, and non-negative integers are zero-padded so they
    /// order numerically.
    pub fn sort_key(&self, record: &Record) -> String {
        if let Some((column, start)) = &self.publication {
            let value = match record.get(column) {
                Some(Value::Object(period)) => period.get(start).and_then(sort_text),
                Some(other) => sort_text(other),
                None => None,
            };
            if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
                return value;
            }
        }

        record
            .ingested_at()
            .map(format_timestamp)
            .unwrap_or_default()
    }

    /// Render the record as one row of cells in column order.
    pub fn row(&self, record: &Record) -> Vec<String> {
        self.columns()
            .map(|column| record.get(column).map(render_cell).unwrap_or_default())
            .collect()
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::job_postings()
    }
}

/// Format an ingestion timestamp the way it is stored.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Render a field value as a table cell.
///
/// Strings are written verbatim, null becomes empty, nested values are
/// written as compact JSON.
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Text of a string or number value, as used for keys and sort values.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn sort_text(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => match n.as_u64() {
            Some(n) => Some(format!("{:020}", n)),
            None => Some(n.to_string()),
        },
        other => scalar_text(other),
    }
}
