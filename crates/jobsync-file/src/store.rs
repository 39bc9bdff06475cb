//! CSV record store.
//!
//! ## Layout
//!
//! ```text
//! job_details.csv               header row + one row per posting, append-only
//! job_details.csv.lock          advisory run lock
//! job_details_backups/
//! └── job_details_<UTC YYYYmmdd-HHMMSS>[-n].csv
//! ```

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument};

use jobsync_core::error::{Error, StoreError};
use jobsync_core::{
    CommitSummary, NaturalKey, Record, RecordStore, Result, Schema, StoreConfig,
};

use crate::lock::StoreLock;

fn map_io(path: &Path) -> impl FnOnce(io::Error) -> Error + '_ {
    move |err| {
        StoreError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
        .into()
    }
}

fn map_csv(path: &Path) -> impl FnOnce(csv::Error) -> Error + '_ {
    move |err| {
        StoreError::Csv {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
        .into()
    }
}

/// Append-only CSV store with per-commit backups.
#[derive(Debug, Clone)]
pub struct CsvStore {
    config: StoreConfig,
    schema: Schema,
    clock: fn() -> DateTime<Utc>,
}

impl CsvStore {
    /// Create a store over the configured file and backup directory.
    pub fn new(config: StoreConfig, schema: Schema) -> Self {
        Self {
            config,
            schema,
            clock: Utc::now,
        }
    }

    /// Use a different clock for snapshot names.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Returns the store file path.
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Returns the schema rows are written with.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Take the run lock for this store.
    pub fn lock(&self) -> Result<StoreLock> {
        StoreLock::acquire(&self.config.path)
    }

    /// Count data rows in the store. A missing store has zero rows.
    pub fn row_count(&self) -> Result<usize> {
        let path = self.path();
        if !path.exists() {
            return Ok(0);
        }

        let mut reader = self.reader()?;
        let mut count = 0;
        for row in reader.records() {
            row.map_err(map_csv(path))?;
            count += 1;
        }
        Ok(count)
    }

    fn reader(&self) -> Result<csv::Reader<File>> {
        let path = self.path();
        let file = File::open(path).map_err(map_io(path))?;
        Ok(csv::ReaderBuilder::new().flexible(true).from_reader(file))
    }

    /// Copy the current store into a new snapshot.
    ///
    /// Returns `None` if there is no store to back up. Snapshots are created
    /// with create-new semantics; an existing name gets a numeric suffix.
    #[instrument(skip(self))]
    fn backup(&self) -> Result<Option<PathBuf>> {
        let source = self.path();
        if !source.exists() {
            return Ok(None);
        }

        let dir = &self.config.backup_dir;
        fs::create_dir_all(dir).map_err(map_io(dir))?;

        let base = format!(
            "{}_{}",
            self.config.backup_stem(),
            (self.clock)().format("%Y%m%d-%H%M%S")
        );

        let mut suffix = 0u32;
        let (target, mut file) = loop {
            let name = if suffix == 0 {
                format!("{}.csv", base)
            } else {
                format!("{}-{}.csv", base, suffix)
            };
            let candidate = dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(file) => break (candidate, file),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => suffix += 1,
                Err(e) => return Err(map_io(&candidate)(e)),
            }
        };

        let mut original = File::open(source).map_err(map_io(source))?;
        io::copy(&mut original, &mut file).map_err(map_io(&target))?;
        file.sync_all().map_err(map_io(&target))?;

        info!(backup = %target.display(), "store backed up");
        Ok(Some(target))
    }

    /// Verify that an existing, non-empty store has the schema's header.
    fn check_header(&self) -> Result<()> {
        let path = self.path();
        let mut reader = self.reader()?;
        let headers = reader.headers().map_err(map_csv(path))?;

        if !headers.iter().map(str::trim).eq(self.schema.columns()) {
            return Err(StoreError::SchemaMismatch {
                path: path.to_path_buf(),
            }
            .into());
        }
        Ok(())
    }
}

impl RecordStore for CsvStore {
    #[instrument(skip(self), fields(path = %self.path().display()))]
    fn load_known_keys(&self) -> Result<HashSet<NaturalKey>> {
        let path = self.path();
        if !path.exists() {
            debug!("no store yet, first run");
            return Ok(HashSet::new());
        }

        let mut reader = self.reader()?;
        let headers = reader.headers().map_err(map_csv(path))?.clone();
        if headers.is_empty() {
            return Ok(HashSet::new());
        }

        let column = self.schema.key_column();
        let index = headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| StoreError::MissingKeyColumn {
                path: path.to_path_buf(),
                column: column.to_string(),
            })?;

        let mut keys = HashSet::new();
        for row in reader.records() {
            let row = row.map_err(map_csv(path))?;
            if let Some(key) = row.get(index).and_then(|raw| NaturalKey::new(raw).ok()) {
                keys.insert(key);
            }
        }

        debug!(keys = keys.len(), "loaded stored keys");
        Ok(keys)
    }

    #[instrument(skip(self, records), fields(path = %self.path().display(), new = records.len()))]
    fn commit(&self, mut records: Vec<Record>) -> Result<CommitSummary> {
        if records.is_empty() {
            info!("no new records");
            return Ok(CommitSummary::default());
        }

        let path = self.path();
        let existing_len = match fs::metadata(path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(e) => return Err(map_io(path)(e)),
        };
        if existing_len > 0 {
            self.check_header()?;
        }

        let backup = self.backup()?;

        records.sort_by_cached_key(|record| std::cmp::Reverse(self.schema.sort_key(record)));

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(map_io(parent))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(map_io(path))?;

        if existing_len > 0 && !ends_with_newline(path)? {
            debug!("store does not end with a line break, terminating last row");
            file.write_all(b"\n").map_err(map_io(path))?;
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if existing_len == 0 {
            writer
                .write_record(self.schema.columns())
                .map_err(map_csv(path))?;
        }

        for record in &records {
            writer
                .write_record(self.schema.row(record))
                .map_err(map_csv(path))?;
        }

        let file = writer
            .into_inner()
            .map_err(|e| map_io(path)(e.into_error()))?;
        file.sync_data().map_err(map_io(path))?;

        info!(appended = records.len(), "records appended");

        Ok(CommitSummary {
            appended: records.len(),
            backup,
        })
    }
}

/// Whether the last byte of a non-empty file is a line feed.
fn ends_with_newline(path: &Path) -> Result<bool> {
    let mut file = File::open(path).map_err(map_io(path))?;
    file.seek(SeekFrom::End(-1)).map_err(map_io(path))?;
    let mut last = [0u8; 1];
    file.read_exact(&mut last).map_err(map_io(path))?;
    Ok(last[0] == b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::{Map, Value, json};
    use tempfile::TempDir;

    fn fixed_clock() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 19, 7, 30, 0).unwrap()
    }

    fn create_test_store() -> (TempDir, CsvStore) {
        let tmp = TempDir::new().unwrap();
        let config = StoreConfig::new(
            tmp.path().join("job_details.csv"),
            tmp.path().join("job_details_backups"),
        );
        let store = CsvStore::new(config, Schema::job_postings()).with_clock(fixed_clock);
        (tmp, store)
    }

    fn record(key: &str, period_start: Option<&str>, title: &str) -> Record {
        let mut payload = Map::new();
        payload.insert("refnr".to_string(), json!(key));
        payload.insert("titel".to_string(), json!(title));
        if let Some(start) = period_start {
            payload.insert(
                "veroeffentlichungszeitraum".to_string(),
                json!({"von": start}),
            );
        }
        let raw = Record::new(NaturalKey::new(key).unwrap(), payload);
        Schema::job_postings().conform(&raw, fixed_clock())
    }

    fn stored_keys(store: &CsvStore) -> Vec<String> {
        let mut reader = csv::Reader::from_path(store.path()).unwrap();
        let index = reader
            .headers()
            .unwrap()
            .iter()
            .position(|h| h == "refnr")
            .unwrap();
        reader
            .records()
            .map(|r| r.unwrap().get(index).unwrap().to_string())
            .collect()
    }

    #[test]
    fn missing_store_has_no_keys() {
        let (_tmp, store) = create_test_store();
        assert!(store.load_known_keys().unwrap().is_empty());
        assert_eq!(store.row_count().unwrap(), 0);
    }

    #[test]
    fn empty_commit_is_a_no_op() {
        let (_tmp, store) = create_test_store();
        let summary = store.commit(Vec::new()).unwrap();
        assert_eq!(summary, CommitSummary::default());
        assert!(!store.path().exists());
    }

    #[test]
    fn first_commit_writes_header_and_takes_no_backup() {
        let (_tmp, store) = create_test_store();

        let summary = store
            .commit(vec![record("K1", Some("2025-10-01"), "a")])
            .unwrap();

        assert_eq!(summary.appended, 1);
        assert!(summary.backup.is_none());

        let content = fs::read_to_string(store.path()).unwrap();
        let header = content.lines().next().unwrap();
        assert!(header.starts_with("veroeffentlichungszeitraum,angebotsart,"));
        assert!(header.ends_with(",scraping_date"));
        assert_eq!(store.row_count().unwrap(), 1);
    }

    #[test]
    fn load_trims_stored_keys() {
        let (_tmp, store) = create_test_store();
        let header: Vec<&str> = store.schema().columns().collect();
        let mut content = header.join(",");
        content.push('\n');
        let mut row = vec![""; header.len()];
        row[20] = "  K7 ";
        content.push_str(&row.join(","));
        content.push('\n');
        fs::write(store.path(), content).unwrap();

        let keys = store.load_known_keys().unwrap();
        assert!(keys.contains(&NaturalKey::new("K7").unwrap()));
        assert_eq!(keys.len(), 1);
    }

    #[test]
    fn load_requires_key_column() {
        let (_tmp, store) = create_test_store();
        fs::write(store.path(), "id,title\n1,x\n").unwrap();

        let result = store.load_known_keys();
        assert!(matches!(
            result,
            Err(Error::Store(StoreError::MissingKeyColumn { .. }))
        ));
    }

    #[test]
    fn header_with_alternate_field_names_is_rejected() {
        let (_tmp, store) = create_test_store();
        fs::write(
            store.path(),
            "stellenangebotsart,firma,referenznummer,scraping_date\n1,ACME,K1,2025-01-01\n",
        )
        .unwrap();

        assert!(matches!(
            store.load_known_keys(),
            Err(Error::Store(StoreError::MissingKeyColumn { .. }))
        ));
    }

    #[test]
    fn backup_precedes_append() {
        let (_tmp, store) = create_test_store();
        store
            .commit(vec![record("K1", None, "a"), record("K2", None, "b")])
            .unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let summary = store
            .commit(vec![
                record("K3", None, "c"),
                record("K4", None, "d"),
                record("K5", None, "e"),
            ])
            .unwrap();

        let backup = summary.backup.unwrap();
        assert_eq!(
            backup.file_name().unwrap().to_str().unwrap(),
            "job_details_20251019-073000.csv"
        );
        assert_eq!(fs::read_to_string(&backup).unwrap(), before);

        let backup_store = CsvStore::new(
            StoreConfig::new(&backup, "unused"),
            Schema::job_postings(),
        );
        assert_eq!(backup_store.row_count().unwrap(), 2);
        assert_eq!(store.row_count().unwrap(), 5);

        let content = fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.matches("refnr").count(), 1, "header written once");
    }

    #[test]
    fn backups_are_never_overwritten() {
        let (tmp, store) = create_test_store();
        store.commit(vec![record("K1", None, "a")]).unwrap();

        let first = store.commit(vec![record("K2", None, "b")]).unwrap().backup.unwrap();
        let second = store.commit(vec![record("K3", None, "c")]).unwrap().backup.unwrap();

        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap().to_str().unwrap(),
            "job_details_20251019-073000-1.csv"
        );
        let backups = fs::read_dir(tmp.path().join("job_details_backups"))
            .unwrap()
            .count();
        assert_eq!(backups, 2);
        assert_eq!(
            CsvStore::new(StoreConfig::new(&first, "x"), Schema::job_postings())
                .row_count()
                .unwrap(),
            1
        );
    }

    #[test]
    fn rows_are_written_newest_first() {
        let (_tmp, store) = create_test_store();

        store
            .commit(vec![
                record("MID", Some("2025-10-10"), "m"),
                record("OLD", Some("2025-09-01"), "o"),
                record("NEW", Some("2025-10-18"), "n"),
            ])
            .unwrap();

        assert_eq!(stored_keys(&store), vec!["NEW", "MID", "OLD"]);
    }

    #[test]
    fn stored_keys_round_trip_through_load() {
        let (_tmp, store) = create_test_store();
        store
            .commit(vec![record("K1", None, "a"), record("K2", None, "b")])
            .unwrap();

        let keys = store.load_known_keys().unwrap();
        let expected: HashSet<_> = ["K1", "K2"]
            .iter()
            .map(|k| NaturalKey::new(k).unwrap())
            .collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn cells_with_delimiters_are_quoted() {
        let (_tmp, store) = create_test_store();
        store
            .commit(vec![record("K1", None, "Analyst, \"Senior\"\nBerlin")])
            .unwrap();

        let mut reader = csv::Reader::from_path(store.path()).unwrap();
        let index = reader
            .headers()
            .unwrap()
            .iter()
            .position(|h| h == "titel")
            .unwrap();
        let row = reader.records().next().unwrap().unwrap();
        assert_eq!(row.get(index), Some("Analyst, \"Senior\"\nBerlin"));
    }

    #[test]
    fn nested_values_are_written_as_json() {
        let (_tmp, store) = create_test_store();
        store
            .commit(vec![record("K1", Some("2025-10-01"), "a")])
            .unwrap();

        let mut reader = csv::Reader::from_path(store.path()).unwrap();
        let row = reader.records().next().unwrap().unwrap();
        let period: Value = serde_json::from_str(row.get(0).unwrap()).unwrap();
        assert_eq!(period, json!({"von": "2025-10-01"}));
    }

    #[test]
    fn append_after_unterminated_last_row_starts_a_new_row() {
        let (_tmp, store) = create_test_store();
        store.commit(vec![record("K1", None, "a")]).unwrap();

        let content = fs::read_to_string(store.path()).unwrap();
        fs::write(store.path(), content.trim_end_matches('\n')).unwrap();

        store.commit(vec![record("K2", None, "b")]).unwrap();

        assert_eq!(store.row_count().unwrap(), 2);
        assert_eq!(stored_keys(&store), vec!["K1", "K2"]);
        let keys = store.load_known_keys().unwrap();
        assert!(keys.contains(&NaturalKey::new("K2").unwrap()));
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn padded_header_cells_are_accepted() {
        let (_tmp, store) = create_test_store();
        let header: Vec<String> = store
            .schema()
            .columns()
            .map(|c| format!(" {} ", c))
            .collect();
        fs::write(store.path(), format!("{}\n", header.join(","))).unwrap();

        assert!(store.load_known_keys().unwrap().is_empty());
        let summary = store.commit(vec![record("K1", None, "a")]).unwrap();
        assert_eq!(summary.appended, 1);
        assert!(store.load_known_keys().unwrap().contains(&NaturalKey::new("K1").unwrap()));
    }

    #[test]
    fn refuses_store_with_foreign_header() {
        let (_tmp, store) = create_test_store();
        fs::write(store.path(), "refnr,titel\nK1,a\n").unwrap();

        let result = store.commit(vec![record("K2", None, "b")]);
        assert!(matches!(
            result,
            Err(Error::Store(StoreError::SchemaMismatch { .. }))
        ));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), "refnr,titel\nK1,a\n");
    }
}
