//! Assessment audit trail
//!
//! Append-only storage of computed assessments alongside the input that
//! produced them. Each stored row gets its id and timestamp from the store.
//! Only the instantaneous fields are kept; hourly projections are not.

use crate::error::ComputeError;
use crate::types::{AssessmentRecord, FatigueInput, FatigueResult};
use chrono::Utc;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use uuid::Uuid;

/// Default number of rows returned by [`AuditStore::recent`]
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Persistence for completed assessments
pub trait AuditStore {
    /// Append an assessment and return the stored row
    fn record(
        &mut self,
        input: &FatigueInput,
        result: &FatigueResult,
    ) -> Result<AssessmentRecord, ComputeError>;

    /// Look up one row by id
    fn get(&self, id: Uuid) -> Result<Option<AssessmentRecord>, ComputeError>;

    /// Most recent rows, newest first
    fn recent(&self, limit: usize) -> Result<Vec<AssessmentRecord>, ComputeError>;
}

impl<S: AuditStore + ?Sized> AuditStore for Box<S> {
    fn record(
        &mut self,
        input: &FatigueInput,
        result: &FatigueResult,
    ) -> Result<AssessmentRecord, ComputeError> {
        (**self).record(input, result)
    }

    fn get(&self, id: Uuid) -> Result<Option<AssessmentRecord>, ComputeError> {
        (**self).get(id)
    }

    fn recent(&self, limit: usize) -> Result<Vec<AssessmentRecord>, ComputeError> {
        (**self).recent(limit)
    }
}

/// In-process audit store
#[derive(Debug, Default)]
pub struct MemoryAuditStore {
    records: Vec<AssessmentRecord>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AuditStore for MemoryAuditStore {
    fn record(
        &mut self,
        input: &FatigueInput,
        result: &FatigueResult,
    ) -> Result<AssessmentRecord, ComputeError> {
        let record = AssessmentRecord::new(input, result, Utc::now());
        self.records.push(record.clone());
        Ok(record)
    }

    fn get(&self, id: Uuid) -> Result<Option<AssessmentRecord>, ComputeError> {
        Ok(self.records.iter().find(|r| r.id == id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<AssessmentRecord>, ComputeError> {
        Ok(newest_first(self.records.clone(), limit))
    }
}

/// Audit store backed by a newline-delimited JSON file.
///
/// One [`AssessmentRecord`] per line, appended. A missing file reads as an
/// empty log; lines that fail to parse are skipped with a warning.
#[derive(Debug, Clone)]
pub struct JsonlAuditStore {
    path: PathBuf,
}

impl JsonlAuditStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read every parseable row in file order
    pub fn load_all(&self) -> Result<Vec<AssessmentRecord>, ComputeError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(fs::File::open(&self.path)?);
        let mut records = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            match serde_json::from_str::<AssessmentRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = index + 1,
                    error = %e,
                    "skipping malformed audit record"
                ),
            }
        }

        Ok(records)
    }
}

impl AuditStore for JsonlAuditStore {
    fn record(
        &mut self,
        input: &FatigueInput,
        result: &FatigueResult,
    ) -> Result<AssessmentRecord, ComputeError> {
        let record = AssessmentRecord::new(input, result, Utc::now());
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                ComputeError::Storage(format!("cannot open {}: {e}", self.path.display()))
            })?;
        // One write per row so concurrent appenders never split a line.
        file.write_all(line.as_bytes())?;

        info!(
            id = %record.id,
            score = record.score,
            level = record.level.as_str(),
            "recorded fatigue assessment"
        );

        Ok(record)
    }

    fn get(&self, id: Uuid) -> Result<Option<AssessmentRecord>, ComputeError> {
        Ok(self.load_all()?.into_iter().find(|r| r.id == id))
    }

    fn recent(&self, limit: usize) -> Result<Vec<AssessmentRecord>, ComputeError> {
        Ok(newest_first(self.load_all()?, limit))
    }
}

/// Order by timestamp descending; rows with equal timestamps keep
/// most-recently-appended first.
fn newest_first(mut records: Vec<AssessmentRecord>, limit: usize) -> Vec<AssessmentRecord> {
    records.reverse();
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records.truncate(limit);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::FatigueScorer;
    use pretty_assertions::assert_eq;

    fn sample(last: f64, start: &str) -> (FatigueInput, FatigueResult) {
        let input = FatigueInput::parse(last, 8.0, "06:00", start).unwrap();
        let result = FatigueScorer::new().compute_score(&input);
        (input, result)
    }

    #[test]
    fn test_memory_store_record_and_get() {
        let mut store = MemoryAuditStore::new();
        let (input, result) = sample(8.0, "07:00");

        let record = store.record(&input, &result).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(record.id).unwrap(), Some(record.clone()));
        assert_eq!(store.get(Uuid::new_v4()).unwrap(), None);
        assert_eq!(record.input(), input);
        assert_eq!(record.score, result.score);
    }

    #[test]
    fn test_memory_store_recent_is_newest_first() {
        let mut store = MemoryAuditStore::new();
        let ids: Vec<Uuid> = [8.0, 6.0, 4.0]
            .into_iter()
            .map(|last| {
                let (input, result) = sample(last, "07:00");
                store.record(&input, &result).unwrap().id
            })
            .collect();

        let recent: Vec<Uuid> = store.recent(2).unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(recent, vec![ids[2], ids[1]]);

        assert_eq!(store.recent(DEFAULT_HISTORY_LIMIT).unwrap().len(), 3);
    }

    #[test]
    fn test_jsonl_store_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlAuditStore::new(dir.path().join("audit.jsonl"));

        assert!(store.recent(10).unwrap().is_empty());
        assert_eq!(store.get(Uuid::new_v4()).unwrap(), None);
    }

    #[test]
    fn test_jsonl_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("audit.jsonl");

        let mut store = JsonlAuditStore::new(&path);
        let (input, result) = sample(4.0, "02:00");
        let first = store.record(&input, &result).unwrap();
        let (input, result) = sample(8.0, "07:00");
        let second = store.record(&input, &result).unwrap();

        let reopened = JsonlAuditStore::new(&path);
        assert_eq!(reopened.get(first.id).unwrap(), Some(first.clone()));

        let recent = reopened.recent(10).unwrap();
        assert_eq!(recent, vec![second, first]);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(!content.contains("projections"));
    }

    #[test]
    fn test_jsonl_store_skips_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        let mut store = JsonlAuditStore::new(&path);
        let (input, result) = sample(6.0, "09:00");
        let record = store.record(&input, &result).unwrap();

        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        writeln!(file, "{{not json").unwrap();
        writeln!(file).unwrap();

        assert_eq!(store.load_all().unwrap(), vec![record]);
    }

    #[test]
    fn test_jsonl_store_concurrent_writers_keep_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let writers = 8;
        let per_writer = 200;

        std::thread::scope(|scope| {
            for _ in 0..writers {
                let path = &path;
                scope.spawn(move || {
                    let mut store = JsonlAuditStore::new(path);
                    let (input, result) = sample(5.5, "03:00");
                    for _ in 0..per_writer {
                        store.record(&input, &result).unwrap();
                    }
                });
            }
        });

        let store = JsonlAuditStore::new(&path);
        assert_eq!(store.load_all().unwrap().len(), writers * per_writer);
    }
}
