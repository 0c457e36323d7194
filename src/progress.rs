use chrono::Local;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::facts::{MAX_TABLE, MIN_TABLE};

pub const MIN_TIME_LIMIT: u8 = 5;
pub const MAX_TIME_LIMIT: u8 = 8;
pub const DEFAULT_TIME_LIMIT: u8 = 7;

/// The durable subset of session state that survives restarts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressRecord {
    pub current_learning_table: u8,
    pub time_limit: u8,
    pub current_score: u32,
    pub current_stage: u8,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            current_learning_table: MIN_TABLE,
            time_limit: DEFAULT_TIME_LIMIT,
            current_score: 0,
            current_stage: 1,
        }
    }
}

impl ProgressRecord {
    pub fn is_valid(&self) -> bool {
        (MIN_TABLE..=MAX_TABLE).contains(&self.current_learning_table)
            && (MIN_TIME_LIMIT..=MAX_TIME_LIMIT).contains(&self.time_limit)
            && (self.current_stage == 1 || self.current_stage == 2)
    }
}

pub trait ProgressStore: std::fmt::Debug {
    fn load(&self) -> ProgressRecord;
    fn save(&self, record: &ProgressRecord) -> io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileProgressStore {
    path: PathBuf,
}

impl FileProgressStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "tably") {
            pd.config_dir().join("progress.json")
        } else {
            PathBuf::from("tably_progress.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressStore for FileProgressStore {
    fn load(&self) -> ProgressRecord {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(record) = serde_json::from_slice::<ProgressRecord>(&bytes) {
                // A record with out-of-range fields gets the same treatment as
                // a corrupt file: no partial trust.
                if record.is_valid() {
                    return record;
                }
            }
        }
        ProgressRecord::default()
    }

    fn save(&self, record: &ProgressRecord) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(record).unwrap_or_default();
        fs::write(&self.path, data)
    }
}

/// One finished or stopped practice session, for the append-only log.
#[derive(Debug, Clone)]
pub struct SessionLogEntry {
    pub table: u8,
    pub stage: String,
    pub score: u32,
    pub mastered: usize,
    pub total: usize,
    pub session_correct: u32,
    pub fast_answers: u32,
}

pub fn append_session_log(entry: &SessionLogEntry) -> io::Result<()> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "tably") {
        let data_dir = proj_dirs.data_local_dir();
        let log_path = data_dir.join("sessions.csv");

        fs::create_dir_all(data_dir)?;

        // If the log doesn't exist yet, we need to emit a header
        let needs_header = !log_path.exists();

        let mut log_file = OpenOptions::new()
            .write(true)
            .append(true)
            .create(true)
            .open(log_path)?;

        if needs_header {
            writeln!(
                log_file,
                "date,table,stage,score,mastered,total,correct,fast"
            )?;
        }

        writeln!(
            log_file,
            "{},{},{},{},{},{},{},{}",
            Local::now().format("%c"),
            entry.table,
            entry.stage,
            entry.score,
            entry.mastered,
            entry.total,
            entry.session_correct,
            entry.fast_answers,
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let store = FileProgressStore::with_path(&path);
        let record = ProgressRecord::default();
        store.save(&record).unwrap();
        let loaded = store.load();
        assert_eq!(record, loaded);
    }

    #[test]
    fn save_and_load_custom_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let store = FileProgressStore::with_path(&path);
        let record = ProgressRecord {
            current_learning_table: 7,
            time_limit: 5,
            current_score: 42,
            current_stage: 2,
        };
        store.save(&record).unwrap();
        let loaded = store.load();
        assert_eq!(record, loaded);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let store = FileProgressStore::with_path(dir.path().join("nope.json"));
        assert_eq!(store.load(), ProgressRecord::default());
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        fs::write(&path, b"{ not json").unwrap();
        let store = FileProgressStore::with_path(&path);
        assert_eq!(store.load(), ProgressRecord::default());
    }

    #[test]
    fn out_of_range_fields_fall_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("progress.json");
        let bad = ProgressRecord {
            current_learning_table: 12,
            time_limit: 7,
            current_score: 10,
            current_stage: 1,
        };
        fs::write(&path, serde_json::to_vec(&bad).unwrap()).unwrap();
        let store = FileProgressStore::with_path(&path);
        // No partial trust: every field reverts, not just the bad one.
        assert_eq!(store.load(), ProgressRecord::default());
    }

    #[test]
    fn stage_outside_one_or_two_is_rejected() {
        let record = ProgressRecord {
            current_stage: 3,
            ..ProgressRecord::default()
        };
        assert!(!record.is_valid());
    }
}
