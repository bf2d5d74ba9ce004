//! Local persistence for closed incident reports.
//!
//! Each archived report lives in its own directory under the storage root:
//!
//! ```text
//! <root>/<uuid>/
//!   report.json        # Report metadata
//!   transcript.jsonl   # The conversation, one message per line
//! ```
//!
//! The live report flow never touches disk; a session is archived in one
//! shot when it closes with something worth keeping.

use std::{fs, io, path::PathBuf};

// Traits must be in scope for `.lines()` on BufReader and `.write_all()` on File.
use io::{BufRead, Write};

use uuid::Uuid;

use crate::model::{Message, Report};

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("report not found: {0}")]
    ReportNotFound(Uuid),

    #[error("report already exists: {0}")]
    ReportAlreadyExists(Uuid),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = core::result::Result<T, StorageError>;

/// Local file-based storage for archived reports.
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Creates a new storage instance rooted at the given directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Returns the default storage root: `~/.aegis/reports/`.
    pub fn default_root() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".aegis").join("reports"))
    }

    /// Archives a closed session: metadata plus the full transcript.
    pub fn archive(&self, report: &Report, messages: &[Message]) -> Result<()> {
        let dir = self.report_dir(report.id);
        if dir.exists() {
            return Err(StorageError::ReportAlreadyExists(report.id));
        }
        fs::create_dir_all(&dir)?;

        let json = serde_json::to_string_pretty(report)?;
        fs::write(dir.join("report.json"), json)?;

        let mut file = fs::File::create(dir.join("transcript.jsonl"))?;
        for message in messages {
            let mut line = serde_json::to_string(message)?;
            line.push('\n');
            file.write_all(line.as_bytes())?;
        }
        Ok(())
    }

    /// Loads a single report's metadata.
    pub fn load_report(&self, id: Uuid) -> Result<Report> {
        let path = self.report_dir(id).join("report.json");
        if !path.exists() {
            return Err(StorageError::ReportNotFound(id));
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Loads a report's full transcript in insertion order.
    pub fn load_transcript(&self, id: Uuid) -> Result<Vec<Message>> {
        let dir = self.report_dir(id);
        let path = dir.join("transcript.jsonl");
        if !path.exists() {
            if !dir.exists() {
                return Err(StorageError::ReportNotFound(id));
            }
            return Ok(Vec::new());
        }
        let file = fs::File::open(path)?;
        let reader = io::BufReader::new(file);
        let mut messages = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if !line.is_empty() {
                messages.push(serde_json::from_str(&line)?);
            }
        }
        Ok(messages)
    }

    /// Lists all reports by reading each report directory's metadata.
    pub fn list_reports(&self) -> Result<Vec<Report>> {
        let mut reports = Vec::new();
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(reports),
            Err(e) => return Err(e.into()),
        };
        for entry in entries {
            let entry = entry?;
            let path = entry.path().join("report.json");
            if path.is_file() {
                let json = fs::read_to_string(&path)?;
                reports.push(serde_json::from_str(&json)?);
            }
        }
        reports.sort_by(|a: &Report, b: &Report| a.opened_at.cmp(&b.opened_at));
        Ok(reports)
    }

    fn report_dir(&self, id: Uuid) -> PathBuf {
        self.root.join(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::Timestamp;
    use tempfile::TempDir;

    use crate::model::MessageOrigin;

    fn test_storage() -> (TempDir, Storage) {
        let dir = TempDir::new().unwrap();
        let storage = Storage::new(dir.path().join("reports")).unwrap();
        (dir, storage)
    }

    fn sample_report() -> Report {
        Report {
            id: Uuid::new_v4(),
            opened_at: Timestamp::now(),
            closed_at: Timestamp::now(),
            message_count: 2,
        }
    }

    fn sample_messages() -> Vec<Message> {
        vec![
            Message {
                id: Uuid::new_v4(),
                origin: MessageOrigin::System,
                text: "Describe what happened.".into(),
                image: None,
                timestamp: "14:31".into(),
            },
            Message {
                id: Uuid::new_v4(),
                origin: MessageOrigin::User,
                text: "A stranger followed me from the bus stop.".into(),
                image: None,
                timestamp: "14:32".into(),
            },
        ]
    }

    #[test]
    fn archive_and_load_report() {
        let (_dir, storage) = test_storage();
        let report = sample_report();

        storage.archive(&report, &sample_messages()).unwrap();
        let loaded = storage.load_report(report.id).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.message_count, 2);
    }

    #[test]
    fn archive_duplicate_report_fails() {
        let (_dir, storage) = test_storage();
        let report = sample_report();

        storage.archive(&report, &sample_messages()).unwrap();
        let err = storage.archive(&report, &sample_messages()).unwrap_err();

        assert!(matches!(err, StorageError::ReportAlreadyExists(_)));
    }

    #[test]
    fn load_nonexistent_report_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.load_report(Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, StorageError::ReportNotFound(_)));
    }

    #[test]
    fn transcript_preserves_insertion_order() {
        let (_dir, storage) = test_storage();
        let report = sample_report();
        let messages = sample_messages();

        storage.archive(&report, &messages).unwrap();
        let loaded = storage.load_transcript(report.id).unwrap();

        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].origin, MessageOrigin::System);
        assert_eq!(loaded[1].origin, MessageOrigin::User);
        assert_eq!(loaded[1].text, messages[1].text);
    }

    #[test]
    fn load_transcript_nonexistent_report_fails() {
        let (_dir, storage) = test_storage();
        let err = storage.load_transcript(Uuid::new_v4()).unwrap_err();

        assert!(matches!(err, StorageError::ReportNotFound(_)));
    }

    #[test]
    fn list_reports_empty() {
        let (_dir, storage) = test_storage();
        let reports = storage.list_reports().unwrap();

        assert!(reports.is_empty());
    }

    #[test]
    fn list_reports_returns_all_sorted_by_opened_at() {
        let (_dir, storage) = test_storage();

        let mut r1 = sample_report();
        r1.opened_at = Timestamp::new(1_000_000_000, 0).unwrap();

        let mut r2 = sample_report();
        r2.opened_at = Timestamp::new(2_000_000_000, 0).unwrap();

        // Archive in reverse order to verify sorting.
        storage.archive(&r2, &sample_messages()).unwrap();
        storage.archive(&r1, &sample_messages()).unwrap();

        let reports = storage.list_reports().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].id, r1.id);
        assert_eq!(reports[1].id, r2.id);
    }
}
