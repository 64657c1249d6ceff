//! Append-only JSON-lines audit trail.

use crate::event::AuditRecord;
use crate::store::{AuditStore, StoreError};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Secondary audit trail: one JSON object per line, keys sorted.
///
/// The file is opened in append mode for every record, so rotating or
/// truncating it externally is safe.
#[derive(Debug)]
pub struct JsonLinesStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonLinesStore {
    /// Creates a store appending to `path`. The file is created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Returns the trail location.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditStore for JsonLinesStore {
    fn append(&self, record: &AuditRecord) -> Result<(), StoreError> {
        let mut line = serde_json::to_string(&record.trail_entry())?;
        line.push('\n');

        let _guard = self.write_lock.lock();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(line.as_bytes())?;
        Ok(())
    }

    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "json_lines"
    }
}
