use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Local;
use scrape_core::{mark_first_pending, parse_entry, render_checklist, ChecklistEntry, EntryParseError};
use scrape_logging::{scrape_debug, scrape_info, scrape_warn};
use thiserror::Error;

use crate::persist::{write_atomic, PersistError};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("checklist file not found: {0}")]
    Missing(PathBuf),
    #[error("failed to read checklist {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to write checklist {path}: {source}")]
    Write { path: PathBuf, source: PersistError },
    #[error("checklist {path} line {line_no}: {source}")]
    Malformed {
        path: PathBuf,
        line_no: usize,
        source: EntryParseError,
    },
}

impl LedgerError {
    /// Numeric classification carried in the `error_code` log field.
    pub fn code(&self) -> u16 {
        match self {
            LedgerError::Missing(_) => 5004,
            _ => 5002,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    Marked,
    /// No pending line for the URL; the file was left untouched.
    NotPending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerSummary {
    pub pending: usize,
    pub done: usize,
}

/// Durable per-URL completion record.
///
/// Every operation is a whole-file read-modify-write under one lock, so
/// concurrent `mark_done` calls from different workers never interleave.
#[derive(Debug)]
pub struct ChecklistLedger {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ChecklistLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the header and one pending line per URL, replacing any existing
    /// file.
    pub fn initialize(&self, base_name: &str, urls: &[String]) -> Result<(), LedgerError> {
        let _guard = self.guard();
        let filepath = self.path.display().to_string();
        scrape_info!(filepath = filepath.as_str(); "Generating checklist file: {}", filepath);
        let content = render_checklist(base_name, urls);
        self.write(&content)
    }

    /// Mark the first pending entry for `url` as done with a millisecond
    /// timestamp.
    pub fn mark_done(&self, url: &str) -> Result<MarkOutcome, LedgerError> {
        let _guard = self.guard();
        scrape_debug!(url = url; "Acquired checklist lock for {}", url);
        let content = self.read()?;
        let processed_at = Local::now().format(TIMESTAMP_FORMAT).to_string();
        match mark_first_pending(&content, url, &processed_at) {
            Some(updated) => {
                self.write(&updated)?;
                scrape_info!(url = url; "Marked URL as done in checklist: {}", url);
                Ok(MarkOutcome::Marked)
            }
            None => {
                scrape_warn!(url = url; "URL not found in checklist or already marked: {}", url);
                Ok(MarkOutcome::NotPending)
            }
        }
    }

    /// Count pending and done entries. Any malformed entry line is an error.
    pub fn summary(&self) -> Result<LedgerSummary, LedgerError> {
        let content = {
            let _guard = self.guard();
            self.read()?
        };
        let mut summary = LedgerSummary::default();
        for (idx, line) in content.lines().enumerate() {
            match parse_entry(line) {
                Ok(Some(ChecklistEntry::Pending { .. })) => summary.pending += 1,
                Ok(Some(ChecklistEntry::Done { .. })) => summary.done += 1,
                Ok(None) => {}
                Err(source) => {
                    return Err(LedgerError::Malformed {
                        path: self.path.clone(),
                        line_no: idx + 1,
                        source,
                    })
                }
            }
        }
        Ok(summary)
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        // The guarded data is `()`; a panic elsewhere cannot leave it inconsistent.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn read(&self) -> Result<String, LedgerError> {
        fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LedgerError::Missing(self.path.clone())
            } else {
                LedgerError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })
    }

    fn write(&self, content: &str) -> Result<(), LedgerError> {
        write_atomic(&self.path, content).map_err(|source| LedgerError::Write {
            path: self.path.clone(),
            source,
        })
    }
}
