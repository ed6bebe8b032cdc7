//! Append-only CSV journal with duplicate suppression.

use crate::record::{LogRecord, HEADER};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tickwatch_core::PriceSample;
use tracing::debug;

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// What an append call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Row written to the file
    Written,
    /// Same date and time already journaled, nothing written
    Skipped,
}

/// CSV journal at a fixed path.
///
/// The file is opened for append and closed again on every write, so
/// rows survive a crash and the file stays readable between polls.
pub struct DataJournal {
    path: PathBuf,
}

impl DataJournal {
    /// Create a journal handle. The file itself appears on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one sample, writing the header first when the file is new.
    ///
    /// When a row with the same date and time string is already on disk
    /// the append is a no-op reported as `Skipped`.
    pub fn append(
        &self,
        sample: &PriceSample,
        previous_close: Option<f64>,
    ) -> Result<AppendOutcome, JournalError> {
        let record = LogRecord::from_sample(sample, previous_close);

        if self.contains(&record.date, &record.time)? {
            debug!(
                date = %record.date,
                time = %record.time,
                "Sample already journaled, skipping"
            );
            return Ok(AppendOutcome::Skipped);
        }

        let is_new = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if is_new {
            writeln!(file, "{}", HEADER)?;
        }
        writeln!(file, "{}", record.to_line())?;

        Ok(AppendOutcome::Written)
    }

    /// All rows recorded on the given date.
    pub fn records_for_date(&self, date: &str) -> Result<Vec<LogRecord>, JournalError> {
        Ok(self
            .records()?
            .into_iter()
            .filter(|record| record.date == date)
            .collect())
    }

    /// The most recent row, if any.
    pub fn latest(&self) -> Result<Option<LogRecord>, JournalError> {
        Ok(self.records()?.pop())
    }

    fn contains(&self, date: &str, time: &str) -> Result<bool, JournalError> {
        Ok(self
            .records_for_date(date)?
            .iter()
            .any(|record| record.time == time))
    }

    /// Every parseable row, oldest first. Malformed lines are ignored.
    fn records(&self) -> Result<Vec<LogRecord>, JournalError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(contents.lines().filter_map(LogRecord::parse_line).collect())
    }
}
