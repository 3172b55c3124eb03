//! Flat-file snapshot store.
//!
//! # Responsibility
//! - Persist the whole student sequence as one line per record.
//! - Load the sequence once at startup, skipping malformed lines.
//!
//! # Invariants
//! - Writes always replace the full file; there is no append path.
//! - Field order is `id, name, dd/mm/yyyy, phone, tax_id`; age is not stored.
//! - A missing file loads as an empty sequence.
//! - A malformed line never aborts a load or affects its neighbours.
//! - Quotes carry no meaning: fields are split on every delimiter, so a
//!   value containing a comma comes back as an extra field.

use crate::model::student::{today, Student};
use chrono::NaiveDate;
use csv::{QuoteStyle, ReaderBuilder, Trim, WriterBuilder};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::path::{Path, PathBuf};

const FIELD_DELIMITER: u8 = b',';

pub type StoreResult<T> = Result<T, StoreError>;

/// Flat-file I/O failure.
#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "flat file I/O error: {err}"),
            Self::Csv(err) => write!(f, "flat file encoding error: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<csv::Error> for StoreError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

/// Line-oriented snapshot file of the student sequence.
#[derive(Debug, Clone)]
pub struct FlatFileStore {
    path: PathBuf,
}

impl FlatFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads every well-formed record, deriving ages as of today.
    pub fn load(&self) -> StoreResult<Vec<Student>> {
        self.load_as_of(today())
    }

    /// Loads every well-formed record, deriving ages as of `today`.
    ///
    /// # Errors
    /// - Returns [`StoreError::Io`] when an existing file cannot be opened.
    ///
    /// Malformed lines (wrong field count, bad date, unreadable bytes) are
    /// logged with their line number and skipped.
    pub fn load_as_of(&self, today: NaiveDate) -> StoreResult<Vec<Student>> {
        if !self.path.exists() {
            info!(
                "event=flat_load module=store status=ok path={} records=0 reason=missing_file",
                self.path.display()
            );
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .delimiter(FIELD_DELIMITER)
            .quoting(false)
            .from_reader(file);

        let mut students = Vec::new();
        let mut skipped = 0usize;
        for (index, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    let line = err
                        .position()
                        .map_or(index as u64 + 1, |position| position.line());
                    warn!(
                        "event=flat_load_line module=store status=skipped line={} error={}",
                        line, err
                    );
                    skipped += 1;
                    continue;
                }
            };
            let line = record
                .position()
                .map_or(index as u64 + 1, |position| position.line());

            let fields: Vec<&str> = record.iter().collect();
            match Student::from_flat_fields(&fields, today) {
                Ok(student) => students.push(student),
                Err(err) => {
                    warn!(
                        "event=flat_load_line module=store status=skipped line={} error={}",
                        line, err
                    );
                    skipped += 1;
                }
            }
        }

        info!(
            "event=flat_load module=store status=ok path={} records={} skipped={}",
            self.path.display(),
            students.len(),
            skipped
        );
        Ok(students)
    }

    /// Rewrites the whole file from `students`.
    ///
    /// # Side effects
    /// - Creates the parent directory when missing.
    /// - Truncates any previous content.
    pub fn save(&self, students: &[Student]) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .delimiter(FIELD_DELIMITER)
            .quote_style(QuoteStyle::Never)
            .from_path(&self.path)?;
        for student in students {
            writer.write_record(student.to_flat_fields())?;
        }
        writer.flush()?;

        debug!(
            "event=flat_save module=store status=ok path={} records={}",
            self.path.display(),
            students.len()
        );
        Ok(())
    }
}
