//! Append-only CSV result store.
//!
//! The file rests read-only between appends: every [`ResultStore::append`]
//! flips it writable, appends, and flips it back.

mod error;
mod permissions;
mod row;

pub use error::StoreError;
pub use row::StoredRow;

use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::pipeline::{RESULT_HEADERS, ValidationResult};
use permissions::{set_read_only, set_writable};

#[derive(Debug, Clone)]
pub struct ResultStore {
    path: PathBuf,
}

impl ResultStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Creates the store with its header when absent and leaves it writable.
    pub fn ensure(&self) -> Result<(), StoreError> {
        self.ensure_parent()?;
        if !self.path.exists() {
            let file = File::create(&self.path).map_err(|err| self.io_err(err))?;
            let mut writer = csv::Writer::from_writer(file);
            writer
                .write_record(RESULT_HEADERS)
                .map_err(|err| self.csv_err(err))?;
            writer.flush().map_err(|err| self.io_err(err))?;
            tracing::debug!("Created result store {}", self.path.display());
        }
        set_writable(&self.path).inspect_err(|_| {
            tracing::error!(
                "Permission denied when creating/modifying {}. Please check directory permissions.",
                self.path.display()
            );
        })
    }

    /// Appends finalized results. Empty input is a no-op.
    pub fn append(&self, rows: &[ValidationResult]) -> Result<(), StoreError> {
        self.append_records(rows)
    }

    /// The store is sealed read-only again even when writing failed; the
    /// write error takes precedence over a sealing error.
    fn append_records<R: Serialize>(&self, rows: &[R]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        self.ensure_parent()?;
        if self.path.exists() {
            set_writable(&self.path)?;
        }

        let written = self.write_records(rows);
        let sealed = if self.path.exists() {
            set_read_only(&self.path).inspect_err(|_| {
                tracing::error!(
                    "Permission denied when writing to {}. Please check file permissions.",
                    self.path.display()
                );
            })
        } else {
            Ok(())
        };
        written?;
        sealed?;
        tracing::debug!("Appended {} rows to {}", rows.len(), self.path.display());
        Ok(())
    }

    fn write_records<R: Serialize>(&self, rows: &[R]) -> Result<(), StoreError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|err| self.io_err(err))?;
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        for row in rows {
            writer.serialize(row).map_err(|err| self.csv_err(err))?;
        }
        writer.flush().map_err(|err| self.io_err(err))
    }

    /// Emails already persisted. A missing store holds none.
    pub fn load_emails(&self) -> Result<HashSet<String>, StoreError> {
        Ok(self.read_rows()?.into_iter().map(|row| row.email).collect())
    }

    pub fn read_rows(&self) -> Result<Vec<StoredRow>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path).map_err(|err| self.csv_err(err))?;
        reader
            .deserialize::<StoredRow>()
            .map(|row| row.map_err(|err| self.csv_err(err)))
            .collect()
    }

    pub fn row_count(&self) -> Result<usize, StoreError> {
        Ok(self.read_rows()?.len())
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => {
                fs::create_dir_all(dir).map_err(|err| StoreError::io(dir, err))
            }
            _ => Ok(()),
        }
    }

    fn io_err(&self, err: std::io::Error) -> StoreError {
        StoreError::io(&self.path, err)
    }

    fn csv_err(&self, err: csv::Error) -> StoreError {
        StoreError::csv(&self.path, err)
    }
}
