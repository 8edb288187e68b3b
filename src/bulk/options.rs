use std::path::PathBuf;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Where a bulk run reads from and writes to, and how wide it fans out.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Directory holding the consolidated list files.
    pub data_dir: PathBuf,
    pub workers: usize,
    /// Completed results buffered before each append.
    pub batch_size: usize,
}

impl Default for BulkOptions {
    fn default() -> Self {
        Self {
            input: PathBuf::from("emails.txt"),
            output: PathBuf::from("emails_validated.csv"),
            data_dir: PathBuf::from("data"),
            workers: DEFAULT_WORKERS,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}
