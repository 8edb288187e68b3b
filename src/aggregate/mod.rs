//! Post-run consolidation: domain/email list files and run statistics, both
//! rebuilt from the full result store rather than from the rows just added.

mod error;
mod stats;

pub use error::AggregateError;
pub use stats::{RunStats, analyze};

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::store::ResultStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    ValidDomains,
    CatchallDomains,
    NotCatchallDomains,
    VerifiedEmails,
}

impl ListKind {
    pub const ALL: [ListKind; 4] = [
        ListKind::ValidDomains,
        ListKind::CatchallDomains,
        ListKind::NotCatchallDomains,
        ListKind::VerifiedEmails,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Self::ValidDomains => "valid_domains.txt",
            Self::CatchallDomains => "catchall_domains.txt",
            Self::NotCatchallDomains => "not_catchall_domains.txt",
            Self::VerifiedEmails => "verified_emails.txt",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// The four line-delimited list files under one data directory.
#[derive(Debug, Clone)]
pub struct ConsolidatedLists {
    dir: PathBuf,
}

impl ConsolidatedLists {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, kind: ListKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Creates the data directory and any missing (empty) list file.
    pub fn ensure(&self) -> Result<(), AggregateError> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|err| AggregateError::io(&self.dir, err))?;
            tracing::info!("Created directory: {}", self.dir.display());
        }
        for kind in ListKind::ALL {
            let path = self.path(kind);
            if !path.exists() {
                fs::File::create(&path).map_err(|err| AggregateError::io(&path, err))?;
                tracing::info!("Created file: {}", kind.file_name());
            }
        }
        Ok(())
    }

    /// Current entries of one list; a missing file is an empty list.
    pub fn read(&self, kind: ListKind) -> Result<BTreeSet<String>, AggregateError> {
        let path = self.path(kind);
        if !path.exists() {
            return Ok(BTreeSet::new());
        }
        let content = fs::read_to_string(&path).map_err(|err| AggregateError::io(&path, err))?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Merges the classification of every store row into the existing lists
    /// and rewrites each file sorted and deduplicated. Lists only grow.
    pub fn update_from(&self, store: &ResultStore) -> Result<(), AggregateError> {
        let mut sets: [BTreeSet<String>; 4] = Default::default();
        for kind in ListKind::ALL {
            sets[kind.index()] = self.read(kind)?;
        }

        for row in store.read_rows()? {
            let Some(domain) = row.domain() else {
                continue;
            };
            if row.has_mx_record == Some(true) {
                sets[ListKind::ValidDomains.index()].insert(domain.to_string());
            }
            match row.is_catchall {
                Some(true) => {
                    sets[ListKind::CatchallDomains.index()].insert(domain.to_string());
                }
                Some(false) => {
                    sets[ListKind::NotCatchallDomains.index()].insert(domain.to_string());
                }
                None => {}
            }
            if row.is_deliverable == Some(true) {
                sets[ListKind::VerifiedEmails.index()].insert(row.email.clone());
            }
        }

        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(|err| AggregateError::io(&self.dir, err))?;
        }
        for kind in ListKind::ALL {
            self.write(kind, &sets[kind.index()])?;
        }
        tracing::info!("Successfully updated domain and email lists");
        Ok(())
    }

    fn write(&self, kind: ListKind, entries: &BTreeSet<String>) -> Result<(), AggregateError> {
        let path = self.path(kind);
        let mut buf = Vec::new();
        for entry in entries {
            buf.extend_from_slice(entry.as_bytes());
            buf.push(b'\n');
        }
        let mut file = fs::File::create(&path).map_err(|err| AggregateError::io(&path, err))?;
        file.write_all(&buf)
            .map_err(|err| AggregateError::io(&path, err))
    }
}
