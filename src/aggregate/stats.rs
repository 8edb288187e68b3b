use std::fmt;

use serde::Serialize;

use crate::store::{ResultStore, StoredRow};

use super::AggregateError;

/// Run-wide counters computed over every row of the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunStats {
    pub total_emails: usize,
    pub valid_syntax: usize,
    pub has_mx_record: usize,
    pub not_disposable: usize,
    pub not_catchall: usize,
    pub deliverable: usize,
    pub avg_quality_score: f64,
}

impl RunStats {
    fn add(&mut self, row: &StoredRow) {
        self.total_emails += 1;
        if row.is_valid == Some(true) {
            self.valid_syntax += 1;
        }
        if row.has_mx_record == Some(true) {
            self.has_mx_record += 1;
        }
        if row.is_disposable == Some(false) {
            self.not_disposable += 1;
        }
        if row.is_catchall == Some(false) {
            self.not_catchall += 1;
        }
        if row.is_deliverable == Some(true) {
            self.deliverable += 1;
        }
        self.avg_quality_score += row.quality_score.unwrap_or(0.0);
    }

    /// Ordered (label, value) pairs, as logged at the end of a run.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        vec![
            ("total_emails", self.total_emails.to_string()),
            ("valid_syntax", self.valid_syntax.to_string()),
            ("has_mx_record", self.has_mx_record.to_string()),
            ("not_disposable", self.not_disposable.to_string()),
            ("not_catchall", self.not_catchall.to_string()),
            ("deliverable", self.deliverable.to_string()),
            ("avg_quality_score", format!("{:.4}", self.avg_quality_score)),
        ]
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.entries() {
            writeln!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}

/// Scans the whole store; the mean score is taken over all rows.
pub fn analyze(store: &ResultStore) -> Result<RunStats, AggregateError> {
    let mut stats = RunStats::default();
    for row in store.read_rows()? {
        stats.add(&row);
    }
    if stats.total_emails > 0 {
        stats.avg_quality_score /= stats.total_emails as f64;
    }
    tracing::info!("Successfully analyzed validation results");
    Ok(stats)
}
