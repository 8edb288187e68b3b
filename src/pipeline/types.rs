use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column order of the result store.
pub const RESULT_HEADERS: [&str; 10] = [
    "email",
    "is_valid",
    "has_mx_record",
    "is_disposable",
    "is_catchall",
    "is_deliverable",
    "quality_score",
    "validation_time",
    "error",
    "validation_date",
];

/// Outcome of the gate chain for one address. Field order matches
/// [`RESULT_HEADERS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub email: String,
    pub is_valid: bool,
    pub has_mx_record: bool,
    pub is_disposable: bool,
    pub is_catchall: bool,
    pub is_deliverable: bool,
    pub quality_score: f64,
    /// Seconds spent in the pipeline.
    pub validation_time: Option<f64>,
    pub error: Option<String>,
    pub validation_date: DateTime<Utc>,
}

impl ValidationResult {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            is_valid: false,
            has_mx_record: false,
            is_disposable: false,
            is_catchall: false,
            is_deliverable: false,
            quality_score: 0.0,
            validation_time: None,
            error: None,
            validation_date: Utc::now(),
        }
    }

    /// Result for an address whose pipeline raised: every flag false, zero score.
    pub fn failed(email: impl Into<String>, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::new(email)
        }
    }

    pub fn domain(&self) -> Option<&str> {
        email_domain(&self.email)
    }
}

/// Everything after the last `@`; a quoted local part may itself contain one.
pub fn email_domain(email: &str) -> Option<&str> {
    email.rsplit_once('@').map(|(_, domain)| domain)
}

/// Accumulates the score contribution of each gate that actually ran.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct GateScore {
    passed: u8,
}

impl GateScore {
    pub(crate) const WEIGHT: f64 = 0.2;

    pub(crate) fn record(&mut self, signal: bool) {
        if signal {
            self.passed += 1;
        }
    }

    pub(crate) fn value(self) -> f64 {
        round2(f64::from(self.passed) * Self::WEIGHT)
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
