//! Bulk coordinator: dedupes input against the store, fans validation out
//! over a bounded pool of blocking workers and persists results in batches
//! as they complete.

mod error;
mod input;
mod options;

pub use error::BulkError;
pub use input::{clean_email_list, normalize_line, read_candidates};
pub use options::{BulkOptions, DEFAULT_BATCH_SIZE, DEFAULT_WORKERS};

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc;
use std::thread;

use parking_lot::Mutex;

use crate::aggregate::{ConsolidatedLists, RunStats, analyze};
use crate::pipeline::{ValidationResult, Validator};
use crate::smtp_verify::ProbeOptions;
use crate::store::ResultStore;

/// What one call to [`BulkVerifier::run`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub scheduled: usize,
    /// Size of every append, in order.
    pub batches: Vec<usize>,
    /// `None` when there was nothing new to validate.
    pub stats: Option<RunStats>,
}

impl RunSummary {
    pub fn appended(&self) -> usize {
        self.batches.iter().sum()
    }
}

pub struct BulkVerifier {
    options: BulkOptions,
    validator: Validator,
    store: ResultStore,
    lists: ConsolidatedLists,
}

impl BulkVerifier {
    pub fn new(options: BulkOptions, validator: Validator) -> Self {
        let store = ResultStore::new(options.output.clone());
        let lists = ConsolidatedLists::new(options.data_dir.clone());
        Self {
            options,
            validator,
            store,
            lists,
        }
    }

    pub fn with_defaults(options: BulkOptions, probe: ProbeOptions) -> Result<Self, BulkError> {
        Ok(Self::new(options, Validator::with_defaults(probe)?))
    }

    pub fn options(&self) -> &BulkOptions {
        &self.options
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    pub fn lists(&self) -> &ConsolidatedLists {
        &self.lists
    }

    /// Input candidates not yet present in the store, sorted.
    pub fn pending_emails(&self) -> Result<Vec<String>, BulkError> {
        let existing = self.store.load_emails()?;
        let candidates = read_candidates(&self.options.input)?;
        Ok(candidates
            .into_iter()
            .filter(|email| !existing.contains(email))
            .collect())
    }

    pub fn run(&self) -> Result<RunSummary, BulkError> {
        self.run_with_progress(|_, _| {})
    }

    /// `on_progress(done, total)` is called on the coordinating thread after
    /// every completed address.
    pub fn run_with_progress<F>(&self, mut on_progress: F) -> Result<RunSummary, BulkError>
    where
        F: FnMut(usize, usize),
    {
        self.lists.ensure()?;
        self.store.ensure()?;
        let emails = self.pending_emails()?;

        if emails.is_empty() {
            tracing::info!("No new emails to validate");
            return Ok(RunSummary::default());
        }

        let scheduled = emails.len();
        tracing::info!("Starting validation of {scheduled} emails");
        let batches = self.process(emails, &mut on_progress)?;

        self.lists.update_from(&self.store)?;
        self.validator.reset_cache();

        let stats = analyze(&self.store)?;
        tracing::info!("Validation completed. Statistics:");
        for (key, value) in stats.entries() {
            tracing::info!("{key}: {value}");
        }

        Ok(RunSummary {
            scheduled,
            batches,
            stats: Some(stats),
        })
    }

    fn process<F>(&self, emails: Vec<String>, on_progress: &mut F) -> Result<Vec<usize>, BulkError>
    where
        F: FnMut(usize, usize),
    {
        let total = emails.len();
        let workers = self.options.workers.clamp(1, total);
        let batch_size = self.options.batch_size.max(1);
        let queue = Mutex::new(emails.into_iter());
        let validator = &self.validator;

        thread::scope(|scope| -> Result<Vec<usize>, BulkError> {
            let (tx, rx) = mpsc::channel::<ValidationResult>();
            for _ in 0..workers {
                let tx = tx.clone();
                let queue = &queue;
                scope.spawn(move || {
                    loop {
                        let next = queue.lock().next();
                        let Some(email) = next else {
                            break;
                        };
                        if tx.send(validate_guarded(validator, &email)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(tx);

            let mut batches = Vec::new();
            let mut buffer = Vec::with_capacity(batch_size);
            for (done, result) in rx.into_iter().enumerate() {
                on_progress(done + 1, total);
                buffer.push(result);
                if buffer.len() >= batch_size {
                    self.store.append(&buffer)?;
                    batches.push(buffer.len());
                    buffer.clear();
                }
            }
            if !buffer.is_empty() {
                self.store.append(&buffer)?;
                batches.push(buffer.len());
            }
            Ok(batches)
        })
    }
}

/// Per-address boundary: a panic inside the pipeline becomes a failure row.
fn validate_guarded(validator: &Validator, email: &str) -> ValidationResult {
    match panic::catch_unwind(AssertUnwindSafe(|| validator.validate(email))) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!("Error validating {email}: {message}");
            ValidationResult::failed(email, message)
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("validation panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("validation panicked: {msg}")
    } else {
        "validation panicked".to_string()
    }
}

impl std::fmt::Debug for BulkVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BulkVerifier")
            .field("options", &self.options)
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests;
