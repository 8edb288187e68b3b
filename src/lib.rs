#![forbid(unsafe_code)]
//! Bulk e-mail address verification.
//!
//! Pipeline per address: syntax, MX, disposable, catch-all, SMTP
//! deliverability, quality score. [`BulkVerifier`] runs it over a file of
//! addresses with a bounded worker pool and an append-only, resumable CSV
//! store.

pub mod aggregate;
pub mod bulk;
pub mod cache;
pub mod disposable;
pub mod mx;
pub mod pipeline;
pub mod smtp_verify;
pub mod store;
pub mod validator;

pub use aggregate::{AggregateError, ConsolidatedLists, ListKind, RunStats, analyze};
pub use bulk::{BulkError, BulkOptions, BulkVerifier, RunSummary, clean_email_list};
pub use cache::{CacheKind, ValidationCache};
pub use disposable::{BundledLists, DisposableSource, StaticLists};
pub use mx::{Error as MxError, MxLookup, MxRecord, SystemResolver};
pub use pipeline::{PipelineError, RESULT_HEADERS, ValidationResult, Validator};
pub use smtp_verify::{
    EgressRotator, MailboxProbe, NoRotation, ProbeOptions, RotationError, SmtpProber,
    SmtpVerifyError,
};
pub use store::{ResultStore, StoreError, StoredRow};
pub use validator::{
    StrictSyntax, SyntaxCheck, SyntaxIssue, SyntaxMode, SyntaxReport, check_address,
};
