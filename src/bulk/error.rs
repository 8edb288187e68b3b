use std::path::PathBuf;

use thiserror::Error;

use crate::aggregate::AggregateError;
use crate::pipeline::PipelineError;
use crate::store::StoreError;

/// Run-level failures. Per-address problems never surface here; they are
/// recorded in the address's result row instead.
#[derive(Debug, Error)]
pub enum BulkError {
    #[error("cannot read input {}: {source}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write {}: {source}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}
