use thiserror::Error;

use crate::mx::Error as MxError;
use crate::smtp_verify::SmtpVerifyError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("address has no domain part: {0}")]
    MissingDomain(String),
    #[error(transparent)]
    Mx(#[from] MxError),
    #[error(transparent)]
    Smtp(#[from] SmtpVerifyError),
}
