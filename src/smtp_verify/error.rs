use std::io;

use thiserror::Error;

use crate::smtp_verify::rotation::RotationError;

#[derive(Debug, Error)]
pub enum SmtpVerifyError {
    #[error("cannot build TLS connector: {0}")]
    TlsInit(#[source] native_tls::Error),
    #[error("{host}:{port} resolves to no socket address")]
    NoAddress { host: String, port: u16 },
    #[error("cannot reach {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: io::Error,
    },
    #[error("socket error: {0}")]
    Io(#[from] io::Error),
    #[error("TLS upgrade failed: {0}")]
    Tls(#[source] native_tls::Error),
    #[error("malformed SMTP exchange: {0}")]
    Protocol(String),
    #[error("{host} answered {code} to STARTTLS")]
    StartTlsRejected { host: String, code: u16 },
    #[error("egress rotation before {host} failed: {source}")]
    Rotation {
        host: String,
        #[source]
        source: RotationError,
    },
}

impl SmtpVerifyError {
    /// Socket-level failures (timeouts, refusals, resets, EOF, handshake).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::NoAddress { .. } | Self::Connect { .. } | Self::Io(_) | Self::Tls(_)
        )
    }
}
