//! SMTP mailbox probing.
//!
//! [`SmtpProber`] resolves the MX hosts of a domain, then tries every
//! host:port combination in order until one server completes an
//! `EHLO`/`VRFY` dialogue. Only positive answers are memoized.

mod error;
#[cfg(test)]
pub(crate) mod mock;
mod options;
mod probe;
mod rotation;
mod session;
mod util;

pub use error::SmtpVerifyError;
pub use options::{DEFAULT_PORTS, ProbeOptions};
pub use probe::{ACCEPTED_CODES, MailboxProbe, SmtpProber};
pub use rotation::{EgressRotator, NoRotation, RotationError};
pub use session::SmtpReply;
pub use util::catchall_probe_address;
