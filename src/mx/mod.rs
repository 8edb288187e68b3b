//! DNS MX resolution seam.
//!
//! [`MxLookup`] is the only thing the rest of the crate knows about DNS;
//! [`SystemResolver`] is the production implementation.

mod error;
mod resolver;
mod types;

pub use error::MxError as Error;
pub use resolver::{MxLookup, SystemResolver};
pub use types::{MxRecord, exchange_hosts};
