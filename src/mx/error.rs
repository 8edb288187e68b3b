use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

/// Why an MX lookup produced no answer at all. "No MX published" is not an
/// error: it is an empty record list.
#[derive(Debug, Error)]
pub enum MxError {
    #[error("domain is empty")]
    EmptyDomain,
    #[error("domain '{domain}' is not IDNA-convertible")]
    InvalidDomain {
        domain: String,
        #[source]
        source: idna::Errors,
    },
    #[error("system resolver configuration unreadable: {0}")]
    ResolverSetup(#[source] std::io::Error),
    #[error("MX lookup for '{domain}' failed: {source}")]
    Lookup {
        domain: String,
        #[source]
        source: ResolveError,
    },
    /// Failure reported by a non-DNS implementation of the lookup seam.
    #[error("MX lookup unavailable: {0}")]
    Unavailable(String),
}

impl MxError {
    pub(crate) fn invalid_domain(domain: &str, source: idna::Errors) -> Self {
        Self::InvalidDomain {
            domain: domain.to_string(),
            source,
        }
    }

    pub(crate) fn lookup(domain: &str, source: ResolveError) -> Self {
        Self::Lookup {
            domain: domain.to_string(),
            source,
        }
    }
}
