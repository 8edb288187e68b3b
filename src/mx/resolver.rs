use parking_lot::Mutex;
use trust_dns_resolver::Resolver;
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::error::ResolveErrorKind;

use super::{Error, MxRecord};

/// DNS capability consumed by the pipeline and the prober.
///
/// Implementations return records in whatever order the underlying resolver
/// yields them; callers do not re-sort by preference. An empty vector means
/// the domain exists but publishes no MX.
pub trait MxLookup: Send + Sync {
    fn resolve_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error>;
}

/// [`MxLookup`] backed by the system resolver configuration (`/etc/resolv.conf`).
///
/// A sync `Resolver` drives its queries through one locked runtime, so a single
/// instance serializes every caller. Each lookup checks out an idle resolver
/// instead, building a new one when all are busy; the pool never outgrows the
/// peak number of concurrent callers.
pub struct SystemResolver {
    config: ResolverConfig,
    opts: ResolverOpts,
    idle: Mutex<Vec<Resolver>>,
}

impl SystemResolver {
    pub fn from_system_conf() -> Result<Self, Error> {
        let (config, opts) = trust_dns_resolver::system_conf::read_system_conf()
            .map_err(|err| Error::ResolverSetup(err.into()))?;
        Self::with_config(config, opts)
    }

    /// Builds one resolver eagerly so a bad configuration fails here, not on
    /// the first lookup.
    pub fn with_config(config: ResolverConfig, opts: ResolverOpts) -> Result<Self, Error> {
        let first = Resolver::new(config.clone(), opts.clone()).map_err(Error::ResolverSetup)?;
        Ok(Self {
            config,
            opts,
            idle: Mutex::new(vec![first]),
        })
    }

    fn checkout(&self) -> Result<Resolver, Error> {
        if let Some(resolver) = self.idle.lock().pop() {
            return Ok(resolver);
        }
        Resolver::new(self.config.clone(), self.opts.clone()).map_err(Error::ResolverSetup)
    }

    fn checkin(&self, resolver: Resolver) {
        self.idle.lock().push(resolver);
    }

    #[cfg(test)]
    pub(crate) fn idle_count(&self) -> usize {
        self.idle.lock().len()
    }
}

impl std::fmt::Debug for SystemResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemResolver")
            .field("idle", &self.idle.lock().len())
            .finish_non_exhaustive()
    }
}

impl MxLookup for SystemResolver {
    fn resolve_mx(&self, domain: &str) -> Result<Vec<MxRecord>, Error> {
        let ascii = normalize_domain(domain)?;
        let resolver = self.checkout()?;
        let lookup = resolver.mx_lookup(ascii.as_str());
        self.checkin(resolver);

        let lookup = match lookup {
            Ok(lookup) => lookup,
            Err(err) => match err.kind() {
                ResolveErrorKind::NoRecordsFound { .. } => return Ok(Vec::new()),
                _ => return Err(Error::lookup(&ascii, err)),
            },
        };
        Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(mx.exchange().to_utf8())))
            .collect())
    }
}

pub(crate) fn normalize_domain(domain: &str) -> Result<String, Error> {
    let trimmed = domain.trim();
    if trimmed.is_empty() {
        return Err(Error::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(|e| Error::invalid_domain(trimmed, e))
}

pub(crate) fn normalize_exchange(exchange: String) -> String {
    let trimmed = exchange.trim_end_matches('.');
    trimmed.to_ascii_lowercase()
}
