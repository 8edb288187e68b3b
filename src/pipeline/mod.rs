//! Per-address gate chain: syntax, MX, disposable, catch-all, deliverability.
//!
//! A gate that fails finalizes the result immediately; flags of gates that
//! never ran stay `false` and add nothing to the quality score.

mod error;
mod types;

pub use error::PipelineError;
pub use types::{RESULT_HEADERS, ValidationResult, email_domain};

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;

use crate::cache::{CacheKind, ValidationCache};
use crate::disposable::{BundledLists, DisposableSource};
use crate::mx::{MxLookup, SystemResolver};
use crate::smtp_verify::{MailboxProbe, ProbeOptions, SmtpProber, catchall_probe_address};
use crate::validator::{StrictSyntax, SyntaxCheck};
use types::GateScore;

/// Owns the run-scoped cache and the collaborators every gate consults.
pub struct Validator {
    syntax: Arc<dyn SyntaxCheck>,
    resolver: Arc<dyn MxLookup>,
    prober: Arc<dyn MailboxProbe>,
    cache: ValidationCache,
}

impl Validator {
    pub fn new(
        syntax: Arc<dyn SyntaxCheck>,
        resolver: Arc<dyn MxLookup>,
        prober: Arc<dyn MailboxProbe>,
        disposable: Arc<dyn DisposableSource>,
    ) -> Self {
        Self {
            syntax,
            resolver,
            prober,
            cache: ValidationCache::new(disposable),
        }
    }

    /// System resolver, SMTP prober, strict syntax and the bundled disposable lists.
    pub fn with_defaults(options: ProbeOptions) -> Result<Self, PipelineError> {
        let resolver: Arc<dyn MxLookup> = Arc::new(SystemResolver::from_system_conf()?);
        let prober = SmtpProber::new(options, resolver.clone())?;
        Ok(Self::new(
            Arc::new(StrictSyntax::default()),
            resolver,
            Arc::new(prober),
            Arc::new(BundledLists),
        ))
    }

    pub fn cache(&self) -> &ValidationCache {
        &self.cache
    }

    /// Called once per bulk run, never per address.
    pub fn reset_cache(&self) {
        self.cache.reset();
    }

    /// Runs the gate chain. Never fails: a pipeline error becomes a failure
    /// result carrying the error text.
    pub fn validate(&self, email: &str) -> ValidationResult {
        let started = Instant::now();
        let mut result = ValidationResult::new(email);

        if let Err(err) = self.run_gates(&mut result) {
            tracing::error!("Error validating {email}: {err}");
            result = ValidationResult::failed(email, &err);
        }

        result.validation_time = Some(started.elapsed().as_secs_f64());
        result.validation_date = Utc::now();
        result
    }

    fn run_gates(&self, result: &mut ValidationResult) -> Result<(), PipelineError> {
        let mut score = GateScore::default();
        let email = result.email.clone();

        result.is_valid = self.syntax.valid(&email);
        score.record(result.is_valid);
        if !result.is_valid {
            result.quality_score = score.value();
            return Ok(());
        }

        let domain = result
            .domain()
            .map(str::to_string)
            .ok_or_else(|| PipelineError::MissingDomain(email.clone()))?;

        result.has_mx_record = self.has_mx_record(&domain);
        score.record(result.has_mx_record);
        if !result.has_mx_record {
            result.quality_score = score.value();
            return Ok(());
        }

        // Observed polarity: a domain absent from the disposable snapshot is
        // flagged disposable. Pinned by `unlisted_domain_is_flagged_disposable`.
        result.is_disposable = !self.cache.is_listed_disposable(&domain);
        score.record(!result.is_disposable);
        if result.is_disposable {
            result.quality_score = score.value();
            return Ok(());
        }

        result.is_catchall = self.is_catchall(&domain);
        score.record(!result.is_catchall);

        result.is_deliverable = self.prober.is_deliverable(&email, &domain, &self.cache);
        score.record(result.is_deliverable);

        result.quality_score = score.value();
        Ok(())
    }

    /// Only successful lookups are memoized; a resolver error is retried by
    /// the next address at the same domain.
    fn has_mx_record(&self, domain: &str) -> bool {
        if let Some(hit) = self.cache.get(domain, CacheKind::Mx) {
            return hit;
        }
        match self.resolver.resolve_mx(domain) {
            Ok(records) => {
                let has_mx = !records.is_empty();
                self.cache.put(domain, CacheKind::Mx, has_mx);
                has_mx
            }
            Err(err) => {
                tracing::debug!("MX record check failed for {domain}: {err}");
                false
            }
        }
    }

    fn is_catchall(&self, domain: &str) -> bool {
        if let Some(hit) = self.cache.get(domain, CacheKind::Catchall) {
            return hit;
        }
        let probe = catchall_probe_address(domain);
        let is_catchall = self.prober.is_deliverable(&probe, domain, &self.cache);
        self.cache.put(domain, CacheKind::Catchall, is_catchall);
        is_catchall
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
