use std::sync::Arc;
use std::thread;

use native_tls::TlsConnector;

use crate::cache::{CacheKind, ValidationCache};
use crate::mx::{MxLookup, exchange_hosts};
use crate::smtp_verify::error::SmtpVerifyError;
use crate::smtp_verify::options::ProbeOptions;
use crate::smtp_verify::rotation::{EgressRotator, NoRotation};
use crate::smtp_verify::session::{SmtpReply, SmtpSession};

/// Reply codes to `VRFY` that count as deliverable.
pub const ACCEPTED_CODES: [u16; 3] = [250, 251, 252];

pub trait MailboxProbe: Send + Sync {
    fn is_deliverable(&self, email: &str, domain: &str, cache: &ValidationCache) -> bool;
}

/// Sweeps every MX host of a domain over the configured ports and asks the
/// first server that completes the dialogue to verify the mailbox.
pub struct SmtpProber {
    options: ProbeOptions,
    resolver: Arc<dyn MxLookup>,
    rotator: Arc<dyn EgressRotator>,
    connector: TlsConnector,
}

impl SmtpProber {
    pub fn new(options: ProbeOptions, resolver: Arc<dyn MxLookup>) -> Result<Self, SmtpVerifyError> {
        Self::with_rotator(options, resolver, Arc::new(NoRotation))
    }

    pub fn with_rotator(
        options: ProbeOptions,
        resolver: Arc<dyn MxLookup>,
        rotator: Arc<dyn EgressRotator>,
    ) -> Result<Self, SmtpVerifyError> {
        let connector = TlsConnector::builder()
            .danger_accept_invalid_certs(!options.verify_tls)
            .danger_accept_invalid_hostnames(!options.verify_tls)
            .build()
            .map_err(SmtpVerifyError::TlsInit)?;
        Ok(Self {
            options,
            resolver,
            rotator,
            connector,
        })
    }

    pub fn options(&self) -> &ProbeOptions {
        &self.options
    }

    /// `Some(answer)` once a server completed the dialogue, `None` when every
    /// combination failed.
    fn sweep(&self, email: &str, hosts: &[String]) -> Option<bool> {
        for host in hosts {
            if self.options.rotate_per_host {
                if let Err(err) = self.rotate(host) {
                    tracing::warn!("{err}");
                }
            }
            for &port in &self.options.ports {
                match self.probe_once(host, port, email) {
                    Ok(reply) => {
                        let accepted = ACCEPTED_CODES.contains(&reply.code);
                        tracing::debug!(
                            "VRFY {email} on {host}:{port} answered {} (deliverable={accepted})",
                            reply.code
                        );
                        return Some(accepted);
                    }
                    Err(err) if err.is_transport() => {
                        tracing::debug!("{host}:{port} unreachable for {email}: {err}");
                    }
                    Err(err) => {
                        tracing::debug!("SMTP dialogue for {email} on {host}:{port} failed: {err}");
                    }
                }
            }
        }
        None
    }

    fn rotate(&self, host: &str) -> Result<(), SmtpVerifyError> {
        self.rotator
            .rotate(host)
            .map_err(|source| SmtpVerifyError::Rotation {
                host: host.to_string(),
                source,
            })
    }

    fn probe_once(&self, host: &str, port: u16, email: &str) -> Result<SmtpReply, SmtpVerifyError> {
        let mut session = SmtpSession::connect(host, port, self.options.timeout)?;
        session.read_banner()?;
        session.ehlo(&self.options.helo_host)?;
        if self.options.uses_starttls(port) {
            session.starttls(&self.connector)?;
            session.ehlo(&self.options.helo_host)?;
        }
        let reply = session.verify(email)?;
        session.quit().ok();
        Ok(reply)
    }
}

impl MailboxProbe for SmtpProber {
    fn is_deliverable(&self, email: &str, domain: &str, cache: &ValidationCache) -> bool {
        if let Some(hit) = cache.get(email, CacheKind::Deliverable) {
            return hit;
        }

        let hosts = match self.resolver.resolve_mx(domain) {
            Ok(records) => exchange_hosts(&records),
            Err(err) => {
                tracing::error!("Deliverability check failed for {email}: {err}");
                return false;
            }
        };

        for sweep in 0..self.options.sweeps.max(1) {
            if sweep > 0 {
                thread::sleep(self.options.sweep_delay);
            }
            match self.sweep(email, &hosts) {
                Some(true) => {
                    cache.put(email, CacheKind::Deliverable, true);
                    return true;
                }
                Some(false) => return false,
                None => {}
            }
        }
        false
    }
}

impl std::fmt::Debug for SmtpProber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpProber")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use crate::disposable::StaticLists;
    use crate::mx::tests::StubResolver;
    use crate::smtp_verify::mock::{MockServer, closed_port};
    use crate::smtp_verify::rotation::RotationError;

    fn options(ports: Vec<u16>) -> ProbeOptions {
        ProbeOptions {
            timeout: Duration::from_secs(2),
            helo_host: "probe.test".to_string(),
            ports,
            starttls_ports: Vec::new(),
            sweep_delay: Duration::ZERO,
            ..ProbeOptions::default()
        }
    }

    fn cache() -> ValidationCache {
        ValidationCache::new(Arc::new(StaticLists::default()))
    }

    fn prober(ports: Vec<u16>, resolver: StubResolver) -> (SmtpProber, Arc<StubResolver>) {
        let resolver = Arc::new(resolver);
        let prober = SmtpProber::new(options(ports), resolver.clone()).expect("prober");
        (prober, resolver)
    }

    #[test]
    fn accepted_vrfy_is_cached() {
        let server = MockServer::start(vec![vec![
            ("EHLO probe.test", "250 mock.example\r\n"),
            ("VRFY user@example.com", "252 2.0.0 Cannot VRFY user, will accept\r\n"),
            ("QUIT", "221 2.0.0 Bye\r\n"),
        ]]);
        let (prober, _) = prober(vec![server.port()], StubResolver::hosts(&["127.0.0.1"]));
        let cache = cache();

        assert!(prober.is_deliverable("user@example.com", "example.com", &cache));
        assert_eq!(cache.get("user@example.com", CacheKind::Deliverable), Some(true));
        server.join();
    }

    #[test]
    fn rejected_vrfy_is_not_cached() {
        let server = MockServer::start(vec![vec![
            ("EHLO", "250 mock.example\r\n"),
            ("VRFY", "550 5.1.1 User unknown\r\n"),
            ("QUIT", "221 2.0.0 Bye\r\n"),
        ]]);
        let (prober, _) = prober(vec![server.port()], StubResolver::hosts(&["127.0.0.1"]));
        let cache = cache();

        assert!(!prober.is_deliverable("ghost@example.com", "example.com", &cache));
        assert_eq!(cache.get("ghost@example.com", CacheKind::Deliverable), None);
        server.join();
    }

    #[test]
    fn refused_port_falls_through_to_next_port() {
        let server = MockServer::start(vec![vec![
            ("EHLO", "250 mock.example\r\n"),
            ("VRFY", "250 2.1.5 user@example.com\r\n"),
            ("QUIT", "221 2.0.0 Bye\r\n"),
        ]]);
        let (prober, _) = prober(
            vec![closed_port(), server.port()],
            StubResolver::hosts(&["127.0.0.1"]),
        );
        assert!(prober.is_deliverable("user@example.com", "example.com", &cache()));
        server.join();
    }

    #[test]
    fn total_failure_is_negative_and_resweeps_next_time() {
        let (prober, resolver) = prober(
            vec![closed_port()],
            StubResolver::hosts(&["127.0.0.1", "127.0.0.1"]),
        );
        let cache = cache();

        assert!(!prober.is_deliverable("user@example.com", "example.com", &cache));
        assert!(!prober.is_deliverable("user@example.com", "example.com", &cache));
        assert_eq!(cache.get("user@example.com", CacheKind::Deliverable), None);
        assert_eq!(resolver.call_count(), 2);
    }

    #[test]
    fn cached_positive_skips_network() {
        let (prober, resolver) = prober(vec![closed_port()], StubResolver::hosts(&["127.0.0.1"]));
        let cache = cache();
        cache.put("user@example.com", CacheKind::Deliverable, true);

        assert!(prober.is_deliverable("user@example.com", "example.com", &cache));
        assert_eq!(resolver.call_count(), 0);
    }

    #[test]
    fn resolver_failure_is_negative() {
        let (prober, _) = prober(vec![closed_port()], StubResolver::failing());
        assert!(!prober.is_deliverable("user@example.com", "example.com", &cache()));
    }

    #[test]
    fn extra_sweeps_reuse_the_resolved_hosts() {
        let resolver = Arc::new(StubResolver::hosts(&["127.0.0.1"]));
        let prober = SmtpProber::new(
            ProbeOptions {
                sweeps: 3,
                ..options(vec![closed_port()])
            },
            resolver.clone(),
        )
        .expect("prober");

        assert!(!prober.is_deliverable("user@example.com", "example.com", &cache()));
        assert_eq!(resolver.call_count(), 1);
    }

    struct CountingRotator(AtomicUsize);

    impl EgressRotator for CountingRotator {
        fn rotate(&self, _host: &str) -> Result<(), RotationError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[test]
    fn rotator_runs_per_host_only_when_enabled() {
        let hosts = &["127.0.0.1", "127.0.0.1", "127.0.0.1"];
        for (enabled, expected) in [(false, 0), (true, 3)] {
            let rotator = Arc::new(CountingRotator(AtomicUsize::new(0)));
            let prober = SmtpProber::with_rotator(
                ProbeOptions {
                    rotate_per_host: enabled,
                    ..options(vec![closed_port()])
                },
                Arc::new(StubResolver::hosts(hosts)),
                rotator.clone(),
            )
            .expect("prober");
            prober.is_deliverable("user@example.com", "example.com", &cache());
            assert_eq!(rotator.0.load(Ordering::SeqCst), expected);
        }
    }

    struct FailingRotator;

    impl EgressRotator for FailingRotator {
        fn rotate(&self, _host: &str) -> Result<(), RotationError> {
            Err("no exit node left".into())
        }
    }

    #[test]
    fn rotation_failure_does_not_stop_the_sweep() {
        let server = MockServer::start(vec![vec![
            ("EHLO", "250 mock.example\r\n"),
            ("VRFY", "250 2.1.5 ok\r\n"),
            ("QUIT", "221 2.0.0 Bye\r\n"),
        ]]);
        let prober = SmtpProber::with_rotator(
            ProbeOptions {
                rotate_per_host: true,
                ..options(vec![server.port()])
            },
            Arc::new(StubResolver::hosts(&["127.0.0.1"])),
            Arc::new(FailingRotator),
        )
        .expect("prober");

        let err = prober.rotate("mx.example.com").expect_err("rotation fails");
        assert!(matches!(&err, SmtpVerifyError::Rotation { host, .. } if host == "mx.example.com"));
        assert!(!err.is_transport());
        assert!(prober.is_deliverable("user@example.com", "example.com", &cache()));
        server.join();
    }

    #[test]
    fn starttls_refusal_falls_through_to_next_port() {
        let tls_port = MockServer::start(vec![vec![
            ("EHLO", "250-mock.example\r\n250 STARTTLS\r\n"),
            ("STARTTLS", "454 4.7.0 TLS not available\r\n"),
        ]]);
        let plain_port = MockServer::start(vec![vec![
            ("EHLO", "250 mock.example\r\n"),
            ("VRFY user@example.com", "250 2.1.5 ok\r\n"),
            ("QUIT", "221 2.0.0 Bye\r\n"),
        ]]);
        let prober = SmtpProber::new(
            ProbeOptions {
                starttls_ports: vec![tls_port.port()],
                ..options(vec![tls_port.port(), plain_port.port()])
            },
            Arc::new(StubResolver::hosts(&["127.0.0.1"])),
        )
        .expect("prober");

        assert!(prober.is_deliverable("user@example.com", "example.com", &cache()));
        tls_port.join();
        plain_port.join();
    }

    fn tls_prober(port: u16, verify_tls: bool) -> SmtpProber {
        SmtpProber::new(
            ProbeOptions {
                starttls_ports: vec![port],
                verify_tls,
                ..options(vec![port])
            },
            Arc::new(StubResolver::hosts(&["127.0.0.1"])),
        )
        .expect("prober")
    }

    #[test]
    fn self_signed_starttls_host_is_still_asked() {
        let server = MockServer::start_tls(vec![
            ("EHLO probe.test", "250 mock.smtp.test\r\n"),
            ("VRFY user@example.com", "252 2.0.0 will accept\r\n"),
            ("QUIT", "221 2.0.0 Bye\r\n"),
        ]);
        let prober = tls_prober(server.port(), false);

        assert!(prober.is_deliverable("user@example.com", "example.com", &cache()));
        server.join();
    }

    #[test]
    fn strict_tls_rejects_self_signed_certificate() {
        let server = MockServer::start_tls(vec![]);
        let prober = tls_prober(server.port(), true);

        assert!(!prober.is_deliverable("user@example.com", "example.com", &cache()));
        server.join();
    }
}
