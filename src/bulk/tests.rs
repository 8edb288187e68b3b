use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use super::*;
use crate::aggregate::ListKind;
use crate::cache::{CacheKind, ValidationCache};
use crate::disposable::StaticLists;
use crate::mx::tests::StubResolver;
use crate::smtp_verify::MailboxProbe;
use crate::validator::{StrictSyntax, SyntaxCheck};

struct FixedProbe(bool);

impl MailboxProbe for FixedProbe {
    fn is_deliverable(&self, _email: &str, _domain: &str, _cache: &ValidationCache) -> bool {
        self.0
    }
}

/// Panics on any address starting with "boom".
struct Explosive;

impl SyntaxCheck for Explosive {
    fn valid(&self, email: &str) -> bool {
        if email.starts_with("boom") {
            panic!("syntax checker exploded on {email}");
        }
        StrictSyntax::default().valid(email)
    }
}

fn options(dir: &Path, batch_size: usize) -> BulkOptions {
    BulkOptions {
        input: dir.join("emails.txt"),
        output: dir.join("out/emails_validated.csv"),
        data_dir: dir.join("data"),
        workers: 4,
        batch_size,
    }
}

/// Resolver with no MX anywhere: every address stops after two gates.
fn offline_verifier(options: BulkOptions) -> BulkVerifier {
    let validator = Validator::new(
        Arc::new(StrictSyntax::default()),
        Arc::new(StubResolver::new(|_| Ok(Vec::new()))),
        Arc::new(FixedProbe(false)),
        Arc::new(StaticLists::default()),
    );
    BulkVerifier::new(options, validator)
}

fn write_input(dir: &Path, emails: impl IntoIterator<Item = String>) {
    let body: Vec<String> = emails.into_iter().collect();
    fs::write(dir.join("emails.txt"), body.join("\n")).expect("write input");
}

fn addresses(range: std::ops::Range<usize>) -> impl Iterator<Item = String> {
    range.map(|i| format!("user{i}@nomx.example"))
}

#[test]
fn case_variants_and_junk_collapse_to_one_row() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(
        dir.path().join("emails.txt"),
        "a@example.com\nA@EXAMPLE.com\nbad-email\n",
    )
    .expect("write");
    let verifier = offline_verifier(options(dir.path(), 100));

    let summary = verifier.run().expect("run");
    assert_eq!(summary.scheduled, 1);
    assert_eq!(summary.batches, vec![1]);

    let rows = verifier.store().read_rows().expect("rows");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].email, "a@example.com");
}

#[test]
fn results_are_flushed_in_full_batches_then_remainder() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_input(dir.path(), addresses(0..250));
    let verifier = offline_verifier(options(dir.path(), 100));

    let mut seen = Vec::new();
    let summary = verifier
        .run_with_progress(|done, total| seen.push((done, total)))
        .expect("run");

    assert_eq!(summary.batches, vec![100, 100, 50]);
    assert_eq!(verifier.store().row_count().expect("count"), 250);
    assert_eq!(seen.len(), 250);
    assert_eq!(seen.last(), Some(&(250, 250)));
}

#[test]
fn rerun_only_schedules_new_addresses() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_input(dir.path(), addresses(0..120));
    let first = offline_verifier(options(dir.path(), 100)).run().expect("first run");
    assert_eq!(first.appended(), 120);

    write_input(dir.path(), addresses(0..150));
    let verifier = offline_verifier(options(dir.path(), 100));
    let second = verifier.run().expect("second run");

    assert_eq!(second.scheduled, 30);
    assert_eq!(second.appended(), 30);
    assert_eq!(verifier.store().row_count().expect("count"), 150);
    assert_eq!(verifier.store().load_emails().expect("emails").len(), 150);
}

#[test]
fn nothing_new_means_no_rows_and_no_stats() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_input(dir.path(), addresses(0..3));
    offline_verifier(options(dir.path(), 100)).run().expect("first run");

    let verifier = offline_verifier(options(dir.path(), 100));
    let summary = verifier.run().expect("second run");
    assert_eq!(summary, RunSummary::default());
    assert_eq!(verifier.store().row_count().expect("count"), 3);
}

#[test]
fn panicking_address_becomes_failure_row() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_input(
        dir.path(),
        ["boom@nomx.example".to_string()].into_iter().chain(addresses(0..5)),
    );
    let validator = Validator::new(
        Arc::new(Explosive),
        Arc::new(StubResolver::new(|_| Ok(Vec::new()))),
        Arc::new(FixedProbe(false)),
        Arc::new(StaticLists::default()),
    );
    let verifier = BulkVerifier::new(options(dir.path(), 100), validator);

    let summary = verifier.run().expect("run");
    assert_eq!(summary.appended(), 6);

    let content = fs::read_to_string(verifier.store().path()).expect("read");
    let boom = content
        .lines()
        .find(|l| l.starts_with("boom@nomx.example"))
        .expect("boom row");
    assert!(boom.contains("validation panicked"), "{boom}");
    assert!(boom.starts_with("boom@nomx.example,false,false,false,false,false,0.0,,"));
}

#[test]
fn run_updates_lists_and_resets_cache() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_input(
        dir.path(),
        ["jane@mail.test".to_string(), "joe@mail.test".to_string()],
    );
    let validator = Validator::new(
        Arc::new(StrictSyntax::default()),
        Arc::new(StubResolver::hosts(&["mx.mail.test"])),
        Arc::new(FixedProbe(true)),
        Arc::new(StaticLists::new(Vec::<String>::new(), ["mail.test"])),
    );
    let verifier = BulkVerifier::new(options(dir.path(), 100), validator);

    let summary = verifier.run().expect("run");
    let stats = summary.stats.expect("stats");
    assert_eq!(stats.total_emails, 2);
    assert_eq!(stats.deliverable, 2);

    let lists = verifier.lists();
    let verified = lists.read(ListKind::VerifiedEmails).expect("verified");
    assert!(verified.contains("jane@mail.test") && verified.contains("joe@mail.test"));
    let catchall = lists.read(ListKind::CatchallDomains).expect("catchall");
    assert!(catchall.contains("mail.test"));
    assert!(verifier.validator().cache().is_empty(CacheKind::Mx));
    assert!(verifier.validator().cache().is_empty(CacheKind::Catchall));
}

#[test]
fn missing_input_aborts_the_run() {
    let dir = tempfile::tempdir().expect("tempdir");
    let verifier = offline_verifier(options(dir.path(), 100));
    let err = verifier.run().expect_err("no input file");
    assert!(matches!(err, BulkError::Input { .. }));
}

/// Records how many probes were running at the same time.
#[derive(Default)]
struct InFlightProbe {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl MailboxProbe for InFlightProbe {
    fn is_deliverable(&self, _email: &str, _domain: &str, _cache: &ValidationCache) -> bool {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(Duration::from_millis(20));
        self.current.fetch_sub(1, Ordering::SeqCst);
        true
    }
}

#[test]
fn concurrent_validations_never_exceed_worker_count() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_input(dir.path(), (0..40).map(|i| format!("user{i}@listed.example")));

    let probe = Arc::new(InFlightProbe::default());
    let validator = Validator::new(
        Arc::new(StrictSyntax::default()),
        Arc::new(StubResolver::hosts(&["mx.listed.example"])),
        probe.clone(),
        Arc::new(StaticLists::new(Vec::<String>::new(), ["listed.example"])),
    );
    let options = options(dir.path(), 100);
    let workers = options.workers;
    let verifier = BulkVerifier::new(options, validator);

    let summary = verifier.run().expect("run");
    assert_eq!(summary.appended(), 40);

    let peak = probe.peak.load(Ordering::SeqCst);
    assert!(peak <= workers, "peak {peak} > {workers} workers");
    assert!(peak > 1, "probes never overlapped");
}
