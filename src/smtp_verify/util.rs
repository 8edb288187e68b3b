use chrono::Utc;
use rand::{Rng, distributions::Alphanumeric};

/// Builds an address at `domain` whose local part almost certainly does not
/// exist; acceptance by the server therefore indicates a catch-all.
pub fn catchall_probe_address(domain: &str) -> String {
    format!(
        "test_nonexistent_email_{}{}@{domain}",
        Utc::now().timestamp_micros(),
        random_suffix(6)
    )
}

fn random_suffix(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}
