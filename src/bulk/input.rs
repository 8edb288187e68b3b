use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use super::BulkError;

/// Trimmed, lowercased candidate; `None` for blank lines and lines without '@'.
pub fn normalize_line(line: &str) -> Option<String> {
    let email = line.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        None
    } else {
        Some(email)
    }
}

/// Unique normalized candidates of a newline-delimited file, sorted.
pub fn read_candidates(path: &Path) -> Result<BTreeSet<String>, BulkError> {
    let content = fs::read_to_string(path).map_err(|source| BulkError::Input {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(content.lines().filter_map(normalize_line).collect())
}

/// Normalizes, dedupes and sorts `input` into `output`. Returns the number of
/// addresses written.
pub fn clean_email_list(input: &Path, output: &Path) -> Result<usize, BulkError> {
    let emails = read_candidates(input)?;
    let mut buf = String::new();
    for email in &emails {
        buf.push_str(email);
        buf.push('\n');
    }
    fs::write(output, buf).map_err(|source| BulkError::Output {
        path: output.to_path_buf(),
        source,
    })?;
    tracing::info!("Cleaned {} unique emails", emails.len());
    Ok(emails.len())
}
