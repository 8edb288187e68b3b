use super::types::{SyntaxIssue, SyntaxMode, SyntaxReport};

const MAX_LOCAL_LEN: usize = 64;

/// atext ASCII autorisé hors guillemets (RFC 5322 §3.2.3).
fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c)
}

pub(crate) fn check_local(local: &str, mode: SyntaxMode, report: &mut SyntaxReport) {
    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        report.push(SyntaxIssue::LocalLength(local.len()));
        return;
    }

    if mode == SyntaxMode::Relaxed && is_quoted(local) {
        return;
    }

    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        report.push(SyntaxIssue::LocalDots);
    }
    if !local.chars().all(|c| c == '.' || is_atext(c)) {
        report.push(SyntaxIssue::LocalChars);
    }
}

fn is_quoted(s: &str) -> bool {
    s.len() >= 2 && s.starts_with('"') && s.ends_with('"')
}
