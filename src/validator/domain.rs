use super::types::{SyntaxIssue, SyntaxReport};

const MAX_DOMAIN_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Conversion IDNA puis règles de labels (longueur, tirets, caractères).
pub(crate) fn check_domain(domain: &str, report: &mut SyntaxReport) {
    let Ok(ascii) = idna::domain_to_ascii(domain) else {
        report.push(SyntaxIssue::DomainIdna);
        return;
    };
    if ascii.is_empty() {
        report.push(SyntaxIssue::DomainEmpty);
        return;
    }
    if ascii.len() > MAX_DOMAIN_LEN {
        report.push(SyntaxIssue::DomainTooLong(ascii.len()));
    }
    if !ascii.contains('.') {
        report.push(SyntaxIssue::DomainNoDot);
    }

    for label in ascii.split('.') {
        if let Some(issue) = label_issue(label) {
            report.push(issue);
        }
    }

    if let Some(tld) = ascii.rsplit('.').next() {
        if !tld.is_empty() && tld.bytes().all(|b| b.is_ascii_digit()) {
            report.push(SyntaxIssue::NumericTld(tld.to_string()));
        }
    }
}

fn label_issue(label: &str) -> Option<SyntaxIssue> {
    if label.is_empty() {
        Some(SyntaxIssue::EmptyLabel)
    } else if label.len() > MAX_LABEL_LEN {
        Some(SyntaxIssue::LabelTooLong(label.to_string()))
    } else if label.starts_with('-') || label.ends_with('-') {
        Some(SyntaxIssue::LabelHyphen(label.to_string()))
    } else if !label.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
        Some(SyntaxIssue::LabelChars(label.to_string()))
    } else {
        None
    }
}
