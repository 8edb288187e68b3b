use thiserror::Error;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyntaxMode {
    /// dot-atom sans guillemets
    #[default]
    Strict,
    /// accepte aussi une partie locale entre guillemets
    Relaxed,
}

/// Une raison de rejet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxIssue {
    #[error("address length {0} > 254")]
    AddressTooLong(usize),
    #[error("address must contain exactly one '@'")]
    AtSign,
    #[error("local part length {0} outside 1..=64")]
    LocalLength(usize),
    #[error("local part has characters outside the allowed set")]
    LocalChars,
    #[error("local part has a leading, trailing or doubled dot")]
    LocalDots,
    #[error("domain cannot be converted to ASCII")]
    DomainIdna,
    #[error("domain is empty")]
    DomainEmpty,
    #[error("domain length {0} > 253")]
    DomainTooLong(usize),
    #[error("domain has no dot")]
    DomainNoDot,
    #[error("domain has an empty label")]
    EmptyLabel,
    #[error("label '{0}' longer than 63")]
    LabelTooLong(String),
    #[error("label '{0}' starts or ends with '-'")]
    LabelHyphen(String),
    #[error("label '{0}' has invalid characters")]
    LabelChars(String),
    #[error("top-level label '{0}' is numeric")]
    NumericTld(String),
}

/// Vide = adresse valide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyntaxReport {
    pub issues: Vec<SyntaxIssue>,
}

impl SyntaxReport {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub(crate) fn push(&mut self, issue: SyntaxIssue) {
        self.issues.push(issue);
    }
}
