//! Contrôle syntaxique des adresses, sans accès réseau.
//!
//! Le pipeline ne dépend que du trait [`SyntaxCheck`]; [`StrictSyntax`] est
//! l'implémentation fournie par défaut.

mod domain;
mod local;
mod types;

pub use types::{SyntaxIssue, SyntaxMode, SyntaxReport};

use domain::check_domain;
use local::check_local;

// RFC 5321: 256 pour le chemin, moins les chevrons
const MAX_ADDRESS_LEN: usize = 254;

/// Seul contrat utilisé par le pipeline : l'adresse est-elle bien formée ?
pub trait SyntaxCheck: Send + Sync {
    fn valid(&self, email: &str) -> bool;
}

/// Partie locale dot-atom ASCII, domaine vérifié après conversion IDNA.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictSyntax {
    pub mode: SyntaxMode,
}

impl StrictSyntax {
    pub fn check(&self, email: &str) -> SyntaxReport {
        check_address(email, self.mode)
    }
}

impl SyntaxCheck for StrictSyntax {
    fn valid(&self, email: &str) -> bool {
        self.check(email).is_ok()
    }
}

/// Collecte tous les problèmes; ne s'arrête tôt que si l'adresse ne se
/// découpe pas en partie locale et domaine.
pub fn check_address(email: &str, mode: SyntaxMode) -> SyntaxReport {
    let input = email.trim();
    let mut report = SyntaxReport::default();

    if input.len() > MAX_ADDRESS_LEN {
        report.push(SyntaxIssue::AddressTooLong(input.len()));
    }

    let mut parts = input.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        report.push(SyntaxIssue::AtSign);
        return report;
    };

    check_local(local, mode, &mut report);
    check_domain(domain, &mut report);
    report
}
