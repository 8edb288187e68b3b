//! Disposable-domain classification source.
//!
//! The cache snapshots `blocklist - allowlist` once per run; the lists
//! themselves are static data compiled into the binary by default.

mod lists;

use std::collections::HashSet;

/// Provides the two static domain sets the disposable snapshot is built from.
pub trait DisposableSource: Send + Sync {
    fn allowlist(&self) -> HashSet<String>;
    fn blocklist(&self) -> HashSet<String>;

    /// Blocklisted domains that are not explicitly allowed.
    fn snapshot(&self) -> HashSet<String> {
        let allow = self.allowlist();
        self.blocklist()
            .into_iter()
            .filter(|domain| !allow.contains(domain))
            .collect()
    }
}

/// Lists bundled with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledLists;

impl DisposableSource for BundledLists {
    fn allowlist(&self) -> HashSet<String> {
        lists::ALLOWLIST.iter().map(|d| d.to_string()).collect()
    }

    fn blocklist(&self) -> HashSet<String> {
        lists::BLOCKLIST.iter().map(|d| d.to_string()).collect()
    }
}

/// Caller-supplied lists, e.g. loaded from files at startup.
#[derive(Debug, Clone, Default)]
pub struct StaticLists {
    pub allow: HashSet<String>,
    pub block: HashSet<String>,
}

impl StaticLists {
    pub fn new<A, B>(allow: A, block: B) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            allow: allow.into_iter().map(Into::into).collect(),
            block: block.into_iter().map(Into::into).collect(),
        }
    }
}

impl DisposableSource for StaticLists {
    fn allowlist(&self) -> HashSet<String> {
        self.allow.clone()
    }

    fn blocklist(&self) -> HashSet<String> {
        self.block.clone()
    }
}
