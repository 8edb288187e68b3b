//! Run-scoped memo of network-derived facts.
//!
//! Each map sits behind its own `RwLock`, taken only for the duration of a
//! single lookup or insert and never across network I/O. Two workers that miss
//! on the same key both compute it and the last `put` wins; values are
//! recomputable booleans so the race is benign.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::disposable::DisposableSource;

/// Which memo a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// domain -> has MX records
    Mx,
    /// domain -> accepts any local part
    Catchall,
    /// email -> deliverable (positives only)
    Deliverable,
}

pub struct ValidationCache {
    source: Arc<dyn DisposableSource>,
    mx: RwLock<HashMap<String, bool>>,
    catchall: RwLock<HashMap<String, bool>>,
    deliverable: RwLock<HashMap<String, bool>>,
    disposable: RwLock<HashSet<String>>,
}

impl ValidationCache {
    pub fn new(source: Arc<dyn DisposableSource>) -> Self {
        let disposable = source.snapshot();
        Self {
            source,
            mx: RwLock::new(HashMap::new()),
            catchall: RwLock::new(HashMap::new()),
            deliverable: RwLock::new(HashMap::new()),
            disposable: RwLock::new(disposable),
        }
    }

    fn map(&self, kind: CacheKind) -> &RwLock<HashMap<String, bool>> {
        match kind {
            CacheKind::Mx => &self.mx,
            CacheKind::Catchall => &self.catchall,
            CacheKind::Deliverable => &self.deliverable,
        }
    }

    /// `None` signals a miss.
    pub fn get(&self, key: &str, kind: CacheKind) -> Option<bool> {
        self.map(kind).read().get(key).copied()
    }

    pub fn put(&self, key: &str, kind: CacheKind, value: bool) {
        self.map(kind).write().insert(key.to_string(), value);
    }

    pub fn len(&self, kind: CacheKind) -> usize {
        self.map(kind).read().len()
    }

    pub fn is_empty(&self, kind: CacheKind) -> bool {
        self.len(kind) == 0
    }

    /// Membership in the disposable snapshot taken at construction (or last reset).
    pub fn is_listed_disposable(&self, domain: &str) -> bool {
        self.disposable.read().contains(domain)
    }

    /// Clears every memo and re-takes the disposable snapshot.
    pub fn reset(&self) {
        self.mx.write().clear();
        self.catchall.write().clear();
        self.deliverable.write().clear();
        *self.disposable.write() = self.source.snapshot();
        tracing::info!("Cache cleared");
    }
}

impl std::fmt::Debug for ValidationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationCache")
            .field("mx", &self.len(CacheKind::Mx))
            .field("catchall", &self.len(CacheKind::Catchall))
            .field("deliverable", &self.len(CacheKind::Deliverable))
            .field("disposable", &self.disposable.read().len())
            .finish()
    }
}
