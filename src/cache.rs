//! Memoized grid evaluation keyed by shape and design-space identity.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use hashbrown::HashMap;
use tracing::debug;

use crate::domain::DomainId;
use crate::field::ScalarField;
use crate::shape::{Shape, ShapeId};

type Entries = HashMap<(ShapeId, DomainId), Arc<ScalarField>>;

/// Cache of evaluated grids.
///
/// Shapes are immutable, so an entry only goes stale if the caller rebuilds
/// state behind a reused id; [`FieldCache::invalidate`] drops every entry of
/// one shape. Safe to share between threads.
#[derive(Debug, Default)]
pub struct FieldCache {
    entries: Mutex<Entries>,
}

impl FieldCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        // Entries are inserted whole, so a poisoned map is still consistent.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached grid for `shape`, evaluating it on first use.
    pub fn get_or_evaluate(&self, shape: &Shape) -> Arc<ScalarField> {
        let key = (shape.id(), shape.space().id());
        if let Some(hit) = self.lock().get(&key) {
            return Arc::clone(hit);
        }
        // Evaluate without holding the lock; a racing thread may compute the
        // same grid, and the first insert wins.
        let field = Arc::new(shape.evaluate_grid());
        debug!(shape = ?key.0, domain = ?key.1, samples = field.len(), "cached shape grid");
        Arc::clone(self.lock().entry(key).or_insert(field))
    }

    /// Cached grid for `shape`, if already evaluated.
    pub fn get(&self, shape: &Shape) -> Option<Arc<ScalarField>> {
        self.lock().get(&(shape.id(), shape.space().id())).cloned()
    }

    /// Drop every cached grid of `shape`. Returns how many were removed.
    pub fn invalidate(&self, shape: ShapeId) -> usize {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(id, _), _| *id != shape);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
