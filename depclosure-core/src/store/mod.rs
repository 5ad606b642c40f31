//! Storage Backends
//!
//! A backend owns the canonical `key -> closure` map. The engine computes
//! the closure for a newly declared key, writes it through [`Backend::set`],
//! and then asks the backend to [`Backend::update`] every existing entry
//! that must now absorb the new dependencies.
//!
//! # Strategies
//!
//! - [`ScanningBackend`]: no auxiliary state. Propagation scans every stored
//!   entry, repeating until no further entry is affected.
//! - [`IndexedBackend`]: keeps a reverse index from each value to the keys
//!   whose closure contains it, so affected entries are looked up directly
//!   and propagation recurses through the index.
//!
//! Both strategies produce identical maps for any sequence of calls.
//!
//! # Partial Application
//!
//! Propagation is not atomic. When extending an ancestor would make it
//! depend on itself, `update` stops and returns the conflict, but every
//! ancestor extended before that point keeps its new closure.

mod indexed;
mod scanning;

pub use indexed::IndexedBackend;
pub use scanning::ScanningBackend;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{Closure, Key, OrderMode};

/// Storage strategy for the primary closure map.
pub trait Backend {
    /// All stored entries, in insertion order.
    fn entries(&self) -> &IndexMap<Key, Closure>;

    /// Store `closure` as the closure of `key`, replacing any previous one.
    ///
    /// `closure` is expected to be normalized (no repeats, ordered by the
    /// active mode); the engine only ever writes normalized lists.
    fn set(&mut self, key: Key, closure: Closure);

    /// Remove every entry (and any derived state).
    fn reset(&mut self);

    /// Extend every entry that transitively depends on `key` with `addition`.
    ///
    /// Keys are visited at most once per call, whatever `allows_conflict`
    /// says, so cycles admitted under `allows_conflict` still terminate.
    /// With `allows_conflict == false` the first ancestor whose merged
    /// closure would contain itself aborts the call; earlier ancestors stay
    /// extended.
    fn update(
        &mut self,
        key: &Key,
        addition: &[Key],
        order: OrderMode,
        allows_conflict: bool,
    ) -> Result<()>;

    /// The closure stored for `key`, if any.
    fn get(&self, key: &str) -> Option<&[Key]> {
        self.entries().get(key).map(Vec::as_slice)
    }

    /// A snapshot of the whole primary map.
    fn get_all(&self) -> IndexMap<Key, Closure> {
        self.entries().clone()
    }

    /// Number of stored entries.
    fn len(&self) -> usize {
        self.entries().len()
    }

    /// Whether no entry is stored.
    fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn entries(&self) -> &IndexMap<Key, Closure> {
        (**self).entries()
    }

    fn set(&mut self, key: Key, closure: Closure) {
        (**self).set(key, closure)
    }

    fn reset(&mut self) {
        (**self).reset()
    }

    fn update(
        &mut self,
        key: &Key,
        addition: &[Key],
        order: OrderMode,
        allows_conflict: bool,
    ) -> Result<()> {
        (**self).update(key, addition, order, allows_conflict)
    }
}

/// A backend chosen at runtime.
pub type DynBackend = Box<dyn Backend + Send>;

/// Which storage strategy to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// [`ScanningBackend`]: smallest footprint, full scan per propagation.
    Scanning,

    /// [`IndexedBackend`]: reverse index, direct ancestor lookup.
    #[default]
    Indexed,
}

impl BackendKind {
    /// Build an empty backend of this kind.
    pub fn build(self) -> DynBackend {
        match self {
            Self::Scanning => Box::new(ScanningBackend::new()),
            Self::Indexed => Box::new(IndexedBackend::new()),
        }
    }
}
