//! Closure Engine
//!
//! The engine is the only writer of closures. For each declared key it:
//!
//! 1. Starts from the direct dependency list.
//! 2. Merges in the stored closure of every direct dependency, in input
//!    order.
//! 3. Rejects the key if the result contains the key itself (unless
//!    conflicts are allowed).
//! 4. Normalizes the list per the active [`OrderMode`] and stores it.
//! 5. Asks the backend to propagate the new closure to every existing
//!    entry that depends on the key.
//!
//! # Partial Application
//!
//! Neither propagation nor batches roll back. A rejected key leaves the
//! store untouched, but a conflict found while propagating leaves the key
//! and every ancestor extended before the conflict in place. A batch keeps
//! every insertion that succeeded. Callers inspecting a `false` result
//! must not assume nothing changed.

use indexmap::IndexMap;
use tracing::debug;

use super::config::EngineConfig;
use crate::error::{ClosureError, Result};
use crate::graph::{merge, normalize, Closure, Key, OrderMode};
use crate::store::{Backend, DynBackend, IndexedBackend, ScanningBackend};

/// Maintains the transitive closure of every declared key.
///
/// The backend defaults to [`IndexedBackend`]; the order defaults to
/// [`OrderMode::Ascending`] and conflicts are rejected.
///
/// # Example
///
/// ```
/// use depclosure_core::{keys, ClosureEngine};
///
/// let mut engine: ClosureEngine = ClosureEngine::default();
/// assert!(engine.add_dependency("A", ["D", "C"]));
/// assert!(engine.add_dependency("D", ["E", "F"]));
///
/// assert_eq!(engine.closure("A").unwrap(), keys(["C", "D", "E", "F"]).as_slice());
/// ```
#[derive(Debug, Clone)]
pub struct ClosureEngine<B: Backend = IndexedBackend> {
    /// The store holding the primary map.
    backend: B,

    /// Ordering applied every time a closure is written.
    order: OrderMode,

    /// Whether keys may (transitively) depend on themselves.
    allows_conflict: bool,
}

impl<B: Backend> ClosureEngine<B> {
    /// Create an engine over `backend` with the default policy.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            order: OrderMode::default(),
            allows_conflict: false,
        }
    }

    /// Use `order` for every closure written from now on.
    pub fn with_order(mut self, order: OrderMode) -> Self {
        self.order = order;
        self
    }

    /// Admit (or reject) keys whose closure would contain themselves.
    pub fn allowing_conflicts(mut self, allows_conflict: bool) -> Self {
        self.allows_conflict = allows_conflict;
        self
    }

    /// Get the active order mode.
    pub fn order(&self) -> OrderMode {
        self.order
    }

    /// Change the order mode. Existing closures keep their order until
    /// they are next written.
    pub fn set_order(&mut self, order: OrderMode) {
        self.order = order;
    }

    /// Whether cycles are admitted.
    pub fn allows_conflict(&self) -> bool {
        self.allows_conflict
    }

    /// Change the conflict policy.
    pub fn set_allows_conflict(&mut self, allows_conflict: bool) {
        self.allows_conflict = allows_conflict;
    }

    /// Get the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume the engine, returning its backend.
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Declare the direct dependencies of `key`.
    ///
    /// Returns `false` if the key would depend on itself, or if propagation
    /// hit an ancestor that would. See the module docs for what a `false`
    /// result may leave behind.
    pub fn add_dependency<K, I, S>(&mut self, key: K, direct: I) -> bool
    where
        K: Into<Key>,
        I: IntoIterator<Item = S>,
        S: Into<Key>,
    {
        self.try_add_dependency(key, direct).is_ok()
    }

    /// Declare the direct dependencies of `key`, reporting which key conflicted.
    pub fn try_add_dependency<K, I, S>(&mut self, key: K, direct: I) -> Result<()>
    where
        K: Into<Key>,
        I: IntoIterator<Item = S>,
        S: Into<Key>,
    {
        let key = key.into();
        let direct: Vec<Key> = direct.into_iter().map(Into::into).collect();

        let mut candidate = direct.clone();
        for dep in &direct {
            let known = self.backend.get(dep.as_str()).unwrap_or_default();
            candidate = merge(&candidate, known, self.order);
        }

        if !self.allows_conflict && candidate.contains(&key) {
            debug!(%key, "rejected dependency: key would depend on itself");
            return Err(ClosureError::Conflict { key });
        }

        let closure = normalize(candidate, self.order);
        debug!(%key, direct = direct.len(), closure = closure.len(), "storing closure");
        self.backend.set(key.clone(), closure.clone());

        self.backend
            .update(&key, &closure, self.order, self.allows_conflict)
            .inspect_err(|err| debug!(%key, %err, "propagation stopped on conflict"))
    }

    /// Replace the whole store with `edges`.
    ///
    /// The backend is reset, then every `(key, direct)` pair is added in
    /// iteration order. Returns `true` only if every addition succeeded;
    /// failed additions do not undo the successful ones.
    pub fn set_dependency_batch<E, K, I, S>(&mut self, edges: E) -> bool
    where
        E: IntoIterator<Item = (K, I)>,
        K: Into<Key>,
        I: IntoIterator<Item = S>,
        S: Into<Key>,
    {
        self.try_set_dependency_batch(edges).is_ok()
    }

    /// Replace the whole store with `edges`, reporting the first conflict.
    ///
    /// Every pair is still attempted after a conflict.
    pub fn try_set_dependency_batch<E, K, I, S>(&mut self, edges: E) -> Result<()>
    where
        E: IntoIterator<Item = (K, I)>,
        K: Into<Key>,
        I: IntoIterator<Item = S>,
        S: Into<Key>,
    {
        self.backend.reset();

        let mut first_conflict = None;
        let (mut accepted, mut rejected) = (0usize, 0usize);
        for (key, direct) in edges {
            match self.try_add_dependency(key, direct) {
                Ok(()) => accepted += 1,
                Err(err) => {
                    rejected += 1;
                    first_conflict.get_or_insert(err);
                }
            }
        }

        debug!(accepted, rejected, "applied dependency batch");
        first_conflict.map_or(Ok(()), Err)
    }

    /// Snapshot of every stored closure.
    pub fn all(&self) -> IndexMap<Key, Closure> {
        self.backend.get_all()
    }

    /// The stored closure of `key`, if any.
    pub fn closure(&self, key: &str) -> Option<&[Key]> {
        self.backend.get(key)
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.backend.len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }

    /// Drop every stored closure.
    pub fn reset(&mut self) {
        self.backend.reset();
    }
}

impl<B: Backend + Default> Default for ClosureEngine<B> {
    fn default() -> Self {
        Self::new(B::default())
    }
}

impl ClosureEngine<IndexedBackend> {
    /// Engine over an empty [`IndexedBackend`].
    pub fn indexed() -> Self {
        Self::new(IndexedBackend::new())
    }
}

impl ClosureEngine<ScanningBackend> {
    /// Engine over an empty [`ScanningBackend`].
    pub fn scanning() -> Self {
        Self::new(ScanningBackend::new())
    }
}

impl ClosureEngine<DynBackend> {
    /// Build an engine whose backend and policy come from `config`.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.backend.build())
            .with_order(config.order)
            .allowing_conflicts(config.allows_conflict)
    }
}
