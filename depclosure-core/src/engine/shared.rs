//! Shared Engine
//!
//! The engine itself is single-threaded: propagation touches many entries
//! over several steps and the backends assume exclusive access. To use one
//! store from several threads, wrap it in a [`SharedEngine`], which holds a
//! single lock for the whole of each top-level call.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use super::closure::ClosureEngine;
use crate::error::Result;
use crate::graph::{Closure, Key};
use crate::store::{Backend, IndexedBackend};

/// A cloneable handle serializing access to one [`ClosureEngine`].
pub struct SharedEngine<B: Backend = IndexedBackend> {
    inner: Arc<Mutex<ClosureEngine<B>>>,
}

impl<B: Backend> SharedEngine<B> {
    /// Wrap `engine` for shared use.
    pub fn new(engine: ClosureEngine<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// See [`ClosureEngine::add_dependency`].
    pub fn add_dependency<K, I, S>(&self, key: K, direct: I) -> bool
    where
        K: Into<Key>,
        I: IntoIterator<Item = S>,
        S: Into<Key>,
    {
        self.inner.lock().add_dependency(key, direct)
    }

    /// See [`ClosureEngine::try_add_dependency`].
    pub fn try_add_dependency<K, I, S>(&self, key: K, direct: I) -> Result<()>
    where
        K: Into<Key>,
        I: IntoIterator<Item = S>,
        S: Into<Key>,
    {
        self.inner.lock().try_add_dependency(key, direct)
    }

    /// See [`ClosureEngine::set_dependency_batch`].
    pub fn set_dependency_batch<E, K, I, S>(&self, edges: E) -> bool
    where
        E: IntoIterator<Item = (K, I)>,
        K: Into<Key>,
        I: IntoIterator<Item = S>,
        S: Into<Key>,
    {
        self.inner.lock().set_dependency_batch(edges)
    }

    /// Snapshot of every stored closure.
    pub fn all(&self) -> IndexMap<Key, Closure> {
        self.inner.lock().all()
    }

    /// A copy of the stored closure of `key`.
    pub fn closure(&self, key: &str) -> Option<Closure> {
        self.inner.lock().closure(key).map(<[Key]>::to_vec)
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut ClosureEngine<B>) -> R) -> R {
        f(&mut self.inner.lock())
    }
}

impl<B: Backend> Clone for SharedEngine<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: Backend> From<ClosureEngine<B>> for SharedEngine<B> {
    fn from(engine: ClosureEngine<B>) -> Self {
        Self::new(engine)
    }
}
