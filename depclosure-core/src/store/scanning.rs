//! Scanning Backend
//!
//! Stores the primary map and nothing else. Finding the entries affected by
//! a propagation means walking the whole map, so each pass costs
//! O(entries x average closure length).
//!
//! # Algorithm
//!
//! `update` keeps a `reached` set, seeded with the key that gained new
//! dependencies. Each pass collects every unreached entry whose closure
//! mentions a reached key, extends it, and marks it reached. Passes repeat
//! until one finds nothing, so grand-ancestors are covered even when their
//! closure only mentions an intermediate key.

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::{debug, trace};

use super::Backend;
use crate::error::{ClosureError, Result};
use crate::graph::{extend_normalized, missing, Closure, Key, OrderMode};

/// Backend without an ancestor index.
#[derive(Debug, Clone, Default)]
pub struct ScanningBackend {
    entries: IndexMap<Key, Closure>,
}

impl ScanningBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `addition` into the closure of `ancestor`, in place.
    fn extend(
        &mut self,
        ancestor: &Key,
        addition: &[Key],
        order: OrderMode,
        allows_conflict: bool,
    ) -> Result<()> {
        let Some(closure) = self.entries.get_mut(ancestor) else {
            return Ok(());
        };

        let present: HashSet<&Key> = closure.iter().collect();
        let added = missing(addition, |value| present.contains(value));
        if !allows_conflict && (present.contains(ancestor) || added.contains(ancestor)) {
            return Err(ClosureError::Conflict {
                key: ancestor.clone(),
            });
        }
        if added.is_empty() {
            return Ok(());
        }

        extend_normalized(closure, added, order);
        trace!(%ancestor, size = closure.len(), "extended ancestor closure");
        Ok(())
    }
}

impl Backend for ScanningBackend {
    fn entries(&self) -> &IndexMap<Key, Closure> {
        &self.entries
    }

    fn set(&mut self, key: Key, closure: Closure) {
        self.entries.insert(key, closure);
    }

    fn reset(&mut self) {
        debug!(entries = self.entries.len(), "resetting scanning backend");
        self.entries.clear();
    }

    fn update(
        &mut self,
        key: &Key,
        addition: &[Key],
        order: OrderMode,
        allows_conflict: bool,
    ) -> Result<()> {
        let mut reached: HashSet<Key> = HashSet::new();
        reached.insert(key.clone());

        loop {
            let targets: Vec<Key> = self
                .entries
                .iter()
                .filter(|(k, _)| !reached.contains(*k))
                .filter(|(_, closure)| closure.iter().any(|dep| reached.contains(dep)))
                .map(|(k, _)| k.clone())
                .collect();

            if targets.is_empty() {
                break;
            }
            trace!(%key, count = targets.len(), "scan pass found ancestors");

            for ancestor in targets {
                self.extend(&ancestor, addition, order, allows_conflict)?;
                reached.insert(ancestor);
            }
        }

        Ok(())
    }
}
