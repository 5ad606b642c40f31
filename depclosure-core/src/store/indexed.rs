//! Indexed Backend
//!
//! Keeps, next to the primary map, a reverse index from every value to the
//! keys whose stored closure contains it. Propagation looks up the affected
//! entries directly instead of scanning the map.
//!
//! # Index Invariant
//!
//! For every stored key `K` and every `v` in `closure(K)`, `K` is in
//! `ancestors[v]`, and nothing else is. The index is maintained inside
//! [`Backend::set`]: values a key gains are added, values it no longer
//! holds are removed, and buckets never hold duplicates.
//!
//! Propagation only ever grows closures, so it bypasses `set` and indexes
//! just the values each ancestor gained. That keeps a long chain linear in
//! the number of new index entries rather than re-indexing whole closures.

use std::collections::{HashMap, HashSet};

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, trace};

use super::Backend;
use crate::error::{ClosureError, Result};
use crate::graph::{extend_normalized, missing, Closure, Key, OrderMode};

/// Backend with a reverse ("ancestors") index.
#[derive(Debug, Clone, Default)]
pub struct IndexedBackend {
    entries: IndexMap<Key, Closure>,

    /// value -> keys whose closure currently contains value.
    ancestors: HashMap<Key, IndexSet<Key>>,
}

impl IndexedBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys whose stored closure contains `value`, in the order they gained it.
    pub fn ancestors_of(&self, value: &str) -> impl Iterator<Item = &Key> {
        self.ancestors.get(value).into_iter().flatten()
    }

    /// Whether the stored closure of `key` contains `value`.
    fn holds(&self, key: &Key, value: &Key) -> bool {
        self.ancestors
            .get(value)
            .is_some_and(|bucket| bucket.contains(key))
    }

    /// Merge `addition` into the closure of `ancestor` and index only the
    /// values it gained.
    fn extend(
        &mut self,
        ancestor: &Key,
        addition: &[Key],
        order: OrderMode,
        allows_conflict: bool,
    ) -> Result<()> {
        let added = missing(addition, |value| self.holds(ancestor, value));
        if !allows_conflict && (self.holds(ancestor, ancestor) || added.contains(ancestor)) {
            return Err(ClosureError::Conflict {
                key: ancestor.clone(),
            });
        }
        if added.is_empty() {
            return Ok(());
        }

        for value in &added {
            self.ancestors
                .entry(value.clone())
                .or_default()
                .insert(ancestor.clone());
        }

        let closure = self.entries.entry(ancestor.clone()).or_default();
        extend_normalized(closure, added, order);
        trace!(%ancestor, size = closure.len(), "extended ancestor closure");
        Ok(())
    }

    /// Recursive step of [`Backend::update`].
    fn propagate(
        &mut self,
        key: &Key,
        addition: &[Key],
        order: OrderMode,
        allows_conflict: bool,
        visited: &mut HashSet<Key>,
    ) -> Result<()> {
        let ancestors: Vec<Key> = match self.ancestors.get(key) {
            Some(bucket) => bucket
                .iter()
                .filter(|ancestor| !visited.contains(*ancestor))
                .cloned()
                .collect(),
            None => return Ok(()),
        };

        for ancestor in ancestors {
            // A deeper call may have reached it since the bucket was read.
            if !visited.insert(ancestor.clone()) {
                continue;
            }
            self.extend(&ancestor, addition, order, allows_conflict)?;
            self.propagate(&ancestor, addition, order, allows_conflict, visited)?;
        }

        Ok(())
    }
}

impl Backend for IndexedBackend {
    fn entries(&self) -> &IndexMap<Key, Closure> {
        &self.entries
    }

    fn set(&mut self, key: Key, closure: Closure) {
        if let Some(previous) = self.entries.get(&key) {
            let kept: HashSet<&Key> = closure.iter().collect();
            for value in previous.iter().filter(|v| !kept.contains(v)) {
                if let Some(bucket) = self.ancestors.get_mut(value) {
                    bucket.shift_remove(&key);
                    if bucket.is_empty() {
                        self.ancestors.remove(value);
                    }
                }
            }
        }

        for value in &closure {
            self.ancestors
                .entry(value.clone())
                .or_default()
                .insert(key.clone());
        }

        self.entries.insert(key, closure);
    }

    fn reset(&mut self) {
        debug!(
            entries = self.entries.len(),
            indexed = self.ancestors.len(),
            "resetting indexed backend"
        );
        self.entries.clear();
        self.ancestors.clear();
    }

    fn update(
        &mut self,
        key: &Key,
        addition: &[Key],
        order: OrderMode,
        allows_conflict: bool,
    ) -> Result<()> {
        let mut visited = HashSet::new();
        visited.insert(key.clone());
        self.propagate(key, addition, order, allows_conflict, &mut visited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::keys;

    fn ancestors(backend: &IndexedBackend, value: &str) -> Vec<Key> {
        backend.ancestors_of(value).cloned().collect()
    }

    #[test]
    fn set_indexes_every_value() {
        let mut backend = IndexedBackend::new();
        backend.set(Key::new("A"), keys(["B", "C"]));
        backend.set(Key::new("D"), keys(["C"]));

        assert_eq!(ancestors(&backend, "B"), keys(["A"]));
        assert_eq!(ancestors(&backend, "C"), keys(["A", "D"]));
        assert!(ancestors(&backend, "A").is_empty());
    }

    #[test]
    fn set_does_not_duplicate_index_entries() {
        let mut backend = IndexedBackend::new();
        backend.set(Key::new("A"), keys(["B"]));
        backend.set(Key::new("A"), keys(["B", "C"]));

        assert_eq!(ancestors(&backend, "B"), keys(["A"]));
    }

    #[test]
    fn replacing_a_closure_drops_stale_index_entries() {
        let mut backend = IndexedBackend::new();
        backend.set(Key::new("A"), keys(["B", "C"]));
        backend.set(Key::new("A"), keys(["D"]));

        assert!(ancestors(&backend, "B").is_empty());
        assert!(ancestors(&backend, "C").is_empty());
        assert_eq!(ancestors(&backend, "D"), keys(["A"]));
    }

    #[test]
    fn update_recurses_to_grand_ancestors() {
        let mut backend = IndexedBackend::new();
        backend.set(Key::new("X"), keys(["A"]));
        backend.set(Key::new("A"), keys(["B"]));
        backend.set(Key::new("B"), keys(["C"]));

        backend
            .update(&Key::new("B"), &keys(["C"]), OrderMode::Append, false)
            .unwrap();

        assert_eq!(backend.get("A").unwrap(), keys(["B", "C"]).as_slice());
        assert_eq!(backend.get("X").unwrap(), keys(["A", "C"]).as_slice());
        assert_eq!(ancestors(&backend, "C"), keys(["B", "A", "X"]));
    }

    #[test]
    fn conflict_returns_after_partial_propagation() {
        let mut backend = IndexedBackend::new();
        backend.set(Key::new("P"), keys(["K"]));
        backend.set(Key::new("Q"), keys(["K"]));

        let err = backend
            .update(&Key::new("K"), &keys(["Z", "Q"]), OrderMode::Append, false)
            .unwrap_err();

        assert_eq!(err.conflicting_key(), Some(&Key::new("Q")));
        assert_eq!(backend.get("P").unwrap(), keys(["K", "Z", "Q"]).as_slice());
        assert_eq!(backend.get("Q").unwrap(), keys(["K"]).as_slice());
    }

    #[test]
    fn admitted_cycle_terminates() {
        let mut backend = IndexedBackend::new();
        backend.set(Key::new("A"), keys(["B", "A"]));
        backend.set(Key::new("B"), keys(["A", "B"]));

        backend
            .update(&Key::new("A"), &keys(["C"]), OrderMode::Ascending, true)
            .unwrap();

        assert_eq!(backend.get("B").unwrap(), keys(["A", "B", "C"]).as_slice());
    }

    /// Every stored value indexes its key, and the index holds nothing else.
    fn assert_index_exact(backend: &IndexedBackend) {
        let mut indexed = 0;
        for (key, closure) in backend.entries() {
            for value in closure {
                assert!(
                    backend.ancestors_of(value.as_str()).any(|k| k == key),
                    "{key} missing from ancestors of {value}"
                );
            }
            indexed += closure.len();
        }
        let total: usize = backend.ancestors.values().map(IndexSet::len).sum();
        assert_eq!(total, indexed);
    }

    #[test]
    fn propagation_keeps_index_exact() {
        let mut backend = IndexedBackend::new();
        backend.set(Key::new("X"), keys(["A", "B"]));
        backend.set(Key::new("Y"), keys(["A"]));
        backend.set(Key::new("A"), keys(["B"]));
        backend.set(Key::new("B"), keys(["C"]));

        backend
            .update(&Key::new("B"), &keys(["C", "D"]), OrderMode::Descending, false)
            .unwrap();

        assert_eq!(backend.get("X").unwrap(), keys(["D", "C", "B", "A"]).as_slice());
        assert_eq!(backend.get("Y").unwrap(), keys(["D", "C", "A"]).as_slice());
        assert_index_exact(&backend);
    }

    #[test]
    fn long_chain_propagates_to_every_ancestor() {
        // Declaring 0 -> 1, 1 -> 2, ... front to back makes each link
        // extend every key above it.
        let n = 500;
        let name = |i: usize| Key::new(format!("{i:04}"));
        let mut backend = IndexedBackend::new();

        for i in 0..n {
            let closure = vec![name(i + 1)];
            backend.set(name(i), closure.clone());
            backend
                .update(&name(i), &closure, OrderMode::Ascending, false)
                .unwrap();
        }

        let expected: Vec<Key> = (1..=n).map(name).collect();
        assert_eq!(backend.get("0000").unwrap(), expected.as_slice());
        assert_eq!(ancestors(&backend, &format!("{n:04}")).len(), n);
        assert_index_exact(&backend);
    }

    #[test]
    fn reset_clears_index() {
        let mut backend = IndexedBackend::new();
        backend.set(Key::new("A"), keys(["B"]));
        backend.reset();

        assert!(backend.is_empty());
        assert!(ancestors(&backend, "B").is_empty());
    }
}
