//! Merge and Order Policy
//!
//! Closures are sets with an observable order. Every time a closure is
//! written, the list is rebuilt by concatenating the existing entries with
//! the new ones, dropping repeats (first occurrence wins), and then sorting
//! according to the active [`OrderMode`].
//!
//! The mode is a property of the whole list, not of the delta: merging an
//! empty addition still normalizes the base.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use super::key::Key;

/// How a closure list is ordered after each merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    /// Keep the order produced by concatenation.
    Append,

    /// Sort lexicographically, smallest key first.
    #[default]
    Ascending,

    /// Sort lexicographically, largest key first.
    Descending,
}

/// Merge `addition` into `base` and normalize the result.
pub fn merge(base: &[Key], addition: &[Key], order: OrderMode) -> Vec<Key> {
    let mut merged = Vec::with_capacity(base.len() + addition.len());
    merged.extend_from_slice(base);
    merged.extend_from_slice(addition);
    normalize(merged, order)
}

/// Drop repeated keys (keeping the first occurrence) and sort per `order`.
///
/// Idempotent: normalizing an already normalized list returns it unchanged.
pub fn normalize(list: Vec<Key>, order: OrderMode) -> Vec<Key> {
    let unique: IndexSet<Key> = list.into_iter().collect();
    let mut list: Vec<Key> = unique.into_iter().collect();

    match order {
        OrderMode::Append => {}
        OrderMode::Ascending => list.sort_unstable(),
        OrderMode::Descending => list.sort_unstable_by(|a, b| b.cmp(a)),
    }

    list
}

/// Keys of `addition` for which `present` is false, without repeats, in
/// addition order.
pub(crate) fn missing<F>(addition: &[Key], mut present: F) -> Vec<Key>
where
    F: FnMut(&Key) -> bool,
{
    let unique: IndexSet<&Key> = addition.iter().filter(|key| !present(*key)).collect();
    unique.into_iter().cloned().collect()
}

/// Append `added` to a normalized `closure` and restore its order.
///
/// `added` must hold no key already in `closure`; the result then equals
/// `merge(closure, added, order)` without copying the existing entries.
pub(crate) fn extend_normalized(closure: &mut Vec<Key>, added: Vec<Key>, order: OrderMode) {
    closure.extend(added);

    // Sorted prefix plus a short tail; the stable sort detects the run.
    match order {
        OrderMode::Append => {}
        OrderMode::Ascending => closure.sort(),
        OrderMode::Descending => closure.sort_by(|a, b| b.cmp(a)),
    }
}
