//! Dependency Relation
//!
//! This module holds the value types shared by every part of the crate:
//! node keys, closures, and the policy that merges and orders closures.
//!
//! # Overview
//!
//! The depends-on relation is a directed graph where an edge from A to B
//! means "A depends on B". For every stored key we keep its closure: the
//! complete set of keys reachable from it, stored as an ordered list.
//!
//! Closures only ever grow through merging. The merge policy is pure and
//! has no knowledge of storage, so the engine and both storage backends
//! share a single definition of "merge, dedupe, sort".

mod key;
mod order;

pub use key::{keys, Key};
pub use order::{merge, normalize, OrderMode};
pub(crate) use order::{extend_normalized, missing};

/// The full transitive dependency list of one key.
pub type Closure = Vec<Key>;
