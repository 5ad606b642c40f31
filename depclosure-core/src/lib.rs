//! Depclosure Core
//!
//! This crate maintains, for a set of named nodes, the full transitive
//! closure of a "depends-on" relation. Direct dependency edges are added
//! incrementally, and every stored key always maps to the complete set of
//! keys it depends on, directly or indirectly.
//!
//! It implements:
//!
//! - Incremental closure maintenance with cycle rejection
//! - Pluggable storage strategies (full scan, or reverse ancestor index)
//! - Configurable closure ordering (append, ascending, descending)
//! - An edge-list text codec for loading and printing closures
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Keys, closures, and the merge/order policy
//! - `store`: The `Backend` trait and its two strategies
//! - `engine`: The closure engine, its configuration, and a shared handle
//! - `codec`: Edge-list decoding and closure encoding
//!
//! # Example
//!
//! ```rust
//! use depclosure_core::{keys, ClosureEngine, OrderMode};
//!
//! let mut engine = ClosureEngine::scanning().with_order(OrderMode::Append);
//!
//! assert!(engine.add_dependency("A", ["D", "C"]));
//! assert!(engine.add_dependency("D", ["E", "F"]));
//! assert_eq!(engine.closure("A").unwrap(), keys(["D", "C", "E", "F"]).as_slice());
//!
//! // A key may not depend on itself.
//! assert!(!engine.add_dependency("E", ["A"]));
//! ```

pub mod codec;
pub mod engine;
pub mod error;
pub mod graph;
pub mod store;

pub use codec::{resolve_lines, EdgeListCodec};
pub use engine::{ClosureEngine, EngineConfig, SharedEngine};
pub use error::{ClosureError, Result};
pub use graph::{keys, merge, normalize, Closure, Key, OrderMode};
pub use store::{Backend, BackendKind, DynBackend, IndexedBackend, ScanningBackend};
