//! Closure Engine
//!
//! This module contains the orchestrator that turns direct dependency
//! declarations into stored closures, plus its configuration and a
//! lock-wrapped handle for shared use.
//!
//! # Control Flow
//!
//! ```text
//! add_dependency(key, direct)
//!   -> merge direct + known closures of each direct dependency
//!   -> conflict check (key in its own closure?)
//!   -> Backend::set(key, closure)
//!   -> Backend::update(key, closure)   // extend every ancestor
//! ```
//!
//! The engine never touches the primary map directly; all reads and writes
//! go through the [`Backend`](crate::store::Backend) it owns.

mod closure;
mod config;
mod shared;

pub use closure::ClosureEngine;
pub use config::EngineConfig;
pub use shared::SharedEngine;
