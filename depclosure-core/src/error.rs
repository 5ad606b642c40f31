//! Error types for closure maintenance.

use thiserror::Error;

use crate::graph::Key;

/// Errors produced by the closure engine and its configuration layer.
#[derive(Debug, Error)]
pub enum ClosureError {
    /// The closure computed for `key` would contain `key` itself.
    ///
    /// Raised for the key being added, or for an ancestor that propagation
    /// tried to extend.
    #[error("dependency conflict: `{key}` would depend on itself")]
    Conflict { key: Key },

    /// A configuration document could not be parsed.
    #[error("invalid engine configuration: {0}")]
    Config(#[from] serde_json::Error),
}

impl ClosureError {
    /// The key whose closure would have contained itself, if this is a conflict.
    pub fn conflicting_key(&self) -> Option<&Key> {
        match self {
            Self::Conflict { key } => Some(key),
            Self::Config(_) => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = ClosureError> = std::result::Result<T, E>;
