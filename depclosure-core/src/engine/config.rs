//! Engine Configuration
//!
//! Everything an embedding application chooses about an engine: the
//! storage strategy, the order policy, the conflict policy, and the
//! separators used by the edge-list codec.
//!
//! Configurations are plain serde structs. Missing fields take their
//! defaults, so `{}` is a valid document.

use serde::{Deserialize, Serialize};

use crate::codec::EdgeListCodec;
use crate::error::Result;
use crate::graph::OrderMode;
use crate::store::BackendKind;

/// Settings for building a [`ClosureEngine`](super::ClosureEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Storage strategy.
    pub backend: BackendKind,

    /// Order applied to every closure.
    pub order: OrderMode,

    /// Admit keys that would transitively depend on themselves.
    pub allows_conflict: bool,

    /// Field separator for edge-list input.
    pub input_separator: String,

    /// Separator used when joining closures for output.
    pub output_separator: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            order: OrderMode::default(),
            allows_conflict: false,
            input_separator: " ".to_owned(),
            output_separator: " ".to_owned(),
        }
    }
}

impl EngineConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The codec matching this configuration's separators.
    pub fn codec(&self) -> EdgeListCodec {
        EdgeListCodec::new(&self.input_separator, &self.output_separator)
    }
}
