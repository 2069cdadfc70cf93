//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::trace::TraceMode;

/// Settings applied when an engine is constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Diagnostic trace destination.
    pub trace: TraceMode,
}

impl EngineConfig {
    /// Configuration with the trace routed to `mode`.
    pub fn with_trace(mut self, mode: TraceMode) -> Self {
        self.trace = mode;
        self
    }
}
