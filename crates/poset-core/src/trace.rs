//! Diagnostic trace of engine calls.
//!
//! When enabled, every public operation emits one line describing the call
//! and one line describing its outcome, e.g.
//!
//! ```text
//! poset_add(0, "A", "B")
//! poset_add: poset 0, relation ("A", "B") added
//! ```
//!
//! The trace is a side channel only; no operation depends on it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where trace lines go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceMode {
    /// Discard trace output.
    #[default]
    Off,
    /// Write each line to standard error.
    Stderr,
    /// Keep lines in memory, retrievable with [`Trace::lines`].
    Memory,
}

impl fmt::Display for TraceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TraceMode::Off => "off",
            TraceMode::Stderr => "stderr",
            TraceMode::Memory => "memory",
        };
        f.write_str(s)
    }
}

/// Trace sink owned by an engine.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    mode: TraceMode,
    lines: Vec<String>,
}

impl Trace {
    /// Create a trace in the given mode.
    pub fn new(mode: TraceMode) -> Self {
        Self {
            mode,
            lines: Vec::new(),
        }
    }

    /// Current mode.
    pub fn mode(&self) -> TraceMode {
        self.mode
    }

    /// Switch modes. Lines already captured in memory are kept.
    pub fn set_mode(&mut self, mode: TraceMode) {
        self.mode = mode;
    }

    /// Whether lines are being recorded anywhere.
    pub fn enabled(&self) -> bool {
        self.mode != TraceMode::Off
    }

    /// Emit one line. The closure only runs when the trace is enabled.
    pub fn emit(&mut self, line: impl FnOnce() -> String) {
        match self.mode {
            TraceMode::Off => {}
            TraceMode::Stderr => eprintln!("{}", line()),
            TraceMode::Memory => self.lines.push(line()),
        }
    }

    /// Lines captured in [`TraceMode::Memory`].
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Take the captured lines, leaving the buffer empty.
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

/// Render an optional label the way call lines show it: quoted, or `NULL`.
pub fn quote(label: Option<&str>) -> String {
    match label {
        Some(l) => format!("\"{l}\""),
        None => "NULL".to_string(),
    }
}
