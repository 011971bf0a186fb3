// Execution Mode Domain Model

use serde::{Deserialize, Serialize};

/// Route an executor takes for every `send` call.
///
/// Decided exactly once, at construction, and never changes for the lifetime
/// of the executor instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionMode {
    /// Isolated background execution context with its own memory
    Background,
    /// Deferred same-thread emulation of the same asynchronous contract
    Fallback,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionMode::Background => write!(f, "BACKGROUND"),
            ExecutionMode::Fallback => write!(f, "FALLBACK"),
        }
    }
}
