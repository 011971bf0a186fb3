// Task Function Domain Model

use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Error value a task returns in place of throwing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TaskError(String);

impl TaskError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

/// Result of one task invocation
pub type TaskResult = std::result::Result<Value, TaskError>;

/// The user-supplied task: one logical payload in, one result out.
///
/// Carries both the callable body and its literal source text. The source
/// text is bound into the generated entry script so script-loading hosts can
/// reconstruct the task inside the background context; native hosts move a
/// clone of the body instead.
///
/// # Contract
///
/// The task must be self-contained: no captured mutable state, no reliance
/// on caller-side ambience. It may run in an isolated context where captured
/// references would be meaningless, so the body is `Fn` (never `FnMut`) and
/// anything it closes over is duplicated into the context, not shared.
#[derive(Clone)]
pub struct TaskFunction {
    source: Arc<str>,
    body: Arc<dyn Fn(Value) -> TaskResult + Send + Sync>,
}

impl TaskFunction {
    /// Create a task from its source text and callable body
    pub fn new<F>(source: impl Into<String>, body: F) -> Self
    where
        F: Fn(Value) -> TaskResult + Send + Sync + 'static,
    {
        Self {
            source: source.into().into(),
            body: Arc::new(body),
        }
    }

    /// Invoke the task with the logical payload of one envelope
    pub fn call(&self, payload: Value) -> TaskResult {
        (self.body)(payload)
    }

    /// Literal source text, as bound into the entry script
    pub fn source_text(&self) -> &str {
        &self.source
    }
}

impl fmt::Debug for TaskFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskFunction")
            .field("source", &self.source)
            .finish_non_exhaustive()
    }
}
