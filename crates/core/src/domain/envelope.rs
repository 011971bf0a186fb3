// Message Envelope Domain Model

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Ordered bundle of argument values transmitted per `send` call.
///
/// Exactly one envelope crosses the executor boundary per call, regardless of
/// how many arguments were collected. The background context extracts the
/// single logical payload from the first slot; replies travel back as
/// single-slot envelopes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope(Vec<Value>);

impl Envelope {
    /// Create an envelope from the collected `send` arguments, in order
    pub fn new(args: Vec<Value>) -> Self {
        Self(args)
    }

    /// Create a single-slot reply envelope carrying a task result
    pub fn reply(value: Value) -> Self {
        Self(vec![value])
    }

    /// Extract the single logical payload: the first slot, or `Null` when
    /// the envelope is empty
    pub fn payload(&self) -> Value {
        self.0.first().cloned().unwrap_or(Value::Null)
    }

    /// All argument slots, in send order
    pub fn args(&self) -> &[Value] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
