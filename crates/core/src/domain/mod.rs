// Domain Layer - Pure types and entities

pub mod envelope;
pub mod mode;
pub mod task;

// Re-exports
pub use envelope::Envelope;
pub use mode::ExecutionMode;
pub use task::{TaskError, TaskFunction, TaskResult};
