// Offload Core - Domain Logic & Ports
// NO platform dependencies (hexagonal layout)
//
// One executor runs one user task, either in an isolated background
// execution context (when the host platform supports it) or in a deferred
// same-thread fallback emulating the same asynchronous message contract.

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use application::{Capabilities, Executor};
pub use error::{OffloadError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
