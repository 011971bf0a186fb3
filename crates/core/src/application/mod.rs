// Application Layer - Executor, Capability Probe, Entry Script

pub mod entry_script;
pub mod executor;
pub mod guard;
pub mod probe;

// Re-exports
pub use executor::{Executor, FailureHandler, ResultHandler};
pub use guard::{run_guarded, GuardedOutcome};
pub use probe::Capabilities;
