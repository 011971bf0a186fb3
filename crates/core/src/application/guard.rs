// Panic isolation for task invocation
use std::panic::{catch_unwind, UnwindSafe};
use tracing::error;

/// Result of a panic-guarded execution
#[derive(Debug)]
pub enum GuardedOutcome<T> {
    /// Execution completed (successfully or with the task's own error)
    Completed(T),
    /// Execution panicked
    Panicked(String),
}

/// Execute a closure with panic isolation.
///
/// A panicking task must never escape a deferred callback or kill a
/// background context thread; the panic is caught here and reported as a
/// failure value instead.
pub fn run_guarded<F, T>(f: F) -> GuardedOutcome<T>
where
    F: FnOnce() -> T + UnwindSafe,
{
    match catch_unwind(f) {
        Ok(result) => GuardedOutcome::Completed(result),
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };

            error!(panic_msg = %panic_msg, "Task invocation panicked");
            GuardedOutcome::Panicked(panic_msg)
        }
    }
}
