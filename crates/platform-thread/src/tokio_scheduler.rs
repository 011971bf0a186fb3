// Tokio-hosted deferred scheduler
//
// For applications already running on a Tokio runtime: callbacks go onto an
// unbounded channel drained by a single spawned task, so FIFO ordering holds
// even though the runtime itself makes no ordering promise across spawns.

use offload_core::application::{run_guarded, GuardedOutcome};
use offload_core::port::{DeferredCallback, DeferredScheduler};
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tracing::{debug, error};

/// FIFO deferred scheduler living on a Tokio runtime
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<DeferredCallback>,
}

impl TokioScheduler {
    /// Create the scheduler and spawn its drainer task.
    ///
    /// Must be called from within a Tokio runtime. Callbacks run on the
    /// runtime, so they should stay short; a long-running task function
    /// belongs in background mode, not in fallback callbacks.
    pub fn new() -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<DeferredCallback>();

        tokio::spawn(async move {
            while let Some(callback) = rx.recv().await {
                if let GuardedOutcome::Panicked(msg) = run_guarded(AssertUnwindSafe(callback)) {
                    error!(panic_msg = %msg, "Deferred callback panicked");
                }
            }
            debug!("Deferred queue drained, shutting down");
        });

        Self { tx }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredScheduler for TokioScheduler {
    fn schedule(&self, callback: DeferredCallback) {
        let _ = self.tx.send(callback);
    }
}
