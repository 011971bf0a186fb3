// Dedicated-thread deferred scheduler
//
// The native analogue of a zero-delay host task queue: callbacks go onto an
// mpsc channel and a single drainer thread runs them in FIFO order. Running
// on its own thread guarantees a callback never executes synchronously
// inside `schedule`.

use offload_core::application::{run_guarded, GuardedOutcome};
use offload_core::port::{DeferredCallback, DeferredScheduler};
use std::panic::AssertUnwindSafe;
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread;
use tracing::{debug, error};

/// FIFO deferred scheduler backed by one drainer thread
pub struct QueueScheduler {
    tx: Mutex<Sender<DeferredCallback>>,
}

impl QueueScheduler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel::<DeferredCallback>();

        // The drainer exits when every sender is gone (scheduler dropped and
        // no callbacks left in flight)
        thread::Builder::new()
            .name("offload-deferred".to_string())
            .spawn(move || {
                while let Ok(callback) = rx.recv() {
                    // A panicking callback must not kill the queue
                    if let GuardedOutcome::Panicked(msg) =
                        run_guarded(AssertUnwindSafe(callback))
                    {
                        error!(panic_msg = %msg, "Deferred callback panicked");
                    }
                }
                debug!("Deferred queue drained, shutting down");
            })
            .expect("failed to spawn deferred queue thread");

        Self { tx: Mutex::new(tx) }
    }
}

impl Default for QueueScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredScheduler for QueueScheduler {
    fn schedule(&self, callback: DeferredCallback) {
        // Send only fails when the drainer is gone, which only happens at
        // process teardown; dropping the callback then is harmless
        let _ = self.tx.lock().unwrap().send(callback);
    }
}
