// Thread-backed background contexts
//
// One dedicated OS thread per context: its own stack, no shared mutable
// state with the caller beyond the envelopes themselves. The context loop
// handles one envelope synchronously to completion before accepting the
// next, so replies preserve send order.

use offload_core::application::{run_guarded, GuardedOutcome};
use offload_core::domain::{Envelope, TaskFunction};
use offload_core::port::{
    BackgroundContext, BackgroundSpawner, InboundHooks, PlatformError, ScriptUrl,
};
use offload_core::OffloadError;
use std::panic::AssertUnwindSafe;
use std::sync::mpsc::{self, Sender};
use std::sync::Mutex;
use std::thread;
use tracing::{debug, info};
use uuid::Uuid;

/// Spawner creating one isolated thread per background context
#[derive(Default)]
pub struct ThreadSpawner;

impl ThreadSpawner {
    pub fn new() -> Self {
        Self
    }
}

impl BackgroundSpawner for ThreadSpawner {
    fn available(&self) -> bool {
        true
    }

    fn spawn(
        &self,
        entry: &ScriptUrl,
        task: TaskFunction,
        hooks: InboundHooks,
    ) -> Result<Box<dyn BackgroundContext>, PlatformError> {
        let context_id = Uuid::new_v4();
        let (tx, rx) = mpsc::channel::<Envelope>();

        thread::Builder::new()
            .name(format!("offload-ctx-{}", context_id.simple()))
            .spawn(move || context_loop(context_id, rx, task, hooks))
            .map_err(|e| PlatformError::SpawnFailed(e.to_string()))?;

        info!(context_id = %context_id, entry = %entry, "Background context started");
        Ok(Box::new(ThreadContext {
            context_id,
            tx: Mutex::new(tx),
        }))
    }
}

/// Message loop running inside the context thread.
///
/// Exits when the sending half closes, which happens when the owning
/// executor drops its context handle; there is no explicit teardown call.
fn context_loop(
    context_id: Uuid,
    rx: mpsc::Receiver<Envelope>,
    task: TaskFunction,
    hooks: InboundHooks,
) {
    while let Ok(envelope) = rx.recv() {
        let payload = envelope.payload();
        let task = task.clone();

        match run_guarded(AssertUnwindSafe(move || task.call(payload))) {
            GuardedOutcome::Completed(Ok(value)) => {
                (hooks.on_message)(Envelope::reply(value));
            }
            GuardedOutcome::Completed(Err(e)) => {
                (hooks.on_error)(OffloadError::Task(e));
            }
            GuardedOutcome::Panicked(msg) => {
                (hooks.on_error)(OffloadError::Panic(msg));
            }
        }
    }

    debug!(context_id = %context_id, "Background context drained, shutting down");
}

/// Handle to a live context thread
struct ThreadContext {
    context_id: Uuid,
    tx: Mutex<Sender<Envelope>>,
}

impl BackgroundContext for ThreadContext {
    fn post(&self, envelope: Envelope) -> Result<(), PlatformError> {
        self.tx
            .lock()
            .unwrap()
            .send(envelope)
            .map_err(|_| PlatformError::PostFailed(format!("context {} gone", self.context_id)))
    }
}
