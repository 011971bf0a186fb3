// Port Layer - Interfaces for platform primitives

pub mod background;
pub mod scheduler;
pub mod script_loader;

// Re-exports
pub use background::{BackgroundContext, BackgroundSpawner, InboundHooks, PlatformError};
pub use scheduler::{DeferredCallback, DeferredScheduler};
pub use script_loader::{ScriptLoader, ScriptPayload, ScriptUrl};

use std::sync::Arc;

/// Bundle of platform ports injected into an executor.
///
/// The three handles are the executor's only view of the host: how to turn
/// source text into loadable code, how to spin up an isolated execution
/// context, and how to defer a callback to the soonest turn of the host's
/// task queue.
#[derive(Clone)]
pub struct Platform {
    pub script_loader: Arc<dyn ScriptLoader>,
    pub spawner: Arc<dyn BackgroundSpawner>,
    pub scheduler: Arc<dyn DeferredScheduler>,
}

impl Platform {
    pub fn new(
        script_loader: Arc<dyn ScriptLoader>,
        spawner: Arc<dyn BackgroundSpawner>,
        scheduler: Arc<dyn DeferredScheduler>,
    ) -> Self {
        Self {
            script_loader,
            spawner,
            scheduler,
        }
    }
}
