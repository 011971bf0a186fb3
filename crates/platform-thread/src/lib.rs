// Offload Platform Adapters - native hosts
//
// Implements the core's platform ports with dedicated OS threads: one
// isolated thread per background context, an in-memory object-URL analogue
// for entry scripts, and FIFO deferred schedulers (dedicated-thread and
// Tokio-hosted variants).

mod memory_script_loader;
mod queue_scheduler;
mod thread_spawner;
mod tokio_scheduler;

pub use memory_script_loader::MemoryScriptLoader;
pub use queue_scheduler::QueueScheduler;
pub use thread_spawner::ThreadSpawner;
pub use tokio_scheduler::TokioScheduler;

use offload_core::port::Platform;
use std::sync::Arc;

/// Platform bundle wired with the native adapters.
///
/// On native hosts every capability is present, so executors built on this
/// bundle run in background mode.
pub fn native_platform() -> Platform {
    Platform::new(
        Arc::new(MemoryScriptLoader::new()),
        Arc::new(ThreadSpawner::new()),
        Arc::new(QueueScheduler::new()),
    )
}
