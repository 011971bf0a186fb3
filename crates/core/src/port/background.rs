// Background Context Port
// Abstraction for instantiating and talking to an isolated execution context

use super::script_loader::ScriptUrl;
use crate::domain::{Envelope, TaskFunction};
use crate::error::OffloadError;
use thiserror::Error;

/// Platform-level failures around script loading and background contexts
#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Capability unavailable: {0}")]
    Unavailable(&'static str),

    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Post failed: {0}")]
    PostFailed(String),

    #[error("Script load failed: {0}")]
    LoadFailed(String),
}

/// Inbound channels of a background context, wired at spawn time.
///
/// `on_message` receives reply envelopes; `on_error` receives failures the
/// host surfaces around or inside the context. Both may be invoked from the
/// context's own thread of execution.
pub struct InboundHooks {
    pub on_message: Box<dyn Fn(Envelope) + Send + Sync>,
    pub on_error: Box<dyn Fn(OffloadError) + Send + Sync>,
}

/// Background spawner port
///
/// `available` is a pure feature probe and must never panic when the host
/// has no background-context constructor.
pub trait BackgroundSpawner: Send + Sync {
    /// Feature probe: can this host create isolated background contexts?
    fn available(&self) -> bool;

    /// Launch a context whose entry point is the generated script.
    ///
    /// Script-loading hosts dereference `entry` and execute it; native hosts
    /// run the pre-compiled `task` body under the identical message contract.
    ///
    /// # Errors
    /// - PlatformError::Unavailable if no constructor exists
    /// - PlatformError::SpawnFailed if the context cannot be started
    fn spawn(
        &self,
        entry: &ScriptUrl,
        task: TaskFunction,
        hooks: InboundHooks,
    ) -> Result<Box<dyn BackgroundContext>, PlatformError>;
}

/// Live background execution context, exclusively owned by one executor
pub trait BackgroundContext: Send + Sync {
    /// Forward one envelope to the context's message handler.
    ///
    /// Delivery is asynchronous and FIFO; the context handles one envelope
    /// synchronously to completion before accepting the next.
    ///
    /// # Errors
    /// - PlatformError::PostFailed if the context can no longer accept mail
    fn post(&self, envelope: Envelope) -> Result<(), PlatformError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use crate::application::guard::{run_guarded, GuardedOutcome};
    use std::panic::AssertUnwindSafe;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Mock spawner behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Spawn a loopback context that runs the task synchronously on post
        Loopback,
        /// Report the capability as present but fail every spawn
        SpawnFails(String),
        /// Spawn a context that rejects every post
        PostFails(String),
        /// Report the capability as absent
        Unavailable,
    }

    /// Mock background spawner for testing
    pub struct MockSpawner {
        behavior: MockBehavior,
        spawn_count: Arc<AtomicUsize>,
    }

    impl MockSpawner {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior,
                spawn_count: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn new_loopback() -> Self {
            Self::new(MockBehavior::Loopback)
        }

        pub fn new_unavailable() -> Self {
            Self::new(MockBehavior::Unavailable)
        }

        pub fn new_spawn_fails(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::SpawnFails(message.into()))
        }

        pub fn new_post_fails(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::PostFails(message.into()))
        }

        pub fn spawn_count(&self) -> usize {
            self.spawn_count.load(Ordering::SeqCst)
        }
    }

    impl BackgroundSpawner for MockSpawner {
        fn available(&self) -> bool {
            !matches!(self.behavior, MockBehavior::Unavailable)
        }

        fn spawn(
            &self,
            _entry: &ScriptUrl,
            task: TaskFunction,
            hooks: InboundHooks,
        ) -> Result<Box<dyn BackgroundContext>, PlatformError> {
            self.spawn_count.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                MockBehavior::Loopback => Ok(Box::new(LoopbackContext { task, hooks })),
                MockBehavior::SpawnFails(msg) => Err(PlatformError::SpawnFailed(msg.clone())),
                MockBehavior::PostFails(msg) => Ok(Box::new(DeafContext {
                    message: msg.clone(),
                })),
                MockBehavior::Unavailable => {
                    Err(PlatformError::Unavailable("background contexts"))
                }
            }
        }
    }

    /// Context that handles each envelope synchronously inside `post`.
    ///
    /// Only for tests: real contexts deliver asynchronously, but running the
    /// task inline makes the message protocol deterministic to assert on.
    pub struct LoopbackContext {
        task: TaskFunction,
        hooks: InboundHooks,
    }

    /// Context that accepts no mail at all
    pub struct DeafContext {
        message: String,
    }

    impl BackgroundContext for DeafContext {
        fn post(&self, _envelope: Envelope) -> Result<(), PlatformError> {
            Err(PlatformError::PostFailed(self.message.clone()))
        }
    }

    impl BackgroundContext for LoopbackContext {
        fn post(&self, envelope: Envelope) -> Result<(), PlatformError> {
            let task = self.task.clone();
            let payload = envelope.payload();
            match run_guarded(AssertUnwindSafe(move || task.call(payload))) {
                GuardedOutcome::Completed(Ok(value)) => {
                    (self.hooks.on_message)(Envelope::reply(value));
                }
                GuardedOutcome::Completed(Err(e)) => {
                    (self.hooks.on_error)(OffloadError::Task(e));
                }
                GuardedOutcome::Panicked(msg) => {
                    (self.hooks.on_error)(OffloadError::Panic(msg));
                }
            }
            Ok(())
        }
    }
}
