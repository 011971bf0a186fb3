// Deferred Scheduler Port (for the fallback route and deferred failure
// reporting)

/// Callback deferred to the soonest turn of the host's task queue
pub type DeferredCallback = Box<dyn FnOnce() + Send>;

/// Deferred scheduler port
///
/// Implementations guarantee the callback never runs synchronously inside
/// `schedule` and that callbacks scheduled from one thread run in FIFO
/// order. This is what keeps the fallback route timing-indistinguishable
/// from a real background context.
pub trait DeferredScheduler: Send + Sync {
    fn schedule(&self, callback: DeferredCallback);
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scheduler whose queue is drained explicitly by the test.
    ///
    /// Lets tests observe the window between `send` returning and the
    /// deferred callback running, which real schedulers race through.
    #[derive(Default)]
    pub struct ManualScheduler {
        queue: Mutex<VecDeque<DeferredCallback>>,
    }

    impl ManualScheduler {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of callbacks waiting
        pub fn pending(&self) -> usize {
            self.queue.lock().unwrap().len()
        }

        /// Run the oldest waiting callback; returns false when none waited
        pub fn run_next(&self) -> bool {
            let callback = self.queue.lock().unwrap().pop_front();
            match callback {
                Some(cb) => {
                    cb();
                    true
                }
                None => false,
            }
        }

        /// Drain the queue in FIFO order, including callbacks scheduled by
        /// the callbacks themselves
        pub fn run_all(&self) {
            while self.run_next() {}
        }
    }

    impl DeferredScheduler for ManualScheduler {
        fn schedule(&self, callback: DeferredCallback) {
            self.queue.lock().unwrap().push_back(callback);
        }
    }
}
