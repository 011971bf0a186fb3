// Task Executor - dual-mode execution engine
//
// One executor owns one task. At construction it decides, once, whether to
// route `send` calls through an isolated background context or through the
// deferred same-thread fallback; the route never changes afterwards. Either
// way the caller sees the same contract: `send` returns immediately, and
// exactly one of `on_result` / `on_failure` fires asynchronously per call.

use crate::application::entry_script;
use crate::application::guard::{run_guarded, GuardedOutcome};
use crate::application::probe::{self, Capabilities};
use crate::domain::{Envelope, ExecutionMode, TaskFunction};
use crate::error::OffloadError;
use crate::port::{BackgroundContext, InboundHooks, Platform, PlatformError};
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, Weak};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Handler for successful results; the executor is the explicit first
/// parameter (the calling-context contract across both modes)
pub type ResultHandler = Arc<dyn Fn(&Executor, Value) + Send + Sync>;

/// Handler for failures; same calling-context contract
pub type FailureHandler = Arc<dyn Fn(&Executor, OffloadError) + Send + Sync>;

/// Route fixed at construction: context handle present iff background mode
enum Route {
    Background(Box<dyn BackgroundContext>),
    Fallback,
}

struct Inner {
    id: Uuid,
    task: TaskFunction,
    supported: bool,
    route: Route,
    scheduler: Arc<dyn crate::port::DeferredScheduler>,
    on_result: Mutex<Option<ResultHandler>>,
    on_failure: Mutex<Option<FailureHandler>>,
}

/// Dual-mode task executor
///
/// Cloning yields another handle to the same executor instance; handlers and
/// the underlying context are shared.
#[derive(Clone)]
pub struct Executor {
    inner: Arc<Inner>,
}

impl Executor {
    /// Create an executor using the process-wide cached capability verdict
    pub fn new(task: TaskFunction, platform: Platform) -> Self {
        let capabilities = probe::cached(
            platform.script_loader.as_ref(),
            platform.spawner.as_ref(),
        );
        Self::with_capabilities(task, platform, capabilities)
    }

    /// Create an executor with an injected capability verdict.
    ///
    /// Bypasses the cached probe so either mode can be forced
    /// deterministically. Construction never fails visibly: when the verdict
    /// is positive but background setup fails anyway, the executor
    /// downgrades to fallback mode once and stays there.
    pub fn with_capabilities(
        task: TaskFunction,
        platform: Platform,
        capabilities: Capabilities,
    ) -> Self {
        let supported = capabilities.supported();
        let id = Uuid::new_v4();

        // The inbound hooks need a handle back to the executor before the
        // executor exists; new_cyclic hands them a Weak that upgrades once
        // construction completes (no message can arrive earlier, since
        // nothing has been sent).
        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let route = if supported {
                match Self::spawn_background(&platform, &task, weak) {
                    Ok(context) => Route::Background(context),
                    Err(e) => {
                        warn!(
                            executor_id = %id,
                            error = %e,
                            "Background setup failed after positive probe, downgrading to fallback mode"
                        );
                        Route::Fallback
                    }
                }
            } else {
                Route::Fallback
            };

            Inner {
                id,
                task: task.clone(),
                supported,
                route,
                scheduler: Arc::clone(&platform.scheduler),
                on_result: Mutex::new(None),
                on_failure: Mutex::new(None),
            }
        });

        let executor = Self { inner };
        info!(
            executor_id = %id,
            supported = %supported,
            mode = %executor.mode(),
            "Executor constructed"
        );
        executor
    }

    /// Render the entry script, load it, and spawn the context wired to the
    /// executor's internal inbound handlers
    fn spawn_background(
        platform: &Platform,
        task: &TaskFunction,
        weak: &Weak<Inner>,
    ) -> Result<Box<dyn BackgroundContext>, PlatformError> {
        let script = entry_script::render(task.source_text());
        let payload = platform.script_loader.build_payload(&script)?;
        let url = platform.script_loader.payload_url(&payload)?;

        let weak_msg = weak.clone();
        let weak_err = weak.clone();
        let hooks = InboundHooks {
            on_message: Box::new(move |envelope| {
                if let Some(inner) = weak_msg.upgrade() {
                    Inner::handle_reply(&inner, envelope);
                }
            }),
            on_error: Box::new(move |error| {
                if let Some(inner) = weak_err.upgrade() {
                    Inner::handle_failure(&inner, error);
                }
            }),
        };

        debug!(
            url = %url,
            script_bytes = payload.len(),
            "Loading background entry script"
        );
        platform.spawner.spawn(&url, task.clone(), hooks)
    }

    /// Capability verdict fixed at construction (stays true after a
    /// downgrade; see `mode` for the route actually taken)
    pub fn supported(&self) -> bool {
        self.inner.supported
    }

    /// Route every `send` call takes, fixed for this executor's lifetime
    pub fn mode(&self) -> ExecutionMode {
        match self.inner.route {
            Route::Background(_) => ExecutionMode::Background,
            Route::Fallback => ExecutionMode::Fallback,
        }
    }

    /// Identifier used for log correlation
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Assign the result handler; replaces any previous one. The handler
    /// effective when an outcome fires receives it, not the one assigned
    /// when `send` was called.
    pub fn set_on_result<F>(&self, handler: F)
    where
        F: Fn(&Executor, Value) + Send + Sync + 'static,
    {
        *self.inner.on_result.lock().unwrap() = Some(Arc::new(handler));
    }

    /// Drop the result handler; later results are silently discarded
    pub fn clear_on_result(&self) {
        *self.inner.on_result.lock().unwrap() = None;
    }

    /// Assign the failure handler; replaces any previous one
    pub fn set_on_failure<F>(&self, handler: F)
    where
        F: Fn(&Executor, OffloadError) + Send + Sync + 'static,
    {
        *self.inner.on_failure.lock().unwrap() = Some(Arc::new(handler));
    }

    /// Drop the failure handler; later failures are silently discarded
    pub fn clear_on_failure(&self) {
        *self.inner.on_failure.lock().unwrap() = None;
    }

    /// Collect the arguments, in order, into one envelope and dispatch it.
    ///
    /// Always returns immediately; the outcome arrives strictly later
    /// through whichever handler slot is assigned when it fires. Multiple
    /// calls are answered in order, one outcome each.
    pub fn send(&self, args: Vec<Value>) {
        let envelope = Envelope::new(args);

        match &self.inner.route {
            Route::Background(context) => {
                debug!(
                    executor_id = %self.inner.id,
                    slots = envelope.len(),
                    "Posting envelope to background context"
                );
                if let Err(e) = context.post(envelope) {
                    // Report through the deferred queue so the failure stays
                    // asynchronous, like every other outcome
                    let inner = Arc::clone(&self.inner);
                    self.inner.scheduler.schedule(Box::new(move || {
                        Inner::handle_failure(&inner, OffloadError::Platform(e));
                    }));
                }
            }
            Route::Fallback => {
                debug!(
                    executor_id = %self.inner.id,
                    slots = envelope.len(),
                    "Deferring envelope for same-thread execution"
                );
                let inner = Arc::clone(&self.inner);
                self.inner.scheduler.schedule(Box::new(move || {
                    Inner::run_deferred(&inner, envelope);
                }));
            }
        }
    }

    /// Convenience for the common single-argument call
    pub fn send_value(&self, value: Value) {
        self.send(vec![value]);
    }
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("id", &self.inner.id)
            .field("supported", &self.inner.supported)
            .field("mode", &self.mode())
            .finish()
    }
}

impl Inner {
    /// Deferred fallback invocation: run the task under the panic guard and
    /// route the outcome exactly as a background reply would be
    fn run_deferred(inner: &Arc<Inner>, envelope: Envelope) {
        let task = inner.task.clone();
        let payload = envelope.payload();

        match run_guarded(AssertUnwindSafe(move || task.call(payload))) {
            GuardedOutcome::Completed(Ok(value)) => {
                Inner::handle_reply(inner, Envelope::reply(value));
            }
            GuardedOutcome::Completed(Err(e)) => {
                Inner::handle_failure(inner, OffloadError::Task(e));
            }
            GuardedOutcome::Panicked(msg) => {
                Inner::handle_failure(inner, OffloadError::Panic(msg));
            }
        }
    }

    /// Unwrap the reply envelope and fire `on_result`, if assigned
    fn handle_reply(inner: &Arc<Inner>, envelope: Envelope) {
        let handler = inner.on_result.lock().unwrap().clone();
        match handler {
            Some(h) => {
                let executor = Executor {
                    inner: Arc::clone(inner),
                };
                h(&executor, envelope.payload());
            }
            None => {
                debug!(executor_id = %inner.id, "Result dropped: no on_result handler assigned");
            }
        }
    }

    /// Fire `on_failure`, if assigned
    fn handle_failure(inner: &Arc<Inner>, error: OffloadError) {
        let handler = inner.on_failure.lock().unwrap().clone();
        match handler {
            Some(h) => {
                let executor = Executor {
                    inner: Arc::clone(inner),
                };
                h(&executor, error);
            }
            None => {
                debug!(
                    executor_id = %inner.id,
                    error = %error,
                    "Failure dropped: no on_failure handler assigned"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskError;
    use crate::port::background::mocks::MockSpawner;
    use crate::port::scheduler::mocks::ManualScheduler;
    use crate::port::script_loader::mocks::MockScriptLoader;
    use serde_json::json;

    fn doubler() -> TaskFunction {
        TaskFunction::new("x => x * 2", |payload| {
            Ok(json!(payload.as_i64().unwrap_or(0) * 2))
        })
    }

    fn thrower() -> TaskFunction {
        TaskFunction::new("() => { throw new Error(\"boom\") }", |_| {
            Err(TaskError::new("boom"))
        })
    }

    fn panicker() -> TaskFunction {
        TaskFunction::new("() => { crash() }", |_| panic!("kaput"))
    }

    struct Harness {
        scheduler: Arc<ManualScheduler>,
        platform: Platform,
    }

    fn harness(spawner: MockSpawner) -> Harness {
        let scheduler = Arc::new(ManualScheduler::new());
        let platform = Platform::new(
            Arc::new(MockScriptLoader::new_full()),
            Arc::new(spawner),
            scheduler.clone(),
        );
        Harness {
            scheduler,
            platform,
        }
    }

    fn collected_results(executor: &Executor) -> Arc<Mutex<Vec<Value>>> {
        let results = Arc::new(Mutex::new(Vec::new()));
        let sink = results.clone();
        executor.set_on_result(move |_ex, value| sink.lock().unwrap().push(value));
        results
    }

    fn collected_failures(executor: &Executor) -> Arc<Mutex<Vec<OffloadError>>> {
        let failures = Arc::new(Mutex::new(Vec::new()));
        let sink = failures.clone();
        executor.set_on_failure(move |_ex, error| sink.lock().unwrap().push(error));
        failures
    }

    #[test]
    fn test_fallback_result_is_asynchronous() {
        let h = harness(MockSpawner::new_loopback());
        let executor =
            Executor::with_capabilities(doubler(), h.platform, Capabilities::absent());

        assert!(!executor.supported());
        assert_eq!(executor.mode(), ExecutionMode::Fallback);

        let results = collected_results(&executor);
        executor.send(vec![json!(21)]);

        // Never synchronous within send
        assert!(results.lock().unwrap().is_empty());
        assert_eq!(h.scheduler.pending(), 1);

        h.scheduler.run_all();
        assert_eq!(*results.lock().unwrap(), vec![json!(42)]);
    }

    #[test]
    fn test_fallback_task_error_fires_on_failure_only() {
        let h = harness(MockSpawner::new_loopback());
        let executor =
            Executor::with_capabilities(thrower(), h.platform, Capabilities::absent());

        let results = collected_results(&executor);
        let failures = collected_failures(&executor);

        executor.send(vec![]);
        h.scheduler.run_all();

        assert!(results.lock().unwrap().is_empty());
        let failures = failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        match &failures[0] {
            OffloadError::Task(e) => assert_eq!(e.message(), "boom"),
            other => panic!("expected task error, got {:?}", other),
        }
    }

    #[test]
    fn test_fallback_panic_is_contained_and_reported() {
        let h = harness(MockSpawner::new_loopback());
        let executor =
            Executor::with_capabilities(panicker(), h.platform, Capabilities::absent());

        let failures = collected_failures(&executor);
        executor.send(vec![json!(1)]);
        h.scheduler.run_all();

        let failures = failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(matches!(&failures[0], OffloadError::Panic(msg) if msg == "kaput"));
    }

    #[test]
    fn test_sequential_sends_answered_in_order_exactly_once() {
        let h = harness(MockSpawner::new_loopback());
        let executor =
            Executor::with_capabilities(doubler(), h.platform, Capabilities::absent());

        let results = collected_results(&executor);
        for i in 1..=5 {
            executor.send(vec![json!(i)]);
        }
        h.scheduler.run_all();

        let expected: Vec<Value> = (1..=5).map(|i| json!(i * 2)).collect();
        assert_eq!(*results.lock().unwrap(), expected);
    }

    #[test]
    fn test_handler_effective_at_fire_time_receives_outcome() {
        let h = harness(MockSpawner::new_loopback());
        let executor =
            Executor::with_capabilities(doubler(), h.platform, Capabilities::absent());

        let first = collected_results(&executor);
        executor.send(vec![json!(1)]);

        // Reassign before the deferred callback runs
        let second = Arc::new(Mutex::new(Vec::new()));
        let sink = second.clone();
        executor.set_on_result(move |_ex, value| sink.lock().unwrap().push(value));

        h.scheduler.run_all();

        assert!(first.lock().unwrap().is_empty());
        assert_eq!(*second.lock().unwrap(), vec![json!(2)]);
    }

    #[test]
    fn test_outcome_without_handler_is_dropped_silently() {
        let h = harness(MockSpawner::new_loopback());
        let executor =
            Executor::with_capabilities(doubler(), h.platform, Capabilities::absent());

        executor.send(vec![json!(5)]);
        h.scheduler.run_all();

        // A cleared handler behaves the same as a never-assigned one
        let results = collected_results(&executor);
        executor.clear_on_result();
        executor.send(vec![json!(5)]);
        h.scheduler.run_all();
        assert!(results.lock().unwrap().is_empty());
    }

    #[test]
    fn test_background_route_delivers_through_context() {
        let h = harness(MockSpawner::new_loopback());
        let executor = Executor::with_capabilities(doubler(), h.platform, Capabilities::full());

        assert!(executor.supported());
        assert_eq!(executor.mode(), ExecutionMode::Background);

        let results = collected_results(&executor);
        executor.send(vec![json!(21)]);

        // Loopback context answers inside post; nothing goes through the
        // deferred queue
        assert_eq!(h.scheduler.pending(), 0);
        assert_eq!(*results.lock().unwrap(), vec![json!(42)]);
    }

    #[test]
    fn test_background_task_error_reaches_on_failure() {
        let h = harness(MockSpawner::new_loopback());
        let executor = Executor::with_capabilities(thrower(), h.platform, Capabilities::full());

        let failures = collected_failures(&executor);
        executor.send(vec![]);

        let failures = failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(matches!(&failures[0], OffloadError::Task(e) if e.message() == "boom"));
    }

    #[test]
    fn test_spawn_failure_downgrades_to_working_fallback() {
        let h = harness(MockSpawner::new_spawn_fails("transient host failure"));
        let executor = Executor::with_capabilities(doubler(), h.platform, Capabilities::full());

        // Verdict stays positive; the route taken does not
        assert!(executor.supported());
        assert_eq!(executor.mode(), ExecutionMode::Fallback);

        let results = collected_results(&executor);
        executor.send(vec![json!(21)]);
        h.scheduler.run_all();
        assert_eq!(*results.lock().unwrap(), vec![json!(42)]);
    }

    #[test]
    fn test_post_failure_is_reported_asynchronously() {
        let h = harness(MockSpawner::new_post_fails("mailbox closed"));
        let executor = Executor::with_capabilities(doubler(), h.platform, Capabilities::full());
        assert_eq!(executor.mode(), ExecutionMode::Background);

        let failures = collected_failures(&executor);
        executor.send(vec![json!(1)]);

        // Failure is queued, not delivered inside send
        assert!(failures.lock().unwrap().is_empty());
        assert_eq!(h.scheduler.pending(), 1);

        h.scheduler.run_all();
        let failures = failures.lock().unwrap();
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0],
            OffloadError::Platform(PlatformError::PostFailed(msg)) if msg == "mailbox closed"
        ));
    }

    #[test]
    fn test_handler_calling_context_is_the_owning_executor() {
        let h = harness(MockSpawner::new_loopback());
        let executor =
            Executor::with_capabilities(doubler(), h.platform, Capabilities::absent());

        let seen_id = Arc::new(Mutex::new(None));
        let sink = seen_id.clone();
        executor.set_on_result(move |ex, _value| {
            *sink.lock().unwrap() = Some(ex.id());
        });

        executor.send(vec![json!(1)]);
        h.scheduler.run_all();

        assert_eq!(*seen_id.lock().unwrap(), Some(executor.id()));
    }

    #[test]
    fn test_executor_stays_usable_after_a_failure() {
        let h = harness(MockSpawner::new_loopback());
        let flaky = TaskFunction::new("x => maybe(x)", |payload| {
            if payload.is_null() {
                Err(TaskError::new("empty payload"))
            } else {
                Ok(payload)
            }
        });
        let executor = Executor::with_capabilities(flaky, h.platform, Capabilities::absent());

        let results = collected_results(&executor);
        let failures = collected_failures(&executor);

        executor.send(vec![]);
        executor.send(vec![json!("second")]);
        h.scheduler.run_all();

        assert_eq!(failures.lock().unwrap().len(), 1);
        assert_eq!(*results.lock().unwrap(), vec![json!("second")]);
    }
}
