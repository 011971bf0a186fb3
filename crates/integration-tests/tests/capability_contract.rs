//! Capability probing and the downgrade policy, across real and mock ports.

use offload_core::domain::{ExecutionMode, TaskFunction};
use offload_core::port::background::mocks::MockSpawner;
use offload_core::port::script_loader::mocks::MockScriptLoader;
use offload_core::port::Platform;
use offload_core::{Capabilities, Executor};
use offload_integration_tests::{next_outcome, outcome_channel};
use offload_platform_thread::{MemoryScriptLoader, QueueScheduler, ThreadSpawner};
use serde_json::json;
use std::sync::Arc;

fn doubler() -> TaskFunction {
    TaskFunction::new("x => x * 2", |payload| {
        Ok(json!(payload.as_i64().unwrap_or(0) * 2))
    })
}

#[test]
fn test_native_adapters_answer_every_probe() {
    let caps = Capabilities::detect(&MemoryScriptLoader::new(), &ThreadSpawner::new());
    assert!(caps.script_payloads);
    assert!(caps.loadable_urls);
    assert!(caps.background_contexts);
    assert!(caps.supported());
}

#[test]
fn test_any_single_missing_capability_forces_fallback() {
    let verdicts = [
        Capabilities {
            script_payloads: false,
            loadable_urls: true,
            background_contexts: true,
        },
        Capabilities {
            script_payloads: true,
            loadable_urls: false,
            background_contexts: true,
        },
        Capabilities {
            script_payloads: true,
            loadable_urls: true,
            background_contexts: false,
        },
    ];

    for caps in verdicts {
        assert!(!caps.supported());

        let platform = Platform::new(
            Arc::new(MemoryScriptLoader::new()),
            Arc::new(ThreadSpawner::new()),
            Arc::new(QueueScheduler::new()),
        );
        let executor = Executor::with_capabilities(doubler(), platform, caps);

        assert!(!executor.supported());
        assert_eq!(executor.mode(), ExecutionMode::Fallback);

        let rx = outcome_channel(&executor);
        executor.send(vec![json!(21)]);
        assert_eq!(next_outcome(&rx).unwrap(), json!(42));
    }
}

#[test]
fn test_absent_host_probes_without_panicking() {
    let caps = Capabilities::detect(
        &MockScriptLoader::new_absent(),
        &MockSpawner::new_unavailable(),
    );
    assert!(!caps.supported());
}

#[test]
fn test_spawn_failure_after_positive_probe_downgrades_once() {
    let spawner = Arc::new(MockSpawner::new_spawn_fails("host refused"));
    let platform = Platform::new(
        Arc::new(MemoryScriptLoader::new()),
        spawner.clone(),
        Arc::new(QueueScheduler::new()),
    );
    let executor = Executor::with_capabilities(doubler(), platform, Capabilities::full());

    // One spawn attempt at construction, none afterwards
    assert_eq!(spawner.spawn_count(), 1);
    assert!(executor.supported());
    assert_eq!(executor.mode(), ExecutionMode::Fallback);

    let rx = outcome_channel(&executor);
    executor.send(vec![json!(21)]);
    executor.send(vec![json!(4)]);
    assert_eq!(next_outcome(&rx).unwrap(), json!(42));
    assert_eq!(next_outcome(&rx).unwrap(), json!(8));
    assert_eq!(spawner.spawn_count(), 1);
}

#[test]
fn test_no_capability_send_without_handlers_is_inert() {
    let platform = Platform::new(
        Arc::new(MockScriptLoader::new_absent()),
        Arc::new(MockSpawner::new_unavailable()),
        Arc::new(QueueScheduler::new()),
    );
    let executor = Executor::with_capabilities(doubler(), platform, Capabilities::absent());

    // Completes without throwing and without observable callback
    executor.send(vec![json!(5)]);
    std::thread::sleep(std::time::Duration::from_millis(100));
}
