//! Dual-Mode Executor Example
//!
//! Runs one task through the native platform (background mode) and again
//! with background capabilities forced off (fallback mode); both routes
//! answer through the same handler contract.
//!
//! # Usage
//!
//! ```bash
//! RUST_LOG=debug cargo run --example double
//! ```

use offload_core::domain::TaskFunction;
use offload_core::{Capabilities, Executor, OffloadError};
use offload_platform_thread::native_platform;
use serde_json::{json, Value};
use std::sync::mpsc;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("Offload - Dual-Mode Executor Example");
    println!("=====================================\n");

    let task = TaskFunction::new("x => x * 2", |payload: Value| {
        Ok(json!(payload.as_i64().unwrap_or(0) * 2))
    });

    // 1. Background mode: every native capability is present
    println!("1. Background mode...");
    let executor = Executor::new(task.clone(), native_platform());
    println!("   - supported: {}", executor.supported());
    println!("   - mode: {}", executor.mode());
    println!("   - send(21) -> {}\n", await_result(&executor, json!(21))?);

    // 2. Fallback mode: force the verdict off; same contract, same answer
    println!("2. Fallback mode (capabilities forced off)...");
    let executor = Executor::with_capabilities(task, native_platform(), Capabilities::absent());
    println!("   - supported: {}", executor.supported());
    println!("   - mode: {}", executor.mode());
    println!("   - send(21) -> {}\n", await_result(&executor, json!(21))?);

    println!("Done.");
    Ok(())
}

/// Send one value and block until its outcome callback fires
fn await_result(executor: &Executor, value: Value) -> anyhow::Result<Value> {
    let (tx, rx) = mpsc::channel();
    let err_tx = tx.clone();

    executor.set_on_result(move |_ex, result| {
        let _ = tx.send(Ok(result));
    });
    executor.set_on_failure(move |_ex, error: OffloadError| {
        let _ = err_tx.send(Err(error));
    });

    executor.send(vec![value]);
    let outcome = rx.recv_timeout(Duration::from_secs(5))?;
    Ok(outcome.map_err(anyhow::Error::new)?)
}
