// Shared support for the end-to-end contract tests

use offload_core::{Executor, OffloadError};
use serde_json::Value;
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;

/// One `send` outcome: exactly one of result or failure
pub type Outcome = Result<Value, OffloadError>;

/// Wire both handler slots of an executor into one channel of outcomes
pub fn outcome_channel(executor: &Executor) -> Receiver<Outcome> {
    let (tx, rx) = std::sync::mpsc::channel();
    let err_tx = tx.clone();

    executor.set_on_result(move |_ex, value| {
        let _ = tx.send(Ok(value));
    });
    executor.set_on_failure(move |_ex, error| {
        let _ = err_tx.send(Err(error));
    });

    rx
}

/// Block for the next outcome, failing loudly on a stuck executor
pub fn next_outcome(rx: &Receiver<Outcome>) -> Outcome {
    rx.recv_timeout(Duration::from_secs(5))
        .expect("no outcome arrived within 5s")
}

/// Assert that no further outcome arrives within a short grace window
pub fn assert_no_outcome(rx: &Receiver<Outcome>) {
    match rx.recv_timeout(Duration::from_millis(200)) {
        Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {}
        Ok(outcome) => panic!("unexpected outcome: {:?}", outcome),
    }
}
