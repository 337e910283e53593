// SPDX-License-Identifier: MIT

//! The protocol state machine: orders intake and execution.
//!
//! The machine runs on its own driver task. Events are pushed onto an
//! unbounded channel and consumed serially, so there is exactly one writer
//! of the current state and exactly one caller of entry hooks at a time.
//! External readers observe the state through a `parking_lot::Mutex` read
//! lock, which never blocks on the driver.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One step in the intake/execution protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum State {
    Idle,
    ReceivingManifest,
    ReceivingAlgorithm,
    ReceivingData,
    Running,
    ResultsReady,
    Complete,
}

crate::simple_display! {
    State {
        Idle => "idle",
        ReceivingManifest => "receivingManifest",
        ReceivingAlgorithm => "receivingAlgorithm",
        ReceivingData => "receivingData",
        Running => "running",
        ResultsReady => "resultsReady",
        Complete => "complete",
    }
}

/// External trigger that may advance the machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateEvent {
    Start,
    ManifestReceived,
    AlgorithmReceived,
    DataReceived,
    RunComplete,
    ResultsConsumed,
}

impl State {
    /// Applies the transition table. Pairs not listed here are no-ops —
    /// the service is responsible for rejecting operations outside their
    /// permitted state before an event ever reaches the machine.
    fn advance(self, event: StateEvent) -> State {
        use State::*;
        use StateEvent::*;
        match (self, event) {
            (Idle, Start) => ReceivingManifest,
            (ReceivingManifest, ManifestReceived) => ReceivingAlgorithm,
            (ReceivingAlgorithm, AlgorithmReceived) => ReceivingData,
            (ReceivingData, DataReceived) => Running,
            (Running, RunComplete) => ResultsReady,
            (ResultsReady, ResultsConsumed) => Complete,
            (other, _) => other,
        }
    }
}

/// A state-entry side effect, run on the driver task before it accepts the
/// next event. Boxed and type-erased because the service registers one
/// hook per state at construction, each closing over different service
/// state (the `running` hook in particular closes over the runner).
pub type EntryHook = Box<dyn Fn(State) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Handle to a running state machine driver.
///
/// Cloning shares the same underlying state and event channel; the driver
/// task itself is not cloned and stops once every handle's sender is
/// dropped or the cancellation token fires.
#[derive(Clone)]
pub struct StateMachine {
    state: Arc<Mutex<State>>,
    sender: mpsc::UnboundedSender<StateEvent>,
}

impl StateMachine {
    /// Spawns the driver task and returns a handle. `hooks` fires on entry
    /// to the keyed state; states with no registered hook are silent.
    pub fn spawn(hooks: HashMap<State, EntryHook>, cancel: CancellationToken) -> Self {
        let state = Arc::new(Mutex::new(State::Idle));
        let (sender, mut receiver) = mpsc::unbounded_channel::<StateEvent>();
        let driver_state = Arc::clone(&state);

        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = receiver.recv() => match event {
                        Some(event) => event,
                        None => break,
                    },
                };

                let transitioned = {
                    let mut guard = driver_state.lock();
                    let next = guard.advance(event);
                    let changed = next != *guard;
                    *guard = next;
                    changed.then_some(next)
                };

                if let Some(next) = transitioned {
                    if let Some(hook) = hooks.get(&next) {
                        hook(next).await;
                    }
                }
            }
        });

        Self { state, sender }
    }

    /// The current state, read without blocking the driver.
    pub fn current(&self) -> State {
        *self.state.lock()
    }

    /// Enqueues an event for the driver. Events on an already-stopped
    /// driver are logged and dropped rather than returned as an error —
    /// by the time that happens the agent is tearing down anyway.
    pub fn send(&self, event: StateEvent) {
        if self.sender.send(event).is_err() {
            tracing::warn!(?event, "state machine driver has stopped, dropping event");
        }
    }
}

#[cfg(test)]
#[path = "state_machine_tests.rs"]
mod tests;
