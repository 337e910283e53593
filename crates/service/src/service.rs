// SPDX-License-Identifier: MIT

//! The intake/delivery service: `SubmitAlgorithm`, `SubmitDataset`,
//! `FetchResult`, `Attest`. Guards every call against the current state,
//! verifies digests, stages artifacts, and drives the state machine.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;
use teeagent_core::{
    AgentError, AgentEvent, Computation, EntryHook, EventPublisher, EventStatus, State,
    StateEvent, StateMachine,
};
use teeagent_staging::{ArtifactKind, Staging};
use teeagent_wire::CallContext;
use tokio_util::sync::CancellationToken;

use crate::digest_task::hash_owned;
use crate::quote::{QuoteError, QuoteProvider};
use crate::state::ServiceState;

struct Inner {
    computation: Computation,
    staging: Staging,
    state: Mutex<ServiceState>,
    publisher: Arc<dyn EventPublisher>,
    cancel: CancellationToken,
    /// Set once, immediately after `StateMachine::spawn` returns, so the
    /// `running` entry hook (built before the machine exists) can send
    /// `RunComplete` back into it once the computation finishes. By the
    /// time `running` is ever entered, construction has long completed.
    sm: OnceLock<StateMachine>,
}

impl Inner {
    fn sm(&self) -> &StateMachine {
        self.sm.get().expect("state machine set immediately after construction")
    }
}

/// Ties the manifest, staging, runner, and state machine together behind
/// the four-operation surface a transport adapter calls into.
pub struct AgentService {
    inner: Arc<Inner>,
    quote_provider: Arc<dyn QuoteProvider>,
}

impl AgentService {
    /// Builds the service and immediately starts the protocol: the
    /// manifest is already known at construction (the manifest loader is
    /// an external collaborator producing `Computation` before the agent
    /// exists), so `start` and `manifestReceived` fire right away,
    /// landing the machine in `receivingAlgorithm`.
    pub fn new(
        computation: Computation,
        publisher: Arc<dyn EventPublisher>,
        quote_provider: Arc<dyn QuoteProvider>,
        cancel: CancellationToken,
    ) -> Result<Self, AgentError> {
        Self::new_with_staging_root(computation, publisher, quote_provider, cancel, None)
    }

    /// As [`AgentService::new`], but stages artifacts under `staging_root`
    /// instead of the system temporary directory when one is given.
    pub fn new_with_staging_root(
        computation: Computation,
        publisher: Arc<dyn EventPublisher>,
        quote_provider: Arc<dyn QuoteProvider>,
        cancel: CancellationToken,
        staging_root: Option<&std::path::Path>,
    ) -> Result<Self, AgentError> {
        let staging = match staging_root {
            Some(root) => Staging::new_in(root),
            None => Staging::new(),
        }
        .map_err(|e| AgentError::InternalError(e.to_string()))?;
        let state = Mutex::new(ServiceState::new(&computation));

        let inner = Arc::new(Inner {
            computation,
            staging,
            state,
            publisher,
            cancel,
            sm: OnceLock::new(),
        });

        let hooks = build_hooks(&inner);
        let sm = StateMachine::spawn(hooks, inner.cancel.clone());
        inner
            .sm
            .set(sm.clone())
            .unwrap_or_else(|_| unreachable!("sm set exactly once"));

        sm.send(StateEvent::Start);
        sm.send(StateEvent::ManifestReceived);

        Ok(Self { inner, quote_provider })
    }

    /// The current protocol state, mostly useful for logging/tests.
    pub fn state(&self) -> State {
        self.inner.sm().current()
    }

    pub async fn submit_algorithm(&self, bytes: Vec<u8>) -> Result<(), AgentError> {
        if self.inner.sm().current() != State::ReceivingAlgorithm {
            return Err(AgentError::StateNotReady);
        }
        if self.inner.state.lock().algorithm_path.is_some() {
            return Err(AgentError::AllManifestItemsReceived);
        }

        let (bytes, digest) = hash_owned(bytes).await;
        if !digest.constant_time_eq(&self.inner.computation.algorithm.digest) {
            return Err(AgentError::HashMismatch);
        }

        let path = self
            .inner
            .staging
            .stage(&bytes, ArtifactKind::Algorithm, "algorithm")
            .map_err(|e| AgentError::InternalError(e.to_string()))?;

        {
            let mut state = self.inner.state.lock();
            if state.algorithm_path.is_some() {
                return Err(AgentError::AllManifestItemsReceived);
            }
            state.algorithm_path = Some(path);
        }

        self.inner.sm().send(StateEvent::AlgorithmReceived);
        Ok(())
    }

    pub async fn submit_dataset(&self, ctx: CallContext, bytes: Vec<u8>) -> Result<(), AgentError> {
        if self.inner.sm().current() != State::ReceivingData {
            return Err(AgentError::StateNotReady);
        }
        if self.inner.state.lock().pending_datasets.is_empty() {
            return Err(AgentError::AllManifestItemsReceived);
        }

        let index = ctx.participant_index.ok_or(AgentError::UndeclaredDataset)?;
        let expected = {
            let state = self.inner.state.lock();
            *state
                .pending_datasets
                .get(&index)
                .ok_or(AgentError::UndeclaredDataset)?
        };

        let (bytes, digest) = hash_owned(bytes).await;
        if !digest.constant_time_eq(&expected) {
            return Err(AgentError::HashMismatch);
        }

        let path = self
            .inner
            .staging
            .stage(&bytes, ArtifactKind::Dataset, &format!("dataset-{index}"))
            .map_err(|e| AgentError::InternalError(e.to_string()))?;

        let all_received = {
            let mut state = self.inner.state.lock();
            if state.pending_datasets.remove(&index).is_none() {
                return Err(AgentError::UndeclaredDataset);
            }
            state.staged_datasets[index] = Some(path);
            state.pending_datasets.is_empty()
        };

        if all_received {
            self.inner.sm().send(StateEvent::DataReceived);
        }
        Ok(())
    }

    pub fn fetch_result(&self, ctx: CallContext) -> Result<(Vec<u8>, Option<AgentError>), AgentError> {
        if self.inner.sm().current() != State::ResultsReady {
            return Err(AgentError::ResultsNotReady);
        }

        let mut state = self.inner.state.lock();
        if state.pending_consumers.is_empty() {
            return Err(AgentError::AllManifestItemsReceived);
        }

        let index = ctx.participant_index.ok_or(AgentError::UndeclaredConsumer)?;
        if !state.pending_consumers.remove(&index) {
            return Err(AgentError::UndeclaredConsumer);
        }

        let all_consumed = state.pending_consumers.is_empty();
        let result = state.result.clone();
        let run_error = state.run_error.clone();
        drop(state);

        if all_consumed {
            self.inner.sm().send(StateEvent::ResultsConsumed);
        }
        Ok((result, run_error))
    }

    pub async fn attest(&self, report_data: [u8; 64]) -> Result<Vec<u8>, AgentError> {
        self.quote_provider
            .quote(report_data)
            .await
            .map_err(|QuoteError::Unavailable(message)| AgentError::InternalError(message))
    }

    /// Whether the staging directory currently holds no files. Exposed for
    /// tests asserting that a finished run leaves no artifact behind.
    #[cfg(any(test, feature = "test-support"))]
    pub fn staging_dir_is_empty(&self) -> bool {
        std::fs::read_dir(self.inner.staging.path())
            .map(|mut entries| entries.next().is_none())
            .unwrap_or(false)
    }
}

fn build_hooks(inner: &Arc<Inner>) -> HashMap<State, EntryHook> {
    let mut hooks: HashMap<State, EntryHook> = HashMap::new();

    for state in [
        State::ReceivingManifest,
        State::ReceivingAlgorithm,
        State::ResultsReady,
        State::Complete,
    ] {
        hooks.insert(state, progress_hook(Arc::clone(inner)));
    }

    hooks.insert(State::ReceivingData, receiving_data_hook(Arc::clone(inner)));
    hooks.insert(State::Running, running_hook(Arc::clone(inner)));
    hooks
}

fn progress_hook(inner: Arc<Inner>) -> EntryHook {
    Box::new(move |state| {
        let inner = Arc::clone(&inner);
        Box::pin(async move {
            inner
                .publisher
                .publish(AgentEvent::new(state.to_string(), EventStatus::InProgress))
                .await;
        })
    })
}

/// Entry hook for `receivingData`. A manifest declaring zero datasets has
/// nothing for `SubmitDataset` to ever satisfy, so the "no pending datasets
/// remain" condition that normally fires `dataReceived` from inside
/// `submit_dataset` is checked here too, on entry — otherwise such a
/// computation would wait in `receivingData` forever.
fn receiving_data_hook(inner: Arc<Inner>) -> EntryHook {
    Box::new(move |state| {
        let inner = Arc::clone(&inner);
        Box::pin(async move {
            inner
                .publisher
                .publish(AgentEvent::new(state.to_string(), EventStatus::InProgress))
                .await;

            if inner.state.lock().pending_datasets.is_empty() {
                inner.sm().send(StateEvent::DataReceived);
            }
        })
    })
}

fn running_hook(inner: Arc<Inner>) -> EntryHook {
    Box::new(move |_state| {
        let inner = Arc::clone(&inner);
        Box::pin(run_computation(inner))
    })
}

async fn run_computation(inner: Arc<Inner>) {
    inner
        .publisher
        .publish(AgentEvent::new("running", EventStatus::Starting))
        .await;

    let (path, kind, datasets): (PathBuf, _, Vec<PathBuf>) = {
        let state = inner.state.lock();
        let path = state
            .algorithm_path
            .clone()
            .expect("algorithm staged before entering running");
        let datasets = state.staged_dataset_paths();
        (path, inner.computation.algorithm.kind.clone(), datasets)
    };

    inner
        .publisher
        .publish(AgentEvent::new("running", EventStatus::InProgress))
        .await;

    let (result, run_error) =
        teeagent_runner::run(&path, &kind, &datasets, inner.publisher.as_ref(), &inner.cancel)
            .await;
    let failed = run_error.is_some();

    {
        let mut state = inner.state.lock();
        state.result = result;
        state.run_error = run_error;
    }

    let status = if failed { EventStatus::Failed } else { EventStatus::Complete };
    inner
        .publisher
        .publish(AgentEvent::new("running", status))
        .await;

    inner.sm().send(StateEvent::RunComplete);
}
