// SPDX-License-Identifier: MIT

//! Manifest model, error taxonomy, and protocol state machine shared by the
//! rest of the agent.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

#[macro_use]
mod macros;

mod digest;
mod error;
mod event;
mod event_publisher;
mod id;
mod manifest;
mod state_machine;

pub use digest::{verify, Sha3Digest};
pub use error::{AgentError, AgentErrorKind};
pub use event::{AgentEvent, EventStatus};
pub use event_publisher::EventPublisher;
pub use id::ConsumerId;
pub use manifest::{AlgorithmDecl, AlgorithmKind, Computation, DatasetDecl};
pub use state_machine::{EntryHook, State, StateEvent, StateMachine};

#[cfg(any(test, feature = "test-support"))]
pub use event_publisher::test_support::RecordingPublisher;

#[cfg(any(test, feature = "test-support"))]
pub use manifest::ComputationBuilder;
