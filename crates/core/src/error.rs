// SPDX-License-Identifier: MIT

//! The agent's exhaustive error taxonomy.

use thiserror::Error;

/// Errors the intake/delivery service can return. Each maps to a distinct
/// RPC response code at the transport boundary; none of them advance or
/// poison the state machine (the service rejects and waits for retry).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("malformed entity specification")]
    MalformedEntity,

    #[error("missing or invalid credentials provided")]
    UnauthorizedAccess,

    #[error("agent not expecting this operation in the current state")]
    StateNotReady,

    #[error("all expected manifest items have been received")]
    AllManifestItemsReceived,

    #[error("dataset not declared in computation manifest")]
    UndeclaredDataset,

    #[error("result consumer is undeclared in computation manifest")]
    UndeclaredConsumer,

    #[error("malformed data, hash does not match manifest")]
    HashMismatch,

    #[error("computation results are not yet ready")]
    ResultsNotReady,

    #[error("computation execution failed: {0}")]
    ExecutionError(String),

    #[error("internal agent error: {0}")]
    InternalError(String),
}

crate::simple_display! {
    AgentErrorKind {
        MalformedEntity => "malformed_entity",
        UnauthorizedAccess => "unauthorized_access",
        StateNotReady => "state_not_ready",
        AllManifestItemsReceived => "all_manifest_items_received",
        UndeclaredDataset => "undeclared_dataset",
        UndeclaredConsumer => "undeclared_consumer",
        HashMismatch => "hash_mismatch",
        ResultsNotReady => "results_not_ready",
        ExecutionError(..) => "execution_error",
        InternalError(..) => "internal_error",
    }
}

/// Tag-only variant of [`AgentError`] for wire responses (strips the
/// associated message so the wire layer can match on a stable string).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentErrorKind {
    MalformedEntity,
    UnauthorizedAccess,
    StateNotReady,
    AllManifestItemsReceived,
    UndeclaredDataset,
    UndeclaredConsumer,
    HashMismatch,
    ResultsNotReady,
    ExecutionError,
    InternalError,
}

impl From<&AgentError> for AgentErrorKind {
    fn from(e: &AgentError) -> Self {
        match e {
            AgentError::MalformedEntity => AgentErrorKind::MalformedEntity,
            AgentError::UnauthorizedAccess => AgentErrorKind::UnauthorizedAccess,
            AgentError::StateNotReady => AgentErrorKind::StateNotReady,
            AgentError::AllManifestItemsReceived => AgentErrorKind::AllManifestItemsReceived,
            AgentError::UndeclaredDataset => AgentErrorKind::UndeclaredDataset,
            AgentError::UndeclaredConsumer => AgentErrorKind::UndeclaredConsumer,
            AgentError::HashMismatch => AgentErrorKind::HashMismatch,
            AgentError::ResultsNotReady => AgentErrorKind::ResultsNotReady,
            AgentError::ExecutionError(_) => AgentErrorKind::ExecutionError,
            AgentError::InternalError(_) => AgentErrorKind::InternalError,
        }
    }
}
