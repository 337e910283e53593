// SPDX-License-Identifier: MIT

//! Responses a transport adapter encodes back onto the wire.

use serde::{Deserialize, Serialize};
use teeagent_core::AgentError;

/// Response to one of the four operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status")]
pub enum Response {
    /// `SubmitAlgorithm` / `SubmitDataset` accepted.
    Ok,

    /// `FetchResult` succeeded. `error` carries a recorded execution
    /// failure when the runner's subprocess itself failed — distinct from
    /// a wire-level `Error` response, which means the call was rejected.
    FetchResult {
        bytes: Vec<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// `Attest` succeeded.
    Attest { quote: Vec<u8> },

    /// The call was rejected before reaching (or by) the core. `kind` is
    /// the stable [`teeagent_core::AgentErrorKind`] tag; `message` is the
    /// human-readable detail.
    Error { kind: String, message: String },

    /// The wire layer rejected the call itself — malformed `report_data`
    /// length, for instance — and never invoked the core at all.
    InvalidArgument { message: String },
}

impl Response {
    pub fn from_agent_error(error: &AgentError) -> Self {
        Response::Error {
            kind: teeagent_core::AgentErrorKind::from(error).to_string(),
            message: error.to_string(),
        }
    }
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
