// SPDX-License-Identifier: MIT

//! Requests a transport adapter decodes off the wire and hands to the service.

use serde::{Deserialize, Serialize};

use crate::context::CallContext;

/// One of the four operations the agent serves, fully reassembled —
/// chunking or streaming of a large upload is entirely the transport's
/// concern and never visible past this boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op")]
pub enum Request {
    SubmitAlgorithm {
        context: CallContext,
        bytes: Vec<u8>,
    },
    SubmitDataset {
        context: CallContext,
        bytes: Vec<u8>,
    },
    FetchResult {
        context: CallContext,
    },
    /// `report_data` is carried as a plain byte vector rather than a fixed
    /// array: the wire layer validates its length itself (rejecting with
    /// `Response::InvalidArgument`) before the core's fixed-size-array
    /// signature would even apply.
    Attest {
        context: CallContext,
        report_data: Vec<u8>,
    },
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
