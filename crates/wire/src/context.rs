// SPDX-License-Identifier: MIT

//! Call context carried with every operation.

use serde::{Deserialize, Serialize};

/// The transport-authenticated positional identity of the caller, if any.
///
/// Binds the caller to a declared dataset slot (`SubmitDataset`) or
/// consumer slot (`FetchResult`). Authentication of the identity behind
/// this index is entirely the transport's responsibility; the core only
/// ever sees the index and validates the digest bound to it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_index: Option<usize>,
}

impl CallContext {
    pub fn new(participant_index: usize) -> Self {
        Self {
            participant_index: Some(participant_index),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            participant_index: None,
        }
    }
}
