// SPDX-License-Identifier: MIT

//! Opaque identifiers used throughout the agent.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque identity of a declared result consumer.
///
/// The manifest declares consumers in order; a participant index binds a
/// caller to one position in that order. The identity itself is opaque to
/// the core — it exists for logging and for the manifest loader's own
/// bookkeeping, never compared for anything but equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConsumerId(pub String);

impl ConsumerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConsumerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ConsumerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ConsumerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Borrow<str> for ConsumerId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
