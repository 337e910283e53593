// SPDX-License-Identifier: MIT

//! Loads the immutable `Computation` manifest the agent is constructed
//! with. The manifest loader proper is named by contract only in the
//! spec (it may fetch from a control plane, decrypt a sealed blob, and so
//! on); this is the minimal local stand-in: one JSON file on disk,
//! deserialized straight into `teeagent_core::Computation`.

use std::path::Path;

use teeagent_core::Computation;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse manifest file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub fn load(path: &Path) -> Result<Computation, ManifestError> {
    let bytes = std::fs::read(path).map_err(|source| ManifestError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ManifestError::Parse {
        path: path.display().to_string(),
        source,
    })
}
