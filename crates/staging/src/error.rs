// SPDX-License-Identifier: MIT

//! Errors raised while writing artifacts to the ephemeral staging area.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to create staging directory: {0}")]
    CreateDir(#[source] std::io::Error),

    #[error("failed to create staged file {path}: {source}")]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write staged file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to set permissions on staged file {path}: {source}")]
    SetPermissions {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
