// SPDX-License-Identifier: MIT

//! Centralized environment variable access for the daemon binary.
//!
//! Mirrors the rest of this workspace's convention of one module owning
//! every `std::env::var` call, rather than scattering lookups across the
//! binary.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TEEAGENT_MANIFEST_PATH is not set; the agent cannot boot without a manifest")]
    MissingManifestPath,
}

/// Resolved daemon configuration.
pub struct Config {
    /// Path to the computation manifest JSON file. Required: the agent
    /// has nothing to do without one.
    pub manifest_path: PathBuf,
    /// Unix socket the daemon listens on.
    pub socket_path: PathBuf,
    /// Staging directory override; `None` means the system default.
    pub staging_root: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration from the environment:
    /// - `TEEAGENT_MANIFEST_PATH` (required)
    /// - `TEEAGENT_SOCKET_PATH` (default: `./teeagent.sock`)
    /// - `TEEAGENT_STAGING_ROOT` (default: system temp directory)
    pub fn load() -> Result<Self, ConfigError> {
        let manifest_path = std::env::var("TEEAGENT_MANIFEST_PATH")
            .map(PathBuf::from)
            .map_err(|_| ConfigError::MissingManifestPath)?;

        let socket_path = socket_path();
        let staging_root = staging_root();

        Ok(Self {
            manifest_path,
            socket_path,
            staging_root,
        })
    }
}

fn socket_path() -> PathBuf {
    std::env::var("TEEAGENT_SOCKET_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("teeagent.sock"))
}

fn staging_root() -> Option<PathBuf> {
    std::env::var("TEEAGENT_STAGING_ROOT").ok().map(PathBuf::from)
}
