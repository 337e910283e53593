// SPDX-License-Identifier: MIT

//! Ephemeral artifact staging.
//!
//! Verified algorithm/dataset bytes are written to a process-private
//! temporary directory before the runner touches them. One [`Staging`]
//! owns that directory for the lifetime of the agent; dropping it (or an
//! explicit [`Staging::teardown`]) removes anything left behind, which is
//! the backstop for a computation that never reaches the runner.

mod error;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub use error::StagingError;

/// Which artifact a staged file holds, and therefore which permission
/// mode it gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    Algorithm,
    Dataset,
}

impl ArtifactKind {
    fn mode(self) -> u32 {
        match self {
            ArtifactKind::Algorithm => 0o700,
            ArtifactKind::Dataset => 0o600,
        }
    }
}

/// Owns the agent's ephemeral staging directory.
pub struct Staging {
    dir: tempfile::TempDir,
}

impl Staging {
    /// Creates a fresh, process-private staging directory under the
    /// system temporary directory.
    pub fn new() -> Result<Self, StagingError> {
        let dir = tempfile::Builder::new()
            .prefix("teeagent-")
            .tempdir()
            .map_err(StagingError::CreateDir)?;
        Ok(Self { dir })
    }

    /// Creates a fresh, process-private staging directory under `root`
    /// instead of the system default, for deployments that pin staging
    /// to a specific volume (a `tmpfs` mount sized for large datasets,
    /// for instance).
    pub fn new_in(root: &Path) -> Result<Self, StagingError> {
        let dir = tempfile::Builder::new()
            .prefix("teeagent-")
            .tempdir_in(root)
            .map_err(StagingError::CreateDir)?;
        Ok(Self { dir })
    }

    /// The staging directory's path, mostly useful for logging.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Writes `bytes` to a new uniquely-named file under the staging
    /// directory, sets its permission mode for `kind`, and returns the
    /// path. Any I/O failure removes the partial file before returning.
    pub fn stage(
        &self,
        bytes: &[u8],
        kind: ArtifactKind,
        suffix: &str,
    ) -> Result<PathBuf, StagingError> {
        let name = format!("{suffix}-{}", uuid::Uuid::new_v4());
        let path = self.dir.path().join(name);

        let result = self.write_and_chmod(&path, bytes, kind);
        if result.is_err() {
            let _ = fs::remove_file(&path);
        }
        result?;

        Ok(path)
    }

    fn write_and_chmod(
        &self,
        path: &Path,
        bytes: &[u8],
        kind: ArtifactKind,
    ) -> Result<(), StagingError> {
        let mut file = fs::File::create(path).map_err(|source| StagingError::CreateFile {
            path: path.to_path_buf(),
            source,
        })?;
        file.write_all(bytes).map_err(|source| StagingError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        drop(file);

        set_mode(path, kind.mode()).map_err(|source| StagingError::SetPermissions {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Removes the staging directory and everything under it. Safe to
    /// call even if the runner has already deleted every individual file
    /// it staged.
    pub fn teardown(self) {
        drop(self.dir);
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
