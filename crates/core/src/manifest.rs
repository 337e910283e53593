// SPDX-License-Identifier: MIT

//! The immutable computation manifest.

use crate::digest::Sha3Digest;
use crate::id::ConsumerId;
use serde::{Deserialize, Serialize};

/// Which sandbox the algorithm artifact expects to run in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AlgorithmKind {
    Binary,
    Wasm,
    /// Declared kind the agent does not know how to run. Carries the
    /// manifest's original kind string so the runner can report it back
    /// verbatim in `run_error` (see SPEC_FULL.md S4).
    Unknown { name: String },
}

impl std::fmt::Display for AlgorithmKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AlgorithmKind::Binary => write!(f, "binary"),
            AlgorithmKind::Wasm => write!(f, "wasm"),
            AlgorithmKind::Unknown { name } => write!(f, "{name}"),
        }
    }
}

/// Manifest declaration for the single algorithm artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmDecl {
    pub kind: AlgorithmKind,
    pub digest: Sha3Digest,
}

/// Manifest declaration for one dataset slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetDecl {
    pub digest: Sha3Digest,
}

/// The immutable declaration of what a computation expects: one algorithm,
/// N datasets in declared order, and the set of consumers entitled to the
/// result. Created once at agent construction and never mutated — the
/// service keeps its own pending-index bookkeeping alongside it rather
/// than mutating the manifest in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Computation {
    pub algorithm: AlgorithmDecl,
    pub datasets: Vec<DatasetDecl>,
    pub result_consumers: Vec<ConsumerId>,
}

impl Computation {
    pub fn dataset_count(&self) -> usize {
        self.datasets.len()
    }

    pub fn consumer_count(&self) -> usize {
        self.result_consumers.len()
    }
}

#[cfg(any(test, feature = "test-support"))]
pub struct ComputationBuilder {
    algorithm: AlgorithmDecl,
    datasets: Vec<DatasetDecl>,
    result_consumers: Vec<ConsumerId>,
}

#[cfg(any(test, feature = "test-support"))]
impl ComputationBuilder {
    pub fn new(algorithm_bytes: &[u8], kind: AlgorithmKind) -> Self {
        Self {
            algorithm: AlgorithmDecl {
                kind,
                digest: Sha3Digest::of(algorithm_bytes),
            },
            datasets: Vec::new(),
            result_consumers: Vec::new(),
        }
    }

    pub fn with_dataset(mut self, bytes: &[u8]) -> Self {
        self.datasets.push(DatasetDecl {
            digest: Sha3Digest::of(bytes),
        });
        self
    }

    pub fn with_consumer(mut self, id: impl Into<ConsumerId>) -> Self {
        self.result_consumers.push(id.into());
        self
    }

    pub fn build(self) -> Computation {
        Computation {
            algorithm: self.algorithm,
            datasets: self.datasets,
            result_consumers: self.result_consumers,
        }
    }
}

#[cfg(test)]
#[path = "manifest_tests.rs"]
mod tests;
