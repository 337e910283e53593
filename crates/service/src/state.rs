// SPDX-License-Identifier: MIT

//! The service's mutable fields, guarded by one mutex (see `Inner` in
//! `service.rs`). Pending datasets are keyed by their *declared* manifest
//! index, not by arrival order, so out-of-order intake never consumes
//! the wrong slot (SPEC_FULL.md Open Question (a)).

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use teeagent_core::{AgentError, Computation, Sha3Digest};

pub(crate) struct ServiceState {
    pub(crate) algorithm_path: Option<PathBuf>,
    /// Sized to `computation.dataset_count()` at construction; written at
    /// its declared index regardless of arrival order.
    pub(crate) staged_datasets: Vec<Option<PathBuf>>,
    pub(crate) pending_datasets: BTreeMap<usize, Sha3Digest>,
    pub(crate) pending_consumers: BTreeSet<usize>,
    pub(crate) result: Vec<u8>,
    pub(crate) run_error: Option<AgentError>,
}

impl ServiceState {
    pub(crate) fn new(computation: &Computation) -> Self {
        let pending_datasets = computation
            .datasets
            .iter()
            .enumerate()
            .map(|(index, decl)| (index, decl.digest))
            .collect();
        let pending_consumers = (0..computation.result_consumers.len()).collect();

        Self {
            algorithm_path: None,
            staged_datasets: vec![None; computation.dataset_count()],
            pending_datasets,
            pending_consumers,
            result: Vec::new(),
            run_error: None,
        }
    }

    /// The staged dataset paths in declared manifest order. Only valid
    /// to call once every dataset has arrived (`pending_datasets` empty).
    pub(crate) fn staged_dataset_paths(&self) -> Vec<PathBuf> {
        self.staged_datasets
            .iter()
            .map(|path| {
                path.clone()
                    .expect("all datasets staged before entering running")
            })
            .collect()
    }
}
