// SPDX-License-Identifier: MIT

//! The intake/delivery service: wires the manifest, staging, runner, and
//! protocol state machine behind `SubmitAlgorithm`/`SubmitDataset`/
//! `FetchResult`/`Attest`.

mod digest_task;
mod quote;
mod service;
mod state;

pub use quote::{QuoteError, QuoteProvider, StubQuoteProvider};
pub use service::AgentService;

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
