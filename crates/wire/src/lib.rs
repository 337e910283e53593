// SPDX-License-Identifier: MIT

//! Serializable request/response envelopes and the length-prefixed JSON
//! framing a transport adapter uses to encode and decode them. The event
//! sink itself is a separate, fire-and-forget external collaborator (see
//! SPEC_FULL.md §1, §4.6) with no wire envelope of its own.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

mod context;
mod request;
mod response;
mod wire;

pub use context::CallContext;
pub use request::Request;
pub use response::Response;
pub use wire::{decode, encode, read_message, read_request, write_message, write_response, ProtocolError};
