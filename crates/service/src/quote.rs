// SPDX-License-Identifier: MIT

//! Contract for the hardware attestation quote provider.
//!
//! Named by contract only in the spec: the real implementation talks to
//! TEE firmware (an SEV-SNP or TDX ioctl, for instance) and is entirely
//! out of scope here. This crate ships the trait plus a deterministic
//! stub suitable for local runs and tests; a real deployment swaps in
//! its own implementation.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuoteError {
    #[error("quote provider unavailable: {0}")]
    Unavailable(String),
}

#[async_trait::async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Binds `report_data` (a 64-byte caller-supplied nonce) to the
    /// enclave's measured state and returns the opaque quote bytes.
    async fn quote(&self, report_data: [u8; 64]) -> Result<Vec<u8>, QuoteError>;
}

/// Deterministic quote provider for local runs and tests: returns a
/// fixed prefix followed by the nonce it was given, so callers can
/// assert on the shape without needing real TEE hardware.
pub struct StubQuoteProvider;

#[async_trait::async_trait]
impl QuoteProvider for StubQuoteProvider {
    async fn quote(&self, report_data: [u8; 64]) -> Result<Vec<u8>, QuoteError> {
        let mut quote = b"stub-quote:".to_vec();
        quote.extend_from_slice(&report_data);
        Ok(quote)
    }
}
