// SPDX-License-Identifier: MIT

//! SHA3-256 digests and constant-time manifest verification.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Sha3_256};
use std::fmt;
use subtle::ConstantTimeEq;

/// A 32-byte SHA3-256 digest, as declared in a computation manifest.
#[derive(Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sha3Digest(pub [u8; 32]);

impl Sha3Digest {
    /// Hash `bytes` with SHA3-256.
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha3_256::new();
        hasher.update(bytes);
        let out = hasher.finalize();
        let mut digest = [0u8; 32];
        digest.copy_from_slice(&out);
        Self(digest)
    }

    /// Compare against another digest in constant time, to avoid leaking
    /// timing information about where a mismatch occurs to a network-
    /// adjacent attacker submitting crafted artifacts.
    pub fn constant_time_eq(&self, other: &Sha3Digest) -> bool {
        self.0.ct_eq(&other.0).into()
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        if hex.len() != 64 {
            return None;
        }
        let mut digest = [0u8; 32];
        for (i, byte) in digest.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(digest))
    }

    pub fn to_hex(self) -> String {
        let mut s = String::with_capacity(64);
        for byte in self.0 {
            s.push_str(&format!("{byte:02x}"));
        }
        s
    }
}

impl fmt::Debug for Sha3Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha3Digest({})", self.to_hex())
    }
}

/// Verify `bytes` against `expected` using a constant-time comparison.
pub fn verify(bytes: &[u8], expected: &Sha3Digest) -> bool {
    Sha3Digest::of(bytes).constant_time_eq(expected)
}

#[cfg(test)]
#[path = "digest_tests.rs"]
mod tests;
