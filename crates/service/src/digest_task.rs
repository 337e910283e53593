// SPDX-License-Identifier: MIT

//! Offloads SHA3-256 hashing to a blocking-pool thread, per SPEC_FULL.md
//! §5 ("digest computation is CPU-bound but potentially large"). Returns
//! the bytes back to the caller alongside the digest so ownership can be
//! threaded through without a clone.

use teeagent_core::Sha3Digest;

pub(crate) async fn hash_owned(bytes: Vec<u8>) -> (Vec<u8>, Sha3Digest) {
    tokio::task::spawn_blocking(move || {
        let digest = Sha3Digest::of(&bytes);
        (bytes, digest)
    })
    .await
    .expect("digest task panicked")
}
