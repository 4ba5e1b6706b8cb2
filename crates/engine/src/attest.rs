// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Nonce-bound sha256 attestation primitives.
//!
//! The nonce is fresh per claim and single-use; binding it into every
//! pack-file hash proves the worker read the bytes this claim, not a
//! prior one. Comparisons are constant-time.

use sha2::{Digest, Sha256};

/// Lowercase hex sha256 of raw bytes.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Lowercase hex sha256 of `nonce || bytes`, the nonce folded in as its
/// ASCII form.
pub fn attest_sha256_hex(nonce: &str, bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce.as_bytes());
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Constant-time string equality: the comparison touches every byte of
/// both inputs regardless of where they diverge.
pub fn ct_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    let mut diff = a.len() ^ b.len();
    let len = a.len().min(b.len());
    for i in 0..len {
        diff |= (a[i] ^ b[i]) as usize;
    }
    diff == 0
}

#[cfg(test)]
#[path = "attest_tests.rs"]
mod tests;
