//! Hash expansion capability
//!
//! The genetics engine is hash-agnostic: anything that can deterministically
//! expand an input byte sequence to an output of any requested length works
//! as a genome generator. Two implementations are provided - a native XOF
//! (BLAKE3) and a fixed-digest variant (SHA-256) that chains digests to
//! reach the requested length. User-supplied implementations are accepted
//! anywhere an `Arc<dyn Xof>` is taken.

use sha2::{Digest, Sha256};

/// A stateless extendable-output hash capability
///
/// Determinism contract: identical `(data, len)` must yield identical
/// output across calls, threads, and processes.
pub trait Xof: Send + Sync {
    /// Expand `data` into exactly `len` output bytes
    fn expand(&self, data: &[u8], len: usize) -> Vec<u8>;

    /// Short name for diagnostics
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// BLAKE3 in extendable-output mode
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Xof;

impl Xof for Blake3Xof {
    fn expand(&self, data: &[u8], len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        let mut hasher = blake3::Hasher::new();
        hasher.update(data);
        hasher.finalize_xof().fill(&mut out);
        out
    }

    fn name(&self) -> &'static str {
        "blake3"
    }
}

/// SHA-256 extended by digest chaining
///
/// `h0 = SHA256(data)`; while more output is needed, `h_{k+1} = SHA256(h_k)`
/// is appended; the concatenation is truncated to `len`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Xof;

impl Xof for Sha256Xof {
    fn expand(&self, data: &[u8], len: usize) -> Vec<u8> {
        let mut block: [u8; 32] = Sha256::digest(data).into();
        let mut out = Vec::with_capacity(len.max(32));
        out.extend_from_slice(&block);
        while out.len() < len {
            block = Sha256::digest(block).into();
            out.extend_from_slice(&block);
        }
        out.truncate(len);
        out
    }

    fn name(&self) -> &'static str {
        "sha256"
    }
}
