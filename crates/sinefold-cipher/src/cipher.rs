//! SineScramble cipher core
//!
//! Symmetric cipher keyed by a vector of real numbers `k_1..k_n`. Each
//! round scores every buffer index with the cipher form of the shared sine
//! scoring function, permutes bytes along the score-sorted order, and flips
//! the low bit of positions whose score has a fractional part above 0.5.
//!
//! Two operating modes:
//! - Multi-Round: all `n` rounds run sequentially over the whole buffer
//!   (higher diffusion across rounds, strictly serial)
//! - Segmented: the buffer is split into `n` slabs and slab `i` is
//!   transformed once with component `k_i` (slabs are independent and run
//!   in parallel)

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;

use sinefold_core::{PermutationMap, SineScore};

use crate::error::{CipherError, Result};

/// Operation mode for the cipher
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationMode {
    /// `n` sequential rounds over the whole buffer
    MultiRound,

    /// Buffer split into `n` slabs, one round per slab
    Segmented,
}

/// SineScramble symmetric cipher
#[derive(Clone, Debug)]
pub struct SineScramble {
    key: Vec<f64>,
    mode: OperationMode,
    form: SineScore,
}

impl SineScramble {
    /// Construct a cipher with the default scoring parameters
    /// (`A = 100`, `omega = 0.1`, `gamma = 1`)
    pub fn new(key: Vec<f64>, mode: OperationMode) -> Result<Self> {
        Self::with_params(key, mode, 100.0, 0.1, 1.0)
    }

    /// Construct a cipher with explicit scoring parameters
    pub fn with_params(
        key: Vec<f64>,
        mode: OperationMode,
        amplitude: f64,
        frequency: f64,
        gamma: f64,
    ) -> Result<Self> {
        if key.is_empty() {
            return Err(CipherError::EmptyKey);
        }
        Ok(Self {
            key,
            mode,
            form: SineScore::cipher(amplitude, frequency, gamma),
        })
    }

    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    /// Number of key components (rounds or segments)
    pub fn rounds(&self) -> usize {
        self.key.len()
    }

    /// Permutation map and substitution mask for one key component
    ///
    /// Both tables derive from the same score sequence: the sorted order
    /// gives the permutation, the fractional parts give the bit-flip mask.
    fn round_tables(&self, component: f64, len: usize) -> Result<(PermutationMap, Vec<u8>)> {
        let scores = self.form.scores(component, len)?;
        let map = PermutationMap::from_scores(&scores);
        let mask = scores
            .iter()
            .map(|s| u8::from(s - s.floor() > 0.5))
            .collect();
        Ok((map, mask))
    }

    /// Round tables for a fixed buffer length, in round (or segment) order
    pub(crate) fn build_tables(&self, len: usize) -> Result<Vec<(PermutationMap, Vec<u8>)>> {
        match self.mode {
            OperationMode::MultiRound => self
                .key
                .iter()
                .map(|&component| self.round_tables(component, len))
                .collect(),
            OperationMode::Segmented => self
                .segment_bounds(len)?
                .iter()
                .zip(&self.key)
                .map(|(range, &component)| self.round_tables(component, range.len()))
                .collect(),
        }
    }

    /// One permute+substitute round, or its exact inverse
    fn transform_round(&self, data: &[u8], component: f64, inverse: bool) -> Result<Vec<u8>> {
        let (map, mask) = self.round_tables(component, data.len())?;
        if inverse {
            let unmasked: Vec<u8> = data.iter().zip(&mask).map(|(b, m)| b ^ m).collect();
            Ok(map.apply_inverse(&unmasked)?)
        } else {
            let mut permuted = map.apply(data)?;
            for (b, m) in permuted.iter_mut().zip(&mask) {
                *b ^= m;
            }
            Ok(permuted)
        }
    }

    fn transform_multi_round(&self, data: &[u8], inverse: bool) -> Result<Vec<u8>> {
        let mut current = data.to_vec();
        if inverse {
            for &component in self.key.iter().rev() {
                current = self.transform_round(&current, component, true)?;
            }
        } else {
            for &component in &self.key {
                current = self.transform_round(&current, component, false)?;
            }
        }
        Ok(current)
    }

    /// Slab boundaries for segmented mode; the last slab absorbs the
    /// remainder
    fn segment_bounds(&self, len: usize) -> Result<Vec<Range<usize>>> {
        let n = self.key.len();
        let segment_size = len / n;
        if segment_size == 0 {
            return Err(CipherError::SegmentTooSmall { len, segments: n });
        }
        Ok((0..n)
            .map(|i| {
                let start = i * segment_size;
                let end = if i == n - 1 { len } else { start + segment_size };
                start..end
            })
            .collect())
    }

    fn transform_segmented(&self, data: &[u8], inverse: bool) -> Result<Vec<u8>> {
        let bounds = self.segment_bounds(data.len())?;

        // Slabs are independent; transform in parallel, then concatenate
        // in slab order so the output is identical to a serial pass.
        let slabs: Vec<Vec<u8>> = bounds
            .into_par_iter()
            .zip(self.key.par_iter())
            .map(|(range, &component)| self.transform_round(&data[range], component, inverse))
            .collect::<Result<_>>()?;

        let mut out = Vec::with_capacity(data.len());
        for slab in slabs {
            out.extend_from_slice(&slab);
        }
        Ok(out)
    }

    /// Encrypt a buffer; `&str` and `String` inputs are accepted as UTF-8
    /// bytes
    pub fn encrypt(&self, data: impl AsRef<[u8]>) -> Result<Vec<u8>> {
        let data = data.as_ref();
        match self.mode {
            OperationMode::MultiRound => self.transform_multi_round(data, false),
            OperationMode::Segmented => self.transform_segmented(data, false),
        }
    }

    /// Decrypt a buffer produced by [`encrypt`](Self::encrypt) with the
    /// same key, mode, and parameters
    pub fn decrypt(&self, data: &[u8]) -> Result<Vec<u8>> {
        match self.mode {
            OperationMode::MultiRound => self.transform_multi_round(data, true),
            OperationMode::Segmented => self.transform_segmented(data, true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE: &[u8] = b"Hello, SineScramble! This is a comprehensive test message.";

    #[test]
    fn test_empty_key_rejected() {
        assert!(matches!(
            SineScramble::new(vec![], OperationMode::MultiRound),
            Err(CipherError::EmptyKey)
        ));
    }

    #[test]
    fn test_multi_round_round_trip() {
        let cipher =
            SineScramble::with_params(vec![1.5, 2.5, 3.5, 4.5], OperationMode::MultiRound, 100.0, 0.1, 1.0)
                .unwrap();

        let encrypted = cipher.encrypt(MESSAGE).unwrap();
        assert_eq!(encrypted.len(), MESSAGE.len());
        assert_ne!(encrypted, MESSAGE);

        let decrypted = cipher.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, MESSAGE);
    }

    #[test]
    fn test_segmented_round_trip() {
        let cipher = SineScramble::new(vec![0.9, -2.4, 17.0], OperationMode::Segmented).unwrap();
        let data: Vec<u8> = (0..=255).collect();

        let encrypted = cipher.encrypt(&data).unwrap();
        let decrypted = cipher.decrypt(&encrypted).unwrap();
        assert_eq!(decrypted, data);
    }

    #[test]
    fn test_segmented_rejects_short_buffer() {
        let cipher = SineScramble::new(vec![1.0, 2.0], OperationMode::Segmented).unwrap();
        match cipher.encrypt([0x41u8]) {
            Err(CipherError::SegmentTooSmall { len: 1, segments: 2 }) => {}
            other => panic!("expected SegmentTooSmall, got {other:?}"),
        }
    }

    #[test]
    fn test_segmented_remainder_goes_to_last_slab() {
        let cipher = SineScramble::new(vec![1.0, 2.0, 3.0], OperationMode::Segmented).unwrap();
        let bounds = cipher.segment_bounds(10).unwrap();
        assert_eq!(bounds, vec![0..3, 3..6, 6..10]);
    }

    #[test]
    fn test_single_round_is_its_own_inverse_path() {
        let cipher = SineScramble::new(vec![7.7], OperationMode::MultiRound).unwrap();
        let data = b"single component";
        let decrypted = cipher.decrypt(&cipher.encrypt(data).unwrap()).unwrap();
        assert_eq!(decrypted, data);
    }

    #[test]
    fn test_determinism_across_instances() {
        let a = SineScramble::new(vec![3.1, 4.1], OperationMode::MultiRound).unwrap();
        let b = SineScramble::new(vec![3.1, 4.1], OperationMode::MultiRound).unwrap();
        assert_eq!(a.encrypt(MESSAGE).unwrap(), b.encrypt(MESSAGE).unwrap());
    }

    #[test]
    fn test_different_keys_give_different_ciphertexts() {
        let a = SineScramble::new(vec![3.1, 4.1], OperationMode::MultiRound).unwrap();
        let b = SineScramble::new(vec![3.1, 4.2], OperationMode::MultiRound).unwrap();
        assert_ne!(a.encrypt(MESSAGE).unwrap(), b.encrypt(MESSAGE).unwrap());
    }

    #[test]
    fn test_str_input_accepted() {
        let cipher = SineScramble::new(vec![5.0], OperationMode::MultiRound).unwrap();
        let encrypted = cipher.encrypt("plain text input").unwrap();
        assert_eq!(cipher.decrypt(&encrypted).unwrap(), b"plain text input");
    }
}
