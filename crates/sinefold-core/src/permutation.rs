//! Score-sorted permutation maps
//!
//! A `PermutationMap` stores the original→new convention: `map[i] = j`
//! means the element at original index `i` moves to new index `j`. The
//! argsort order (`sorted[new] = original`) is exposed separately for
//! callers that want to walk the sorted indices directly; both views
//! describe the same permutation.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::score::SineScore;

/// A permutation of `[0..N)`, stored as original→new
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermutationMap {
    map: Vec<usize>,
}

impl PermutationMap {
    /// Derive a permutation of `[0..len)` from a real key
    pub fn from_key(key: f64, len: usize, form: &SineScore) -> Result<Self> {
        let scores = form.scores(key, len)?;
        Ok(Self::from_scores(&scores))
    }

    /// Build the permutation induced by a score sequence
    ///
    /// Indices are sorted by ascending score with the index itself as the
    /// deterministic tie-breaker, then the sorted order is inverted into
    /// the original→new convention.
    pub fn from_scores(scores: &[f64]) -> Self {
        let sorted = Self::argsort(scores);
        let mut map = vec![0usize; sorted.len()];
        for (new_pos, &original_pos) in sorted.iter().enumerate() {
            map[original_pos] = new_pos;
        }
        Self { map }
    }

    /// Validate and wrap an externally supplied original→new map
    pub fn from_vec(map: Vec<usize>) -> Result<Self> {
        if !is_permutation(&map) {
            return Err(CoreError::InvalidPermutation { len: map.len() });
        }
        Ok(Self { map })
    }

    /// Argsort of a score sequence: `sorted[new] = original`
    pub fn argsort(scores: &[f64]) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..scores.len()).collect();
        indices.sort_by(|&a, &b| scores[a].total_cmp(&scores[b]).then(a.cmp(&b)));
        indices
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// The raw original→new mapping
    pub fn as_slice(&self) -> &[usize] {
        &self.map
    }

    /// The inverse permutation: `inv[map[i]] = i`
    pub fn inverse(&self) -> PermutationMap {
        let mut inv = vec![0usize; self.map.len()];
        for (original, &new) in self.map.iter().enumerate() {
            inv[new] = original;
        }
        PermutationMap { map: inv }
    }

    /// Apply the permutation: `out[map[i]] = input[i]`
    pub fn apply<T: Copy>(&self, input: &[T]) -> Result<Vec<T>> {
        if input.len() != self.map.len() {
            return Err(CoreError::LengthMismatch {
                expected: self.map.len(),
                actual: input.len(),
            });
        }
        let mut out = input.to_vec();
        for (original, &new) in self.map.iter().enumerate() {
            out[new] = input[original];
        }
        Ok(out)
    }

    /// Undo the permutation: `out[i] = input[map[i]]`
    ///
    /// Equivalent to `self.inverse().apply(input)` without materializing
    /// the inverse map.
    pub fn apply_inverse<T: Copy>(&self, input: &[T]) -> Result<Vec<T>> {
        if input.len() != self.map.len() {
            return Err(CoreError::LengthMismatch {
                expected: self.map.len(),
                actual: input.len(),
            });
        }
        let mut out = input.to_vec();
        for (original, &new) in self.map.iter().enumerate() {
            out[original] = input[new];
        }
        Ok(out)
    }
}

/// Check that a map is a bijection of `[0..len)`
pub fn is_permutation(map: &[usize]) -> bool {
    let mut seen = vec![false; map.len()];
    for &j in map {
        if j >= map.len() || seen[j] {
            return false;
        }
        seen[j] = true;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_is_bijection() {
        let form = SineScore::key_space();
        for key in [0.0, 0.13, 0.42, 0.999, 5.7] {
            let map = PermutationMap::from_key(key, 64, &form).unwrap();
            assert!(is_permutation(map.as_slice()));
        }
    }

    #[test]
    fn test_apply_then_inverse_round_trip() {
        // N=8, s=0.42, key-space form
        let form = SineScore::key_space();
        let map = PermutationMap::from_key(0.42, 8, &form).unwrap();

        let input = b"ABCDEFGH";
        let permuted = map.apply(input).unwrap();
        let restored = map.apply_inverse(&permuted).unwrap();
        assert_eq!(restored, input);
    }

    #[test]
    fn test_inverse_map_matches_apply_inverse() {
        let form = SineScore::key_space();
        let map = PermutationMap::from_key(0.7, 33, &form).unwrap();
        let input: Vec<u8> = (0..33).map(|i| i as u8).collect();

        let permuted = map.apply(&input).unwrap();
        let via_inverse_map = map.inverse().apply(&permuted).unwrap();
        let via_apply_inverse = map.apply_inverse(&permuted).unwrap();
        assert_eq!(via_inverse_map, input);
        assert_eq!(via_apply_inverse, input);
    }

    #[test]
    fn test_argsort_and_map_agree() {
        let form = SineScore::cipher_default();
        let scores = form.scores(1.5, 20).unwrap();
        let sorted = PermutationMap::argsort(&scores);
        let map = PermutationMap::from_scores(&scores);
        for (new_pos, &original) in sorted.iter().enumerate() {
            assert_eq!(map.as_slice()[original], new_pos);
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let form = SineScore::key_space();
        let map = PermutationMap::from_key(0.5, 10, &form).unwrap();
        let err = map.apply(&[0u8; 9]).unwrap_err();
        assert_eq!(
            err,
            CoreError::LengthMismatch {
                expected: 10,
                actual: 9
            }
        );
    }

    #[test]
    fn test_invalid_map_rejected() {
        assert!(PermutationMap::from_vec(vec![0, 1, 1]).is_err());
        assert!(PermutationMap::from_vec(vec![0, 3, 1]).is_err());
        assert!(PermutationMap::from_vec(vec![2, 0, 1]).is_ok());
    }

    #[test]
    fn test_normalization_gives_identical_maps() {
        let form = SineScore::key_space();
        let a = PermutationMap::from_key(1.1, 50, &form).unwrap();
        let b = PermutationMap::from_key(1.1 + std::f64::consts::TAU, 50, &form).unwrap();
        assert_eq!(a, b);
    }
}
