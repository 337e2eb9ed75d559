//! Sine-based index scoring
//!
//! `score(i) = A * sin(phi(s) + i * omega) + i`
//!
//! Two concrete forms are used across the workspace. The key-space form
//! (license keys, sample shuffling) uses a large amplitude and a key phase
//! of `100 * s`, with the key normalized into one sine period. The cipher
//! form uses smaller defaults and a configurable phase factor `gamma`, with
//! no key normalization (cipher key components may be any real).

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::{CoreError, Result};

/// Scoring function parameters for one permutation derivation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SineScore {
    /// Amplitude `A` of the sine term
    amplitude: f64,

    /// Per-index angular step `omega`
    frequency: f64,

    /// Key-to-phase factor: `phi(s) = phase_scale * s`
    phase_scale: f64,

    /// Whether keys are normalized into `[0, 2pi)` and negatives rejected
    normalize_key: bool,
}

impl SineScore {
    /// Key-space form: `A = 1000`, `omega = 0.2`, `phi(s) = 100 * s`.
    ///
    /// Keys outside one sine period are reduced modulo `2pi`; negative keys
    /// are rejected at scoring time.
    pub fn key_space() -> Self {
        Self {
            amplitude: 1000.0,
            frequency: 0.2,
            phase_scale: 100.0,
            normalize_key: true,
        }
    }

    /// Cipher form with explicit parameters: `phi(s) = gamma * s`
    pub fn cipher(amplitude: f64, frequency: f64, gamma: f64) -> Self {
        Self {
            amplitude,
            frequency,
            phase_scale: gamma,
            normalize_key: false,
        }
    }

    /// Cipher form with the default parameters `A = 100`, `omega = 0.1`,
    /// `gamma = 1`
    pub fn cipher_default() -> Self {
        Self::cipher(100.0, 0.1, 1.0)
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Resolve the key-dependent phase `phi(s)`
    fn phase(&self, key: f64) -> Result<f64> {
        if !self.normalize_key {
            return Ok(self.phase_scale * key);
        }
        if key < 0.0 {
            return Err(CoreError::NegativeKey(key));
        }
        let key = if key > TAU { key % TAU } else { key };
        Ok(self.phase_scale * key)
    }

    /// Score a single index
    pub fn score(&self, key: f64, index: usize) -> Result<f64> {
        let phase = self.phase(key)?;
        let i = index as f64;
        Ok(self.amplitude * (phase + i * self.frequency).sin() + i)
    }

    /// Score every index in `[0..len)`
    ///
    /// The `+ i` term strictly orders indices even where the sine values
    /// tie, so the resulting sequence induces a total order.
    pub fn scores(&self, key: f64, len: usize) -> Result<Vec<f64>> {
        let phase = self.phase(key)?;
        Ok((0..len)
            .map(|i| {
                let i = i as f64;
                self.amplitude * (phase + i * self.frequency).sin() + i
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_space_rejects_negative_keys() {
        let form = SineScore::key_space();
        assert_eq!(form.scores(-0.5, 8), Err(CoreError::NegativeKey(-0.5)));
    }

    #[test]
    fn test_cipher_form_accepts_negative_keys() {
        let form = SineScore::cipher_default();
        assert!(form.scores(-3.25, 8).is_ok());
    }

    #[test]
    fn test_key_normalization() {
        let form = SineScore::key_space();
        let a = form.scores(0.42, 16).unwrap();
        let b = form.scores(0.42 + TAU, 16).unwrap();
        for (x, y) in a.iter().zip(&b) {
            assert!((x - y).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scores_are_deterministic() {
        let form = SineScore::cipher(100.0, 0.1, 1.0);
        assert_eq!(form.scores(1.5, 64).unwrap(), form.scores(1.5, 64).unwrap());
    }

    #[test]
    fn test_index_term_breaks_ties() {
        // Zero amplitude collapses the sine term entirely; the index term
        // alone must still produce strictly increasing scores.
        let form = SineScore::cipher(0.0, 0.1, 1.0);
        let scores = form.scores(2.0, 32).unwrap();
        for w in scores.windows(2) {
            assert!(w[0] < w[1]);
        }
    }
}
