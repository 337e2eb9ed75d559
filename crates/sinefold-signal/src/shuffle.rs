//! Fixed-frame sample shuffling
//!
//! Reorders `f64` sample frames with the key-space permutation. The
//! shuffler works over a fixed frame count: shorter inputs are zero-padded
//! and longer inputs truncated before the permutation applies, so the
//! permutation map only ever has one length.

use sinefold_core::{PermutationMap, Result, SineScore};

/// Default frame window
pub const DEFAULT_FRAME_COUNT: usize = 100_000;

/// Sample shuffler over a fixed frame count
#[derive(Clone, Debug)]
pub struct SampleShuffler {
    frame_count: usize,
    form: SineScore,
}

impl SampleShuffler {
    pub fn new(frame_count: usize) -> Self {
        Self {
            frame_count,
            form: SineScore::key_space(),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// The permutation map for a swap parameter at this frame count
    pub fn permutation_map(&self, swap_param: f64) -> Result<PermutationMap> {
        PermutationMap::from_key(swap_param, self.frame_count, &self.form)
    }

    /// Shuffle samples; the output always has `frame_count` frames
    pub fn shuffle(&self, samples: &[f64], swap_param: f64) -> Result<Vec<f64>> {
        let fitted = self.fit(samples);
        self.permutation_map(swap_param)?.apply(&fitted)
    }

    /// Undo a shuffle performed with the same swap parameter
    pub fn unshuffle(&self, samples: &[f64], swap_param: f64) -> Result<Vec<f64>> {
        let fitted = self.fit(samples);
        self.permutation_map(swap_param)?.apply_inverse(&fitted)
    }

    /// Zero-pad or truncate into the frame window
    fn fit(&self, samples: &[f64]) -> Vec<f64> {
        let mut fitted = samples[..samples.len().min(self.frame_count)].to_vec();
        fitted.resize(self.frame_count, 0.0);
        fitted
    }
}

impl Default for SampleShuffler {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_COUNT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let shuffler = SampleShuffler::new(512);
        let samples: Vec<f64> = (0..512).map(|i| (i as f64 * 0.01).sin()).collect();

        let shuffled = shuffler.shuffle(&samples, 0.42).unwrap();
        assert_ne!(shuffled, samples);

        let restored = shuffler.unshuffle(&shuffled, 0.42).unwrap();
        assert_eq!(restored, samples);
    }

    #[test]
    fn test_short_input_is_padded() {
        let shuffler = SampleShuffler::new(64);
        let samples = vec![1.0; 10];
        let shuffled = shuffler.shuffle(&samples, 0.5).unwrap();
        assert_eq!(shuffled.len(), 64);
        assert_eq!(shuffled.iter().filter(|&&s| s == 1.0).count(), 10);
    }

    #[test]
    fn test_long_input_is_truncated() {
        let shuffler = SampleShuffler::new(32);
        let samples = vec![2.0; 100];
        assert_eq!(shuffler.shuffle(&samples, 0.5).unwrap().len(), 32);
    }

    #[test]
    fn test_negative_swap_rejected() {
        let shuffler = SampleShuffler::new(16);
        assert!(shuffler.shuffle(&[0.0; 16], -1.0).is_err());
    }

    #[test]
    fn test_wrong_swap_does_not_restore() {
        let shuffler = SampleShuffler::new(128);
        let samples: Vec<f64> = (0..128).map(|i| i as f64).collect();
        let shuffled = shuffler.shuffle(&samples, 0.3).unwrap();
        let wrong = shuffler.unshuffle(&shuffled, 0.31).unwrap();
        assert_ne!(wrong, samples);
    }
}
