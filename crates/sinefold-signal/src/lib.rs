//! # Sinefold Signal
//!
//! Applications of the shared permutation primitive to sample arrays:
//! a fixed-frame shuffler that reorders audio-style frames with the
//! key-space permutation, and swap-keyed sine wave generation.

pub mod shuffle;
pub mod wave;

pub use shuffle::SampleShuffler;
pub use wave::{generate_harmonic_pattern, generate_sine_wave};
