//! Swap-keyed sine generation

use std::f64::consts::TAU;

/// Base frequency scaled by the swap parameter
pub const BASE_FREQUENCY: f64 = 10.0;

/// Generate a sine wave whose frequency is `BASE_FREQUENCY` scaled by the
/// swap parameter (clamped into the unit interval)
pub fn generate_sine_wave(swap_param: f64, frame_count: usize) -> Vec<f64> {
    let frequency = BASE_FREQUENCY * swap_param.clamp(0.0, 1.0);
    (0..frame_count)
        .map(|i| {
            let t = i as f64 / frame_count as f64;
            (TAU * frequency * t).sin()
        })
        .collect()
}

/// Generate a harmonic stack: the fundamental plus `harmonics - 1`
/// overtones at 1/h amplitude, normalized to the unit range
pub fn generate_harmonic_pattern(swap_param: f64, harmonics: usize, frame_count: usize) -> Vec<f64> {
    let frequency = BASE_FREQUENCY * swap_param.clamp(0.0, 1.0);
    let norm: f64 = (1..=harmonics.max(1)).map(|h| 1.0 / h as f64).sum();
    (0..frame_count)
        .map(|i| {
            let t = i as f64 / frame_count as f64;
            let sum: f64 = (1..=harmonics.max(1))
                .map(|h| (TAU * frequency * h as f64 * t).sin() / h as f64)
                .sum();
            sum / norm
        })
        .collect()
}
