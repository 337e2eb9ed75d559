//! Error types for Sinefold core operations

use thiserror::Error;

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors that can occur when building or applying permutations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Key-space scoring requires a non-negative key
    #[error("permutation key must be non-negative, got {0}")]
    NegativeKey(f64),

    /// Buffer length does not match the permutation length
    #[error("length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    /// The supplied map is not a bijection of [0..len)
    #[error("map of length {len} is not a valid permutation")]
    InvalidPermutation { len: usize },
}
