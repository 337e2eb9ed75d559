//! Error types for SineScramble operations

use thiserror::Error;

/// Result type alias for cipher operations
pub type Result<T> = std::result::Result<T, CipherError>;

/// Errors that can occur when constructing or running the cipher
#[derive(Error, Debug)]
pub enum CipherError {
    /// A cipher needs at least one key component
    #[error("cipher key must contain at least one component")]
    EmptyKey,

    /// Segmented mode needs at least one byte per key component
    #[error("buffer of {len} bytes is too small for {segments} segments")]
    SegmentTooSmall { len: usize, segments: usize },

    /// Permutation-layer failure
    #[error(transparent)]
    Core(#[from] sinefold_core::CoreError),

    /// File helper I/O failure
    #[error("cipher file I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
