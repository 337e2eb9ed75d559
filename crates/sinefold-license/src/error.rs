//! Error types for license key handling
//!
//! Two families: `LicenseError` covers construction-time and key-handling
//! failures (strict, programmer/operator errors), while `ValidationError`
//! is the structured outcome of validating an untrusted key string -
//! validation never panics and never uses errors for control flow beyond
//! reporting the first unrecoverable reason.

use thiserror::Error;

/// Result type alias for license construction and key handling
pub type Result<T> = std::result::Result<T, LicenseError>;

/// Errors raised while building keys or handling key material
#[derive(Error, Debug)]
pub enum LicenseError {
    /// A payload field does not fit its allocated bit width
    #[error("field `{field}` value {value} exceeds {width}-bit capacity")]
    FieldOverflow {
        field: &'static str,
        value: u128,
        width: usize,
    },

    /// Fewer bits available than the expected payload width
    #[error("expected at least {expected} bits, got {got}")]
    InsufficientBits { expected: usize, got: usize },

    /// Character outside the license alphabet
    #[error("invalid character {0:?} in encoded string")]
    InvalidCharacter(char),

    /// Swap parameters are quantized from the unit interval
    #[error("swap parameter must be within [0, 1], got {0}")]
    SwapParamRange(f64),

    /// RSA operation failure (keygen, signing)
    #[error("RSA operation failed: {0}")]
    Rsa(#[from] rsa::Error),

    /// PKCS#8 private key encode/decode failure
    #[error("PKCS#8 key handling failed: {0}")]
    Pkcs8(#[from] rsa::pkcs8::Error),

    /// SubjectPublicKeyInfo encode/decode failure
    #[error("public key handling failed: {0}")]
    Spki(#[from] rsa::pkcs8::spki::Error),

    /// Key file I/O failure
    #[error("key file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Permutation-layer failure
    #[error(transparent)]
    Core(#[from] sinefold_core::CoreError),
}

/// Structured reasons a license key fails validation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Stripped key string has the wrong character count
    #[error("key has wrong length: expected {expected} characters, got {actual}")]
    WrongLength { expected: usize, actual: usize },

    /// Key string contains a character outside the alphabet
    #[error("key contains invalid character {0:?}")]
    InvalidCharacter(char),

    /// No swap-parameter candidate yielded a consistent payload
    #[error("no swap parameter candidate produced a consistent payload")]
    SwapParamNotFound,

    /// The payload signature did not verify
    #[error("signature verification failed")]
    BadSignature,

    /// The license validity window has passed
    #[error("license has expired")]
    Expired,

    /// The key is locked to a different host version
    #[error("license is locked to version {locked}, host version is {host}")]
    VersionLockMismatch { locked: u8, host: u8 },
}
