//! # Sinefold License
//!
//! Signed, bit-packed license keys with a sine-driven character
//! permutation:
//!
//! 1. License fields pack into a 150-bit payload with a 5-bit checksum
//! 2. The 19 payload bytes are signed with RSA-PSS/SHA-256
//! 3. Payload and signature bits are base-32 encoded over a
//!    confusion-free 32-symbol alphabet
//! 4. The whole character string is permuted with the score-sorted
//!    permutation keyed by the swap parameter
//! 5. Hyphens split the result into 5-character groups
//!
//! Validation reverses the pipeline; when the swap parameter is embedded
//! in the key, all 256 quantized candidates are tried.

pub mod codec;
pub mod error;
pub mod keys;
pub mod license;
pub mod payload;

pub use error::{LicenseError, Result, ValidationError};
pub use keys::{
    generate_keypair, load_private_key_pem, load_public_key_pem, save_private_key_pem,
    save_public_key_pem, DEFAULT_KEY_BITS,
};
pub use license::{
    generate_license_key, validate_license_key, LicenseRequest, SwapMode, EPOCH, SEGMENT_LEN,
};
pub use payload::{LicensePayload, PAYLOAD_BITS, PAYLOAD_BYTES};
