//! # SineScramble
//!
//! Symmetric permutation-substitution cipher keyed by a vector of real
//! numbers. Built on the Sinefold permutation core: each round derives a
//! byte permutation and a bit-flip mask from the same sine score sequence.
//!
//! ```
//! use sinefold_cipher::{OperationMode, SineScramble};
//!
//! let cipher = SineScramble::new(vec![1.5, 2.5, 3.5, 4.5], OperationMode::MultiRound)?;
//! let sealed = cipher.encrypt("attack at dawn")?;
//! assert_eq!(cipher.decrypt(&sealed)?, b"attack at dawn");
//! # Ok::<(), sinefold_cipher::CipherError>(())
//! ```

pub mod cipher;
pub mod error;
pub mod io;
pub mod precomputed;

pub use cipher::{OperationMode, SineScramble};
pub use error::{CipherError, Result};
pub use precomputed::PrecomputedScramble;
