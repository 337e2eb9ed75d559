//! # Sinefold Core
//!
//! Shared primitives for the Sinefold workspace:
//! - `SineScore` - the sine-based scoring function that turns a real key
//!   into a total order over indices
//! - `PermutationMap` - a score-sorted permutation of `[0..N)` with its
//!   inverse and generic apply/unapply
//! - `Xof` - the hash-expansion capability used by the genetics engine
//!
//! ## The permutation primitive
//!
//! Every Sinefold subsystem derives index permutations the same way: score
//! each index `i` as `A * sin(phi(s) + i * omega) + i`, sort the indices by
//! score, and read the sorted order as a permutation. The `+ i` term breaks
//! sine ties, so the order is total and the map is reproducible for any key.
//!
//! ```text
//!   key s ──► scores ──► argsort ──► map[original] = new
//!                                      │
//!                                      └──► inverse, apply, unapply
//! ```

pub mod error;
pub mod permutation;
pub mod score;
pub mod xof;

pub use error::*;
pub use permutation::*;
pub use score::*;
pub use xof::*;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{CoreError, Result};
    pub use crate::permutation::PermutationMap;
    pub use crate::score::SineScore;
    pub use crate::xof::{Blake3Xof, Sha256Xof, Xof};
}
