//! Error types for the genetics engine

use thiserror::Error;

/// Result type alias for genetics operations
pub type Result<T> = std::result::Result<T, GeneticsError>;

/// Errors that can occur when constructing organisms or running evolution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeneticsError {
    /// Genome length does not match the configuration
    #[error("genome must be {expected} bytes, got {actual}")]
    GenomeLength { expected: usize, actual: usize },

    /// Dual-encoded mode requires a meta-genome
    #[error("dual-encoded mode requires a meta-genome")]
    MetaGenomeMissing,

    /// Meta-genome length does not match the configuration
    #[error("meta-genome must be {expected} bytes, got {actual}")]
    MetaGenomeLength { expected: usize, actual: usize },

    /// Mutation mask length does not match the genome length
    #[error("mutation mask must be {expected} bytes, got {actual}")]
    MaskLength { expected: usize, actual: usize },

    /// Evolution needs a starting population
    #[error("initial population must not be empty")]
    EmptyPopulation,

    /// Permutation-layer failure
    #[error(transparent)]
    Core(#[from] sinefold_core::CoreError),
}
