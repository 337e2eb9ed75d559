//! # Sinefold Genetics
//!
//! Hash-agnostic genetic framework over fixed-length byte genomes. Every
//! reproduction operator transforms parent bytes and re-expands them
//! through an extendable-output hash, so the hash is the only source of
//! genetic novelty.
//!
//! Components:
//! - [`Organism`] with eight configurable reproduction methods
//! - Dual-encoded mode, where an organism's bytes encode its own
//!   reproduction strategy
//! - An evolution driver with Tournament, Simple, Omni and DualEncoded
//!   modes, four pairing strategies, elitism, population capping, and an
//!   adaptive population sizer that binary-searches a time budget
//!
//! ```
//! use std::sync::Arc;
//! use sinefold_core::Blake3Xof;
//! use sinefold_genetics::{evolve, EvolutionConfig, Organism, OrganismConfig};
//!
//! let config = Arc::new(OrganismConfig::basic(32, Arc::new(Blake3Xof)));
//! let population: Vec<Organism> = (0..8u8)
//!     .map(|i| Organism::from_seed(&[i], Arc::clone(&config)).unwrap())
//!     .collect();
//!
//! let outcome = evolve(
//!     population,
//!     |organism| organism.genome().iter().map(|&b| f64::from(b)).sum(),
//!     &EvolutionConfig::tournament(),
//! )?;
//! assert!(outcome.best.is_some());
//! # Ok::<(), sinefold_genetics::GeneticsError>(())
//! ```

pub mod autopop;
pub mod config;
pub mod error;
pub mod evolution;
pub mod organism;
pub mod pairing;
pub mod strategy;

pub use autopop::{AutoPopState, AutoPopulationConfig, SizerPhase};
pub use config::{OrganismConfig, OrganismMode};
pub use error::{GeneticsError, Result};
pub use evolution::{
    analyze_population, evaluate_population, evolve, evolve_with_callback, EvolutionConfig,
    EvolutionMode, EvolutionOutcome, GenerationRecord, GenerationSnapshot, StrategyAnalysis,
};
pub use organism::Organism;
pub use pairing::{pair_population, Pairing, PairingStrategy};
pub use strategy::{CombinationStrategy, MethodSet, ReproductionMethod, ReproductionStrategy};
