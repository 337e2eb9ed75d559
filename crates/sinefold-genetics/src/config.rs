//! Organism configuration

use std::sync::Arc;

use sinefold_core::Xof;

use crate::strategy::{CombinationStrategy, MethodSet};

/// Organism operating mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OrganismMode {
    /// Reproduction behavior comes from the configuration
    #[default]
    Basic,

    /// The genome (or a dedicated meta-genome) encodes the reproduction
    /// strategy
    DualEncoded,
}

/// Immutable configuration shared by a population
///
/// Organisms hold this behind an `Arc`; variant behavior is selected by
/// data, not by subtype.
#[derive(Clone)]
pub struct OrganismConfig {
    /// Genome length `G` in bytes
    pub genome_length: usize,

    /// Hash expansion capability used by every operator
    pub hash: Arc<dyn Xof>,

    pub mode: OrganismMode,

    /// Methods available in basic mode (and the dual-encoded fallback)
    pub enabled_methods: MethodSet,

    pub combination_strategy: CombinationStrategy,

    /// Mutation mask library; every mask is `G` bytes
    pub mutation_masks: Vec<Vec<u8>>,

    /// Rotation offset library (signed)
    pub rotation_positions: Vec<i64>,

    /// Permutation map library; every map is a bijection of `[0..G)`
    pub permutation_maps: Vec<Vec<usize>>,

    /// Per-method weights in `[0, 1]`, indexed by method bit order
    pub method_weights: [f64; 8],

    /// Meta-genome length `M` for dual-encoded mode
    pub meta_genome_length: usize,

    /// Decode strategies from the genome even in basic mode
    pub enable_dual_encoding: bool,

    /// Whether sexual reproduction yields both reciprocal children
    pub enable_reciprocal_reproduction: bool,
}

impl OrganismConfig {
    /// Basic-mode configuration with the default operator libraries
    pub fn basic(genome_length: usize, hash: Arc<dyn Xof>) -> Self {
        Self {
            genome_length,
            hash,
            mode: OrganismMode::Basic,
            enabled_methods: MethodSet::all(),
            combination_strategy: CombinationStrategy::All,
            mutation_masks: default_masks(genome_length),
            rotation_positions: default_rotations(genome_length),
            permutation_maps: default_maps(genome_length),
            method_weights: [1.0; 8],
            meta_genome_length: genome_length,
            enable_dual_encoding: false,
            enable_reciprocal_reproduction: true,
        }
    }

    /// Dual-encoded configuration; organisms carry a meta-genome
    pub fn dual_encoded(genome_length: usize, hash: Arc<dyn Xof>) -> Self {
        Self {
            mode: OrganismMode::DualEncoded,
            ..Self::basic(genome_length, hash)
        }
    }

    /// Whether strategies are decoded from organism bytes
    pub fn decodes_strategy(&self) -> bool {
        self.mode == OrganismMode::DualEncoded || self.enable_dual_encoding
    }
}

impl std::fmt::Debug for OrganismConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganismConfig")
            .field("genome_length", &self.genome_length)
            .field("hash", &self.hash.name())
            .field("mode", &self.mode)
            .field("enabled_methods", &self.enabled_methods)
            .field("combination_strategy", &self.combination_strategy)
            .field("meta_genome_length", &self.meta_genome_length)
            .field("enable_dual_encoding", &self.enable_dual_encoding)
            .field(
                "enable_reciprocal_reproduction",
                &self.enable_reciprocal_reproduction,
            )
            .finish_non_exhaustive()
    }
}

/// Eight byte-pattern mutation masks
fn default_masks(g: usize) -> Vec<Vec<u8>> {
    let pattern = |step: usize| -> Vec<u8> { (0..g).map(|i| (i * step % 255) as u8).collect() };
    vec![
        vec![1u8; g],
        vec![255u8; g],
        pattern(1),
        pattern(2),
        pattern(3),
        pattern(5),
        pattern(7),
        pattern(11),
    ]
}

/// Ten divisor-derived rotation offsets
fn default_rotations(g: usize) -> Vec<i64> {
    let g = g as i64;
    vec![1, -1, g / 2, g / 4, g / 8, g / 16, g / 32, g / 3, g / 5, g / 7]
}

/// Eight deterministic permutation maps
///
/// Maps are stored original→new, matching the convention in
/// `sinefold_core::PermutationMap`.
fn default_maps(g: usize) -> Vec<Vec<usize>> {
    let from_order = |order: Vec<usize>| -> Vec<usize> {
        // order[new] = original; invert to original→new.
        let mut map = vec![0usize; g];
        for (new, original) in order.into_iter().enumerate() {
            map[original] = new;
        }
        map
    };
    let interleave = |stride: usize| -> Vec<usize> {
        let mut order = Vec::with_capacity(g);
        for offset in 0..stride {
            order.extend((offset..g).step_by(stride));
        }
        order
    };
    let block_swap = |at: usize| -> Vec<usize> {
        let mut order: Vec<usize> = (at..g).collect();
        order.extend(0..at);
        order
    };

    vec![
        from_order((0..g).rev().collect()),
        from_order(interleave(2)),
        from_order(interleave(2).into_iter().rev().collect()),
        from_order(interleave(3)),
        from_order(interleave(4)),
        from_order(block_swap(g / 2)),
        from_order(block_swap(g / 4)),
        from_order(block_swap(g / 8)),
    ]
}
