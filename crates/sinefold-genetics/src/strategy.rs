//! Reproduction strategies
//!
//! A strategy names which of the eight reproduction methods are enabled,
//! how methods are combined for one reproduction event, and the parameter
//! libraries (mutation masks, rotation positions, permutation maps,
//! per-method weights) those methods draw from.
//!
//! In basic mode the strategy is a copy of the organism configuration. In
//! dual-encoded mode it is decoded from the organism's own bytes, so the
//! strategy itself is subject to selection pressure.

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::OrganismConfig;

/// The eight reproduction methods, in their fixed bit order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReproductionMethod {
    DirectAsexual,
    SelfReproduction,
    Sexual,
    Mutation,
    Rotation,
    Permutation,
    CombinedTransforms,
    EnhancedSexual,
}

impl ReproductionMethod {
    /// Every method, ordered by bit position
    pub const ALL: [ReproductionMethod; 8] = [
        ReproductionMethod::DirectAsexual,
        ReproductionMethod::SelfReproduction,
        ReproductionMethod::Sexual,
        ReproductionMethod::Mutation,
        ReproductionMethod::Rotation,
        ReproductionMethod::Permutation,
        ReproductionMethod::CombinedTransforms,
        ReproductionMethod::EnhancedSexual,
    ];

    /// Bit position in the method bitmask
    pub fn index(self) -> usize {
        match self {
            ReproductionMethod::DirectAsexual => 0,
            ReproductionMethod::SelfReproduction => 1,
            ReproductionMethod::Sexual => 2,
            ReproductionMethod::Mutation => 3,
            ReproductionMethod::Rotation => 4,
            ReproductionMethod::Permutation => 5,
            ReproductionMethod::CombinedTransforms => 6,
            ReproductionMethod::EnhancedSexual => 7,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ReproductionMethod::DirectAsexual => "direct_asexual",
            ReproductionMethod::SelfReproduction => "self_reproduction",
            ReproductionMethod::Sexual => "sexual",
            ReproductionMethod::Mutation => "mutation",
            ReproductionMethod::Rotation => "rotation",
            ReproductionMethod::Permutation => "permutation",
            ReproductionMethod::CombinedTransforms => "combined_transforms",
            ReproductionMethod::EnhancedSexual => "enhanced_sexual",
        }
    }
}

/// A set of reproduction methods, stored as a bitmask
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodSet(u8);

impl MethodSet {
    pub const EMPTY: MethodSet = MethodSet(0);

    /// Every method enabled
    pub fn all() -> Self {
        MethodSet(0xff)
    }

    /// Interpret a raw bitmask byte (bit i enables method i)
    pub fn from_bits(bits: u8) -> Self {
        MethodSet(bits)
    }

    pub fn from_methods(methods: &[ReproductionMethod]) -> Self {
        let mut set = MethodSet::EMPTY;
        for &method in methods {
            set.insert(method);
        }
        set
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn insert(&mut self, method: ReproductionMethod) {
        self.0 |= 1 << method.index();
    }

    pub fn contains(self, method: ReproductionMethod) -> bool {
        self.0 & (1 << method.index()) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn union(self, other: MethodSet) -> MethodSet {
        MethodSet(self.0 | other.0)
    }

    /// Iterate enabled methods in bit order
    pub fn iter(self) -> impl Iterator<Item = ReproductionMethod> {
        ReproductionMethod::ALL
            .into_iter()
            .filter(move |m| self.contains(*m))
    }
}

/// How the enabled methods are combined for one reproduction event
///
/// Ordered: `All < Random < Weighted`. When two strategies merge, the
/// larger of the two wins.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CombinationStrategy {
    /// Use every enabled method once
    #[default]
    All,

    /// Pick 1..=3 methods uniformly
    Random,

    /// Pick 1..=3 methods by normalized weight
    Weighted,
}

impl CombinationStrategy {
    /// Decode a strategy byte (`byte mod 3`)
    pub fn from_byte(byte: u8) -> Self {
        match byte % 3 {
            0 => CombinationStrategy::All,
            1 => CombinationStrategy::Random,
            _ => CombinationStrategy::Weighted,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CombinationStrategy::All => "all",
            CombinationStrategy::Random => "random",
            CombinationStrategy::Weighted => "weighted",
        }
    }
}

/// Byte offsets of the strategy encoding inside a genome
mod layout {
    pub const METHOD_FLAGS: usize = 0;
    pub const COMBINATION: usize = 1;
    pub const MASKS_START: usize = 2;
    pub const MASK_WINDOW: usize = 32;
    pub const MASK_COUNT: usize = 3;
    pub const ROTATIONS_START: usize = 98;
    pub const ROTATION_COUNT: usize = 4;
    pub const MAPS_START: usize = 106;
    pub const MAP_WINDOW: usize = 32;
    pub const MAP_COUNT: usize = 3;
    pub const WEIGHTS_START: usize = 202;
}

/// A fully resolved reproduction strategy
#[derive(Clone, Debug, PartialEq)]
pub struct ReproductionStrategy {
    pub enabled: MethodSet,
    pub combination: CombinationStrategy,
    pub mutation_masks: Vec<Vec<u8>>,
    pub rotation_positions: Vec<i64>,
    pub permutation_maps: Vec<Vec<usize>>,
    pub method_weights: [f64; 8],
}

impl ReproductionStrategy {
    /// Basic mode: the strategy is the configuration
    pub fn from_config(config: &OrganismConfig) -> Self {
        Self {
            enabled: config.enabled_methods,
            combination: config.combination_strategy,
            mutation_masks: config.mutation_masks.clone(),
            rotation_positions: config.rotation_positions.clone(),
            permutation_maps: config.permutation_maps.clone(),
            method_weights: config.method_weights,
        }
    }

    /// Dual-encoded mode: decode the strategy from genome bytes
    ///
    /// Total and side-effect free; any byte range that falls outside the
    /// genome falls back to the configured default for that slot.
    pub fn decode(genome: &[u8], config: &OrganismConfig) -> Self {
        let g = config.genome_length;

        let enabled = genome
            .get(layout::METHOD_FLAGS)
            .map(|&b| MethodSet::from_bits(b))
            .unwrap_or(config.enabled_methods);

        let combination = genome
            .get(layout::COMBINATION)
            .map(|&b| CombinationStrategy::from_byte(b))
            .unwrap_or(config.combination_strategy);

        // Three 32-byte windows, each tiled out to a full-length mask.
        let mut mutation_masks = Vec::with_capacity(layout::MASK_COUNT);
        for i in 0..layout::MASK_COUNT {
            let start = layout::MASKS_START + i * layout::MASK_WINDOW;
            let window = window_of(genome, start, layout::MASK_WINDOW);
            if window.is_empty() {
                if let Some(mask) = default_cycle(&config.mutation_masks, i) {
                    mutation_masks.push(mask.clone());
                }
            } else {
                mutation_masks.push((0..g).map(|k| window[k % window.len()]).collect());
            }
        }

        // Four big-endian u16 positions, reduced modulo the genome length.
        let mut rotation_positions = Vec::with_capacity(layout::ROTATION_COUNT);
        for i in 0..layout::ROTATION_COUNT {
            let start = layout::ROTATIONS_START + i * 2;
            match (genome.get(start), genome.get(start + 1)) {
                (Some(&hi), Some(&lo)) => {
                    let raw = u16::from_be_bytes([hi, lo]) as i64;
                    rotation_positions.push(raw.rem_euclid(g.max(1) as i64));
                }
                _ => {
                    if let Some(&pos) = default_cycle(&config.rotation_positions, i) {
                        rotation_positions.push(pos);
                    }
                }
            }
        }

        // Three swap-constructed permutation maps over [0..G).
        let mut permutation_maps = Vec::with_capacity(layout::MAP_COUNT);
        for i in 0..layout::MAP_COUNT {
            let start = layout::MAPS_START + i * layout::MAP_WINDOW;
            let window = window_of(genome, start, layout::MAP_WINDOW);
            if window.is_empty() {
                if let Some(map) = default_cycle(&config.permutation_maps, i) {
                    permutation_maps.push(map.clone());
                }
            } else {
                let mut map: Vec<usize> = (0..g).collect();
                for (j, &byte) in window.iter().enumerate() {
                    if j < map.len() {
                        let swap_idx = (j + byte as usize) % g;
                        map.swap(j, swap_idx);
                    }
                }
                permutation_maps.push(map);
            }
        }

        let mut method_weights = config.method_weights;
        for (i, weight) in method_weights.iter_mut().enumerate() {
            if let Some(&b) = genome.get(layout::WEIGHTS_START + i) {
                *weight = f64::from(b) / 255.0;
            }
        }

        Self {
            enabled,
            combination,
            mutation_masks,
            rotation_positions,
            permutation_maps,
            method_weights,
        }
    }

    /// Merge two strategies for paired reproduction
    ///
    /// Enabled methods take the union, libraries concatenate, weights
    /// average element-wise, and the combination strategy is the maximum
    /// in the `All < Random < Weighted` order.
    pub fn combine(&self, other: &ReproductionStrategy) -> ReproductionStrategy {
        let mut mutation_masks = self.mutation_masks.clone();
        mutation_masks.extend(other.mutation_masks.iter().cloned());

        let mut rotation_positions = self.rotation_positions.clone();
        rotation_positions.extend(&other.rotation_positions);

        let mut permutation_maps = self.permutation_maps.clone();
        permutation_maps.extend(other.permutation_maps.iter().cloned());

        let mut method_weights = [0.0; 8];
        for i in 0..8 {
            method_weights[i] = (self.method_weights[i] + other.method_weights[i]) / 2.0;
        }

        ReproductionStrategy {
            enabled: self.enabled.union(other.enabled),
            combination: self.combination.max(other.combination),
            mutation_masks,
            rotation_positions,
            permutation_maps,
            method_weights,
        }
    }

    /// Choose which methods participate in one reproduction event
    ///
    /// An empty enabled set falls back to direct-asexual so reproduction
    /// never stalls.
    pub fn select_methods(&self, rng: &mut impl Rng) -> Vec<ReproductionMethod> {
        let enabled: Vec<ReproductionMethod> = self.enabled.iter().collect();
        if enabled.is_empty() {
            return vec![ReproductionMethod::DirectAsexual];
        }

        match self.combination {
            CombinationStrategy::All => enabled,
            CombinationStrategy::Random => {
                let count = rng.gen_range(1..=enabled.len().min(3));
                enabled.choose_multiple(rng, count).copied().collect()
            }
            CombinationStrategy::Weighted => {
                let weights: Vec<f64> = enabled
                    .iter()
                    .map(|m| self.method_weights[m.index()])
                    .collect();
                let count = rng.gen_range(1..=3);
                match WeightedIndex::new(&weights) {
                    Ok(dist) => (0..count).map(|_| enabled[dist.sample(rng)]).collect(),
                    // All-zero weights: degrade to a uniform distinct draw.
                    Err(_) => enabled
                        .choose_multiple(rng, enabled.len().min(3))
                        .copied()
                        .collect(),
                }
            }
        }
    }
}

/// Clipped window into the genome; empty when `start` is out of range
fn window_of(genome: &[u8], start: usize, len: usize) -> &[u8] {
    if start >= genome.len() {
        return &[];
    }
    &genome[start..genome.len().min(start + len)]
}

/// The i-th default, cycling when the library is shorter than needed
fn default_cycle<T>(library: &[T], i: usize) -> Option<&T> {
    if library.is_empty() {
        None
    } else {
        Some(&library[i % library.len()])
    }
}
