//! Organisms and their reproduction operators
//!
//! An organism is a fixed-length byte genome plus bookkeeping. Every
//! operator derives a child genome by transforming the parent bytes and
//! re-expanding them through the configured hash, so offspring inherit
//! structure from their parents only through the hash pre-image.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rand::prelude::*;

use crate::config::{OrganismConfig, OrganismMode};
use crate::error::{GeneticsError, Result};
use crate::strategy::{ReproductionMethod, ReproductionStrategy};

/// A member of an evolving population
#[derive(Clone)]
pub struct Organism {
    genome: Vec<u8>,
    meta_genome: Option<Vec<u8>>,

    /// Assigned by the evolution driver after evaluation
    pub fitness: f64,

    /// Assigned at creation time; never changes afterwards
    pub generation: u32,

    config: Arc<OrganismConfig>,
    strategy: ReproductionStrategy,
}

impl PartialEq for Organism {
    fn eq(&self, other: &Self) -> bool {
        self.genome == other.genome && self.meta_genome == other.meta_genome
    }
}

impl Eq for Organism {}

impl Hash for Organism {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.genome.hash(state);
        self.meta_genome.hash(state);
    }
}

impl std::fmt::Debug for Organism {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = hex::encode(&self.genome[..self.genome.len().min(8)]);
        write!(
            f,
            "Organism(genome={prefix}.., fitness={:.4}, generation={})",
            self.fitness, self.generation
        )
    }
}

impl Organism {
    /// Wrap an existing genome
    pub fn new(
        genome: Vec<u8>,
        config: Arc<OrganismConfig>,
        meta_genome: Option<Vec<u8>>,
    ) -> Result<Self> {
        if genome.len() != config.genome_length {
            return Err(GeneticsError::GenomeLength {
                expected: config.genome_length,
                actual: genome.len(),
            });
        }
        if config.mode == OrganismMode::DualEncoded {
            match &meta_genome {
                None => return Err(GeneticsError::MetaGenomeMissing),
                Some(meta) if meta.len() != config.meta_genome_length => {
                    return Err(GeneticsError::MetaGenomeLength {
                        expected: config.meta_genome_length,
                        actual: meta.len(),
                    })
                }
                Some(_) => {}
            }
        }

        let strategy = if config.decodes_strategy() {
            let source = meta_genome.as_deref().unwrap_or(&genome);
            ReproductionStrategy::decode(source, &config)
        } else {
            ReproductionStrategy::from_config(&config)
        };

        Ok(Self {
            genome,
            meta_genome,
            fitness: 0.0,
            generation: 0,
            config,
            strategy,
        })
    }

    /// Create an organism by hash-expanding seed bytes
    pub fn from_seed(seed: &[u8], config: Arc<OrganismConfig>) -> Result<Self> {
        let genome = config.hash.expand(seed, config.genome_length);
        let meta_genome = if config.mode == OrganismMode::DualEncoded {
            let mut meta_seed = seed.to_vec();
            meta_seed.extend_from_slice(b"_meta");
            Some(config.hash.expand(&meta_seed, config.meta_genome_length))
        } else {
            None
        };
        Self::new(genome, config, meta_genome)
    }

    pub fn genome(&self) -> &[u8] {
        &self.genome
    }

    pub fn meta_genome(&self) -> Option<&[u8]> {
        self.meta_genome.as_deref()
    }

    pub fn config(&self) -> &Arc<OrganismConfig> {
        &self.config
    }

    pub fn strategy(&self) -> &ReproductionStrategy {
        &self.strategy
    }

    /// Build a child carrying this organism's meta-genome and config
    fn child(&self, genome: Vec<u8>, generation: u32) -> Organism {
        let config = Arc::clone(&self.config);
        let strategy = if config.decodes_strategy() {
            let source = self.meta_genome.as_deref().unwrap_or(&genome);
            ReproductionStrategy::decode(source, &config)
        } else {
            ReproductionStrategy::from_config(&config)
        };
        Organism {
            genome,
            meta_genome: self.meta_genome.clone(),
            fitness: 0.0,
            generation,
            config,
            strategy,
        }
    }

    fn expand(&self, pre_image: &[u8]) -> Vec<u8> {
        self.config.hash.expand(pre_image, self.config.genome_length)
    }

    /// Direct asexual reproduction: re-hash the genome
    pub fn direct_asexual(&self) -> Organism {
        let genome = self.expand(&self.genome);
        self.child(genome, self.generation + 1)
    }

    /// Self-reproduction: a direct child plus a second child
    ///
    /// The second child uses the sexual split-and-rehash formula against
    /// this organism itself when the sexual method is enabled, otherwise a
    /// mutation with a uniformly drawn mask from the configured library.
    pub fn self_reproduction(&self, rng: &mut impl Rng) -> Result<Vec<Organism>> {
        let first = self.direct_asexual();

        let second = if self
            .config
            .enabled_methods
            .contains(ReproductionMethod::Sexual)
        {
            let split = self.config.genome_length / 2;
            let mut pre_image = self.genome[..split].to_vec();
            pre_image.extend_from_slice(&self.genome[split..]);
            let genome = self.expand(&pre_image);
            self.child(genome, self.generation + 1)
        } else {
            match self.config.mutation_masks.choose(rng) {
                Some(mask) => self.mutate(mask)?,
                None => self.direct_asexual(),
            }
        };

        Ok(vec![first, second])
    }

    /// Sexual reproduction by two-point split and rehash
    ///
    /// With reciprocal reproduction enabled this returns both children;
    /// otherwise a coin flip picks which parent contributes the first
    /// half and one child is returned.
    pub fn reproduce_sexually(&self, partner: &Organism, rng: &mut impl Rng) -> Vec<Organism> {
        let split = self.config.genome_length / 2;
        let generation = self.generation.max(partner.generation) + 1;

        if self.config.enable_reciprocal_reproduction {
            let mut pre_image1 = self.genome[..split].to_vec();
            pre_image1.extend_from_slice(&partner.genome[split..]);
            let mut pre_image2 = partner.genome[..split].to_vec();
            pre_image2.extend_from_slice(&self.genome[split..]);

            vec![
                self.child(self.expand(&pre_image1), generation),
                self.child(self.expand(&pre_image2), generation),
            ]
        } else {
            let (head, tail) = if rng.gen::<bool>() {
                (&self.genome, &partner.genome)
            } else {
                (&partner.genome, &self.genome)
            };
            let mut pre_image = head[..split].to_vec();
            pre_image.extend_from_slice(&tail[split..]);
            vec![self.child(self.expand(&pre_image), generation)]
        }
    }

    /// Mutation: XOR a mask over the genome, then rehash
    pub fn mutate(&self, mask: &[u8]) -> Result<Organism> {
        if mask.len() != self.config.genome_length {
            return Err(GeneticsError::MaskLength {
                expected: self.config.genome_length,
                actual: mask.len(),
            });
        }
        let pre_image: Vec<u8> = self.genome.iter().zip(mask).map(|(g, m)| g ^ m).collect();
        let genome = self.expand(&pre_image);
        Ok(self.child(genome, self.generation + 1))
    }

    /// Rotation: rotate the genome left by `positions` (mod G), then rehash
    pub fn rotate(&self, positions: i64) -> Organism {
        let g = self.config.genome_length;
        let shift = positions.rem_euclid(g.max(1) as i64) as usize;
        let mut pre_image = self.genome[shift..].to_vec();
        pre_image.extend_from_slice(&self.genome[..shift]);
        let genome = self.expand(&pre_image);
        self.child(genome, self.generation + 1)
    }

    /// Permutation: reorder the genome (`permuted[i] = genome[map[i]]`),
    /// then rehash
    pub fn permute(&self, map: &[usize]) -> Result<Organism> {
        if map.len() != self.config.genome_length {
            return Err(GeneticsError::GenomeLength {
                expected: self.config.genome_length,
                actual: map.len(),
            });
        }
        if !sinefold_core::is_permutation(map) {
            return Err(GeneticsError::Core(sinefold_core::CoreError::InvalidPermutation {
                len: map.len(),
            }));
        }
        let pre_image: Vec<u8> = map.iter().map(|&i| self.genome[i]).collect();
        let genome = self.expand(&pre_image);
        Ok(self.child(genome, self.generation + 1))
    }

    /// Omni reproduction: deterministic offspring coverage of every method
    ///
    /// Libraries contribute their leading entries ("first N", no
    /// randomization), so the offspring set is identical for fixed parents
    /// and configuration. The RNG is touched only by self-reproduction
    /// fallbacks and non-reciprocal sexual coin flips.
    pub fn omni_reproduce(
        &self,
        partner: Option<&Organism>,
        rng: &mut impl Rng,
    ) -> Result<Vec<Organism>> {
        let partner = partner.unwrap_or(self);
        let config = &self.config;
        let mut children = Vec::new();

        children.push(self.direct_asexual());
        children.push(partner.direct_asexual());

        children.extend(self.self_reproduction(rng)?);
        children.extend(partner.self_reproduction(rng)?);

        children.extend(self.reproduce_sexually(partner, rng));

        for mask in config.mutation_masks.iter().take(5) {
            children.push(self.mutate(mask)?);
            children.push(partner.mutate(mask)?);
        }

        for &position in config.rotation_positions.iter().take(5) {
            children.push(self.rotate(position));
            children.push(partner.rotate(position));
        }

        for map in config.permutation_maps.iter().take(5) {
            children.push(self.permute(map)?);
            children.push(partner.permute(map)?);
        }

        for mask in config.mutation_masks.iter().take(3) {
            for &position in config.rotation_positions.iter().take(3) {
                children.push(self.mutate(mask)?.rotate(position));
                children.push(partner.mutate(mask)?.rotate(position));
            }
        }

        for sexual_child in self.reproduce_sexually(partner, rng) {
            for mask in config.mutation_masks.iter().take(3) {
                children.push(sexual_child.mutate(mask)?);
            }
        }

        Ok(children)
    }

    /// Reproduce according to the organism's mode
    ///
    /// Basic mode runs the configured asexual or sexual path; dual-encoded
    /// mode (or `enable_dual_encoding`) runs the strategy-combination path,
    /// against itself when no partner is given.
    pub fn reproduce(
        &self,
        partner: Option<&Organism>,
        rng: &mut impl Rng,
    ) -> Result<Vec<Organism>> {
        if self.config.decodes_strategy() {
            return self.dual_encoded_reproduction(partner.unwrap_or(self), rng);
        }

        match partner {
            None => {
                let mut children = Vec::new();
                if self
                    .strategy
                    .enabled
                    .contains(ReproductionMethod::DirectAsexual)
                {
                    children.push(self.direct_asexual());
                }
                if self
                    .strategy
                    .enabled
                    .contains(ReproductionMethod::SelfReproduction)
                {
                    children.extend(self.self_reproduction(rng)?);
                }
                Ok(children)
            }
            Some(partner) => {
                if self.strategy.enabled.contains(ReproductionMethod::Sexual) {
                    Ok(self.reproduce_sexually(partner, rng))
                } else {
                    Ok(Vec::new())
                }
            }
        }
    }

    /// Dual-encoded reproduction through the combined strategy
    ///
    /// Every child is assigned `max(parent generations) + 1` regardless of
    /// which operator produced it, so population history stays monotone.
    fn dual_encoded_reproduction(
        &self,
        partner: &Organism,
        rng: &mut impl Rng,
    ) -> Result<Vec<Organism>> {
        let combined = self.strategy.combine(&partner.strategy);
        let methods = combined.select_methods(rng);

        let mut children = Vec::new();
        for method in methods {
            children.extend(self.apply_method(method, partner, &combined, rng)?);
        }

        let generation = self.generation.max(partner.generation) + 1;
        for child in &mut children {
            child.generation = generation;
        }
        Ok(children)
    }

    fn apply_method(
        &self,
        method: ReproductionMethod,
        partner: &Organism,
        strategy: &ReproductionStrategy,
        rng: &mut impl Rng,
    ) -> Result<Vec<Organism>> {
        let distinct = partner != self;
        let mut children = Vec::new();

        match method {
            ReproductionMethod::DirectAsexual => {
                children.push(self.direct_asexual());
                if distinct {
                    children.push(partner.direct_asexual());
                }
            }
            ReproductionMethod::SelfReproduction => {
                children.extend(self.self_reproduction(rng)?);
                if distinct {
                    children.extend(partner.self_reproduction(rng)?);
                }
            }
            ReproductionMethod::Sexual => {
                children.extend(self.reproduce_sexually(partner, rng));
            }
            ReproductionMethod::Mutation => {
                for mask in &strategy.mutation_masks {
                    children.push(self.mutate(mask)?);
                    if distinct {
                        children.push(partner.mutate(mask)?);
                    }
                }
            }
            ReproductionMethod::Rotation => {
                for &position in &strategy.rotation_positions {
                    children.push(self.rotate(position));
                    if distinct {
                        children.push(partner.rotate(position));
                    }
                }
            }
            ReproductionMethod::Permutation => {
                for map in &strategy.permutation_maps {
                    children.push(self.permute(map)?);
                    if distinct {
                        children.push(partner.permute(map)?);
                    }
                }
            }
            ReproductionMethod::CombinedTransforms => {
                for mask in strategy.mutation_masks.iter().take(2) {
                    for &position in strategy.rotation_positions.iter().take(2) {
                        children.push(self.mutate(mask)?.rotate(position));
                        if distinct {
                            children.push(partner.mutate(mask)?.rotate(position));
                        }
                    }
                }
            }
            ReproductionMethod::EnhancedSexual => {
                for sexual_child in self.reproduce_sexually(partner, rng) {
                    for mask in strategy.mutation_masks.iter().take(2) {
                        children.push(sexual_child.mutate(mask)?);
                    }
                }
            }
        }

        Ok(children)
    }
}
