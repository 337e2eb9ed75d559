//! Evolution driver
//!
//! One loop supports all four evolution modes. Per generation:
//!
//! 1. Evaluate fitness for every organism (data-parallel)
//! 2. Update the best organism ever seen
//! 3. Record history and invoke the optional generation callback
//! 4. Reproduce according to the mode (pairs data-parallel, results
//!    concatenated in pairing order)
//! 5. Enforce elitism, then the population cap
//! 6. Let the adaptive sizer propose the next population size
//!
//! All randomness flows from one ChaCha20 generator seeded from the
//! configuration. Parallel reproduction stays deterministic because every
//! pair gets its own generator, seeded sequentially from the driver RNG
//! before the parallel fan-out.

use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use rand::prelude::*;
use rand_chacha::ChaCha20Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::autopop::{AutoPopState, AutoPopulationConfig};
use crate::error::{GeneticsError, Result};
use crate::organism::Organism;
use crate::pairing::{pair_population, PairingStrategy};

/// Evolution mode
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvolutionMode {
    /// Intergenerational tournaments between parents and offspring
    #[default]
    Tournament,

    /// Fitness-sorted parent selection with sexual reproduction
    Simple,

    /// Omni-reproduction for maximum offspring diversity
    Omni,

    /// Strategy-combining reproduction for dual-encoded organisms
    DualEncoded,
}

/// Configuration for one evolution run
#[derive(Clone, Debug)]
pub struct EvolutionConfig {
    pub mode: EvolutionMode,
    pub pairing: PairingStrategy,
    pub max_generations: u32,

    /// Population ceiling; breaching it triggers an elite cull
    pub population_cap: usize,

    /// Fraction of the cap kept when culling
    pub elite_fraction: f64,

    /// Fraction of the population admitted as parents in Simple mode
    pub selection_pressure: f64,

    /// Seed for the driver RNG; identical seeds replay identical runs
    pub seed: u64,

    /// Attach a strategy analysis to every history record
    pub track_strategy_history: bool,

    pub auto_population: Option<AutoPopulationConfig>,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            mode: EvolutionMode::Tournament,
            pairing: PairingStrategy::Random,
            max_generations: 10,
            population_cap: 1000,
            elite_fraction: 0.1,
            selection_pressure: 0.5,
            seed: 0,
            track_strategy_history: false,
            auto_population: None,
        }
    }
}

impl EvolutionConfig {
    pub fn tournament() -> Self {
        Self::default()
    }

    pub fn simple() -> Self {
        Self {
            mode: EvolutionMode::Simple,
            ..Self::default()
        }
    }

    pub fn omni() -> Self {
        Self {
            mode: EvolutionMode::Omni,
            ..Self::default()
        }
    }

    pub fn dual_encoded() -> Self {
        Self {
            mode: EvolutionMode::DualEncoded,
            track_strategy_history: true,
            ..Self::default()
        }
    }
}

/// Aggregate statistics over the strategies present in a population
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StrategyAnalysis {
    pub total_organisms: usize,
    /// Count per `<combination>_<enabled-method-count>` signature
    pub strategy_counts: BTreeMap<String, usize>,
    /// How many organisms enable each method
    pub method_usage: BTreeMap<String, usize>,
    /// Number of distinct strategy signatures
    pub diversity: usize,
    pub avg_methods_enabled: f64,
    /// Fraction of distinct genomes
    pub genome_variation: f64,
}

/// One history entry per generation
///
/// History stores snapshots of fitness and aggregate statistics, never
/// organism references; organisms are owned by the population vector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub generation: u32,
    pub population_size: usize,
    pub best_fitness: f64,
    pub avg_fitness: f64,
    pub generation_time: Duration,
    pub strategy_analysis: Option<StrategyAnalysis>,
}

/// Read-only view handed to the per-generation callback
///
/// The callback runs synchronously after fitness evaluation and before
/// reproduction; the population snapshot carries evaluated fitness.
pub struct GenerationSnapshot<'a> {
    pub generation: u32,
    pub population: &'a [Organism],
    pub record: &'a GenerationRecord,
    pub history: &'a [GenerationRecord],
}

/// Final state of an evolution run
#[derive(Clone, Debug)]
pub struct EvolutionOutcome {
    pub population: Vec<Organism>,
    /// Highest-fitness organism observed across all generations
    pub best: Option<Organism>,
    pub history: Vec<GenerationRecord>,
}

/// Evaluate fitness for every organism in place (data-parallel)
pub fn evaluate_population<F>(population: &mut [Organism], fitness: F)
where
    F: Fn(&Organism) -> f64 + Sync,
{
    population
        .par_iter_mut()
        .for_each(|organism| organism.fitness = fitness(organism));
}

/// Run evolution to `max_generations`
pub fn evolve<F>(
    initial: Vec<Organism>,
    fitness: F,
    config: &EvolutionConfig,
) -> Result<EvolutionOutcome>
where
    F: Fn(&Organism) -> f64 + Sync,
{
    evolve_with_callback(initial, fitness, config, |_| {})
}

/// Run evolution, invoking `callback` once per generation
pub fn evolve_with_callback<F, C>(
    initial: Vec<Organism>,
    fitness: F,
    config: &EvolutionConfig,
    mut callback: C,
) -> Result<EvolutionOutcome>
where
    F: Fn(&Organism) -> f64 + Sync,
    C: FnMut(GenerationSnapshot<'_>),
{
    if initial.is_empty() {
        return Err(GeneticsError::EmptyPopulation);
    }

    let mut rng = ChaCha20Rng::seed_from_u64(config.seed);
    let mut population = initial;
    let mut best: Option<Organism> = None;
    let mut history: Vec<GenerationRecord> = Vec::with_capacity(config.max_generations as usize);
    let mut auto_state = config.auto_population.clone().map(AutoPopState::new);

    for generation in 1..=config.max_generations {
        let start = Instant::now();

        // 1. Evaluate fitness in parallel.
        evaluate_population(&mut population, &fitness);

        // 2. Track the best organism ever seen.
        if let Some(current_best) = population
            .iter()
            .max_by(|a, b| a.fitness.total_cmp(&b.fitness))
        {
            if best
                .as_ref()
                .map_or(true, |b| current_best.fitness > b.fitness)
            {
                best = Some(current_best.clone());
            }
        }

        // 3. Record history and hand a snapshot to the callback.
        let best_fitness = population
            .iter()
            .map(|o| o.fitness)
            .fold(f64::NEG_INFINITY, f64::max);
        let avg_fitness =
            population.iter().map(|o| o.fitness).sum::<f64>() / population.len() as f64;
        history.push(GenerationRecord {
            generation,
            population_size: population.len(),
            best_fitness,
            avg_fitness,
            generation_time: Duration::ZERO,
            strategy_analysis: config
                .track_strategy_history
                .then(|| analyze_population(&population)),
        });
        debug!(generation, size = population.len(), best_fitness, "generation evaluated");

        if let Some((record, past)) = history.split_last() {
            callback(GenerationSnapshot {
                generation,
                population: &population,
                record,
                history: past,
            });
        }

        let pre_reproduction_size = population.len();

        // 4. Reproduce according to the mode.
        let mut new_population = match config.mode {
            EvolutionMode::Tournament => {
                tournament_reproduction(&population, &fitness, config, &mut rng)?
            }
            EvolutionMode::Simple => simple_reproduction(&population, config, &mut rng)?,
            EvolutionMode::Omni => omni_reproduction(&population, config, &mut rng)?,
            EvolutionMode::DualEncoded => dual_reproduction(&population, config, &mut rng)?,
        };

        // 5. Elitism, then the cap.
        if let Some(best) = &best {
            if !new_population.contains(best) {
                new_population.push(best.clone());
            }
        }
        population = new_population;

        if population.len() > config.population_cap {
            sort_by_fitness_desc(&mut population);
            let keep = ((config.population_cap as f64) * config.elite_fraction) as usize;
            population.truncate(keep.max(1));
            debug!(kept = population.len(), "population cap enforced");
        }

        let generation_time = start.elapsed();
        if let Some(record) = history.last_mut() {
            record.generation_time = generation_time;
        }

        // 6. Adaptive sizing.
        if let Some(state) = auto_state.as_mut() {
            let target = state
                .adjust(pre_reproduction_size, generation_time)
                .max(1);
            resize_population(&mut population, target);
        }
    }

    Ok(EvolutionOutcome {
        population,
        best,
        history,
    })
}

/// Intergenerational tournament between two parents and their offspring
///
/// The champion child always survives; a parent survives only when
/// strictly fitter than the champion child.
fn intergenerational_tournament<F>(
    parent1: &Organism,
    parent2: &Organism,
    fitness: &F,
    rng: &mut impl Rng,
) -> Vec<Organism>
where
    F: Fn(&Organism) -> f64 + Sync,
{
    let mut children = parent1.reproduce_sexually(parent2, rng);
    for child in &mut children {
        child.fitness = fitness(child);
    }

    let mut parent1 = parent1.clone();
    parent1.fitness = fitness(&parent1);
    let mut parent2 = parent2.clone();
    parent2.fitness = fitness(&parent2);

    let champion = match children.len() {
        0 => None,
        1 => Some(children.remove(0)),
        _ => {
            let second = children.pop();
            let first = children.pop();
            match (first, second) {
                (Some(first), Some(second)) => {
                    Some(if first.fitness > second.fitness { first } else { second })
                }
                _ => None,
            }
        }
    };
    let champion_fitness = champion.as_ref().map_or(f64::NEG_INFINITY, |c| c.fitness);

    let mut survivors = Vec::new();
    if parent1.fitness > champion_fitness {
        survivors.push(parent1);
    }
    if parent2.fitness > champion_fitness {
        survivors.push(parent2);
    }
    if let Some(champion) = champion {
        survivors.push(champion);
    }
    survivors
}

fn tournament_reproduction<F>(
    population: &[Organism],
    fitness: &F,
    config: &EvolutionConfig,
    rng: &mut ChaCha20Rng,
) -> Result<Vec<Organism>>
where
    F: Fn(&Organism) -> f64 + Sync,
{
    let pairing = pair_population(population, config.pairing, rng);
    let pair_seeds = draw_seeds(rng, pairing.pairs.len());
    let unpaired_seeds = draw_seeds(rng, pairing.unpaired.len());

    let pair_results: Vec<Vec<Organism>> = pairing
        .pairs
        .par_iter()
        .zip(pair_seeds.par_iter())
        .map(|(&(a, b), &seed)| {
            let mut pair_rng = ChaCha20Rng::seed_from_u64(seed);
            intergenerational_tournament(&population[a], &population[b], fitness, &mut pair_rng)
        })
        .collect();

    let unpaired_results: Vec<Vec<Organism>> = pairing
        .unpaired
        .par_iter()
        .zip(unpaired_seeds.par_iter())
        .map(|(&i, &seed)| {
            let mut org_rng = ChaCha20Rng::seed_from_u64(seed);
            population[i].self_reproduction(&mut org_rng)
        })
        .collect::<Result<_>>()?;

    Ok(concat_in_order(pair_results, unpaired_results))
}

fn simple_reproduction(
    population: &[Organism],
    config: &EvolutionConfig,
    rng: &mut ChaCha20Rng,
) -> Result<Vec<Organism>> {
    let mut sorted = population.to_vec();
    sort_by_fitness_desc(&mut sorted);

    let num_parents = ((sorted.len() as f64 * config.selection_pressure) as usize)
        .max(2)
        .min(sorted.len());
    let parents = &sorted[..num_parents];
    if parents.len() < 2 {
        // A lone organism cannot recombine; carry the population forward.
        return Ok(population.to_vec());
    }

    let target = population.len();
    let children_per_pair = if parents[0].config().enable_reciprocal_reproduction {
        2
    } else {
        1
    };

    // Parent pairs are sampled sequentially from the driver RNG, then the
    // reproductions fan out in parallel.
    let mut jobs = Vec::new();
    let mut expected = 0usize;
    while expected < target {
        let i = rng.gen_range(0..parents.len());
        let mut j = rng.gen_range(0..parents.len() - 1);
        if j >= i {
            j += 1;
        }
        jobs.push((i, j, rng.gen::<u64>()));
        expected += children_per_pair;
    }

    let batches: Vec<Vec<Organism>> = jobs
        .par_iter()
        .map(|&(i, j, seed)| {
            let mut pair_rng = ChaCha20Rng::seed_from_u64(seed);
            parents[i].reproduce_sexually(&parents[j], &mut pair_rng)
        })
        .collect();

    let mut children: Vec<Organism> = batches.into_iter().flatten().collect();
    children.truncate(target);
    Ok(children)
}

fn omni_reproduction(
    population: &[Organism],
    config: &EvolutionConfig,
    rng: &mut ChaCha20Rng,
) -> Result<Vec<Organism>> {
    let pairing = pair_population(population, config.pairing, rng);
    let pair_seeds = draw_seeds(rng, pairing.pairs.len());
    let unpaired_seeds = draw_seeds(rng, pairing.unpaired.len());

    let pair_results: Vec<Vec<Organism>> = pairing
        .pairs
        .par_iter()
        .zip(pair_seeds.par_iter())
        .map(|(&(a, b), &seed)| {
            let mut pair_rng = ChaCha20Rng::seed_from_u64(seed);
            population[a].omni_reproduce(Some(&population[b]), &mut pair_rng)
        })
        .collect::<Result<_>>()?;

    let unpaired_results: Vec<Vec<Organism>> = pairing
        .unpaired
        .par_iter()
        .zip(unpaired_seeds.par_iter())
        .map(|(&i, &seed)| {
            let mut org_rng = ChaCha20Rng::seed_from_u64(seed);
            population[i].omni_reproduce(None, &mut org_rng)
        })
        .collect::<Result<_>>()?;

    Ok(concat_in_order(pair_results, unpaired_results))
}

fn dual_reproduction(
    population: &[Organism],
    config: &EvolutionConfig,
    rng: &mut ChaCha20Rng,
) -> Result<Vec<Organism>> {
    let pairing = pair_population(population, config.pairing, rng);
    let pair_seeds = draw_seeds(rng, pairing.pairs.len());
    let unpaired_seeds = draw_seeds(rng, pairing.unpaired.len());

    let pair_results: Vec<Vec<Organism>> = pairing
        .pairs
        .par_iter()
        .zip(pair_seeds.par_iter())
        .map(|(&(a, b), &seed)| {
            let mut pair_rng = ChaCha20Rng::seed_from_u64(seed);
            population[a].reproduce(Some(&population[b]), &mut pair_rng)
        })
        .collect::<Result<_>>()?;

    let unpaired_results: Vec<Vec<Organism>> = pairing
        .unpaired
        .par_iter()
        .zip(unpaired_seeds.par_iter())
        .map(|(&i, &seed)| {
            let mut org_rng = ChaCha20Rng::seed_from_u64(seed);
            population[i].reproduce(None, &mut org_rng)
        })
        .collect::<Result<_>>()?;

    Ok(concat_in_order(pair_results, unpaired_results))
}

/// Compute strategy statistics for a population
pub fn analyze_population(population: &[Organism]) -> StrategyAnalysis {
    let mut analysis = StrategyAnalysis {
        total_organisms: population.len(),
        ..StrategyAnalysis::default()
    };
    if population.is_empty() {
        return analysis;
    }

    let mut total_methods = 0usize;
    for organism in population {
        let strategy = organism.strategy();
        let key = format!("{}_{}", strategy.combination.name(), strategy.enabled.len());
        *analysis.strategy_counts.entry(key).or_insert(0) += 1;
        for method in strategy.enabled.iter() {
            *analysis.method_usage.entry(method.name().to_string()).or_insert(0) += 1;
            total_methods += 1;
        }
    }

    analysis.diversity = analysis.strategy_counts.len();
    analysis.avg_methods_enabled = total_methods as f64 / population.len() as f64;

    let unique_genomes: HashSet<&[u8]> = population.iter().map(|o| o.genome()).collect();
    analysis.genome_variation = unique_genomes.len() as f64 / population.len() as f64;
    analysis
}

/// Per-pair seeds drawn sequentially so parallel reproduction replays
fn draw_seeds(rng: &mut ChaCha20Rng, count: usize) -> Vec<u64> {
    (0..count).map(|_| rng.gen()).collect()
}

/// Pair results first (in pairing order), then unpaired results
fn concat_in_order(pairs: Vec<Vec<Organism>>, unpaired: Vec<Vec<Organism>>) -> Vec<Organism> {
    let mut out = Vec::new();
    for batch in pairs.into_iter().chain(unpaired) {
        out.extend(batch);
    }
    out
}

fn sort_by_fitness_desc(population: &mut [Organism]) {
    population.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
}

/// Apply a sizer proposal: truncate down, or duplicate the best upwards
fn resize_population(population: &mut Vec<Organism>, target: usize) {
    if population.is_empty() || population.len() == target {
        return;
    }
    sort_by_fitness_desc(population);
    if target < population.len() {
        population.truncate(target);
    } else {
        let best = population[0].clone();
        while population.len() < target {
            population.push(best.clone());
        }
    }
}
