//! Cross-mode evolution behavior

use std::sync::Arc;

use sinefold_core::{Blake3Xof, Sha256Xof, Xof};
use sinefold_genetics::{
    evolve, EvolutionConfig, EvolutionMode, Organism, OrganismConfig, PairingStrategy,
};

/// Opt into driver diagnostics with e.g. `RUST_LOG=sinefold_genetics=debug`
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn seed_population(count: usize, config: &Arc<OrganismConfig>) -> Vec<Organism> {
    (0..count)
        .map(|i| Organism::from_seed(format!("organism-{i}").as_bytes(), Arc::clone(config)).unwrap())
        .collect()
}

/// Count of zero bits, so fitness has a clear optimum
fn zero_bits(organism: &Organism) -> f64 {
    organism
        .genome()
        .iter()
        .map(|b| f64::from(b.count_zeros()))
        .sum()
}

#[test]
fn every_mode_completes_and_tracks_a_best() {
    init_tracing();
    for mode in [
        EvolutionMode::Tournament,
        EvolutionMode::Simple,
        EvolutionMode::Omni,
        EvolutionMode::DualEncoded,
    ] {
        let organism_config = if mode == EvolutionMode::DualEncoded {
            Arc::new(OrganismConfig::dual_encoded(256, Arc::new(Blake3Xof)))
        } else {
            Arc::new(OrganismConfig::basic(64, Arc::new(Blake3Xof)))
        };
        let config = EvolutionConfig {
            mode,
            max_generations: 3,
            population_cap: 300,
            seed: 7,
            ..EvolutionConfig::default()
        };

        let outcome = evolve(seed_population(8, &organism_config), zero_bits, &config)
            .unwrap_or_else(|e| panic!("mode {mode:?} failed: {e}"));
        assert!(!outcome.population.is_empty(), "mode {mode:?} emptied the population");
        assert_eq!(outcome.history.len(), 3);

        let best = outcome.best.expect("best tracked");
        let final_max = outcome
            .history
            .last()
            .map(|record| record.best_fitness)
            .unwrap();
        assert!(best.fitness >= final_max - 1e-9);
    }
}

#[test]
fn every_pairing_strategy_completes() {
    let organism_config = Arc::new(OrganismConfig::basic(32, Arc::new(Blake3Xof)));
    for pairing in [
        PairingStrategy::Random,
        PairingStrategy::EliteVsElite,
        PairingStrategy::EliteVsChallenger,
        PairingStrategy::Complementary,
    ] {
        let config = EvolutionConfig {
            pairing,
            max_generations: 3,
            seed: 11,
            ..EvolutionConfig::tournament()
        };
        // Odd-sized population exercises the unpaired path.
        let outcome = evolve(seed_population(7, &organism_config), zero_bits, &config).unwrap();
        assert!(!outcome.population.is_empty());
    }
}

#[test]
fn generation_numbers_stay_monotone() {
    let organism_config = Arc::new(OrganismConfig::basic(32, Arc::new(Blake3Xof)));
    let config = EvolutionConfig {
        max_generations: 4,
        seed: 3,
        ..EvolutionConfig::tournament()
    };
    let outcome = evolve(seed_population(6, &organism_config), zero_bits, &config).unwrap();

    // Four generations of tournaments: nothing can be older than the run.
    for organism in &outcome.population {
        assert!(organism.generation <= 4);
    }
    let max_generation = outcome
        .population
        .iter()
        .map(|o| o.generation)
        .max()
        .unwrap();
    assert!(max_generation >= 1);
}

#[test]
fn hash_choice_changes_genomes_not_behavior() {
    let seeds = |hash: Arc<dyn Xof>| {
        let config = Arc::new(OrganismConfig::basic(32, hash));
        seed_population(6, &config)
    };
    let blake = seeds(Arc::new(Blake3Xof));
    let sha = seeds(Arc::new(Sha256Xof));

    // Same seeds, different hashes: different genomes.
    assert_ne!(blake[0].genome(), sha[0].genome());

    let config = EvolutionConfig {
        max_generations: 3,
        seed: 5,
        ..EvolutionConfig::tournament()
    };
    assert!(evolve(blake, zero_bits, &config).is_ok());
    assert!(evolve(sha, zero_bits, &config).is_ok());
}

#[test]
fn history_records_serialize() {
    let organism_config = Arc::new(OrganismConfig::basic(32, Arc::new(Blake3Xof)));
    let config = EvolutionConfig {
        max_generations: 2,
        seed: 23,
        ..EvolutionConfig::tournament()
    };
    let outcome = evolve(seed_population(4, &organism_config), zero_bits, &config).unwrap();

    let json = serde_json::to_string(&outcome.history).unwrap();
    assert!(json.contains("best_fitness"));
    let restored: Vec<sinefold_genetics::GenerationRecord> = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.len(), outcome.history.len());
}

#[test]
fn dual_encoded_strategies_drift_over_generations() {
    let organism_config = Arc::new(OrganismConfig::dual_encoded(256, Arc::new(Blake3Xof)));
    let config = EvolutionConfig {
        max_generations: 4,
        population_cap: 400,
        seed: 19,
        ..EvolutionConfig::dual_encoded()
    };

    let outcome = evolve(seed_population(8, &organism_config), zero_bits, &config).unwrap();
    let analyses: Vec<_> = outcome
        .history
        .iter()
        .filter_map(|record| record.strategy_analysis.as_ref())
        .collect();
    assert_eq!(analyses.len(), 4);
    // The population keeps carrying decodable strategies.
    for analysis in analyses {
        assert!(analysis.avg_methods_enabled >= 0.0);
        assert!(analysis.diversity >= 1);
    }
}
