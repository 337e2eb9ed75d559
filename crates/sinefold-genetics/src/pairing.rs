//! Pairing strategies for reproduction
//!
//! Pairing works over population indices so the driver can hand slices of
//! the evaluated population to parallel workers without cloning. Odd
//! organisms are reported separately and take the unpaired-organism path
//! of whichever evolution mode is running.

use rand::prelude::*;
use serde::{Deserialize, Serialize};

use crate::organism::Organism;

/// How organisms are matched into reproduction pairs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairingStrategy {
    /// Shuffle, then take consecutive pairs
    #[default]
    Random,

    /// Sort by fitness descending, pair neighbours
    EliteVsElite,

    /// Sort descending, pair rank `i` with rank `i + |P|/2`
    EliteVsChallenger,

    /// Sort descending, pair rank `i` with rank `|P|-1-i`
    Complementary,
}

/// Index pairs plus the indices left unpaired
#[derive(Clone, Debug, Default)]
pub struct Pairing {
    pub pairs: Vec<(usize, usize)>,
    pub unpaired: Vec<usize>,
}

/// Pair a population according to the strategy
pub fn pair_population(
    population: &[Organism],
    strategy: PairingStrategy,
    rng: &mut impl Rng,
) -> Pairing {
    let n = population.len();
    if n < 2 {
        return Pairing {
            pairs: Vec::new(),
            unpaired: (0..n).collect(),
        };
    }

    let mut indices: Vec<usize> = (0..n).collect();
    match strategy {
        PairingStrategy::Random => {
            indices.shuffle(rng);
            consecutive_pairs(&indices)
        }
        PairingStrategy::EliteVsElite => {
            sort_by_fitness_desc(&mut indices, population);
            consecutive_pairs(&indices)
        }
        PairingStrategy::EliteVsChallenger => {
            sort_by_fitness_desc(&mut indices, population);
            let mid = n / 2;
            let pairs: Vec<(usize, usize)> = (0..mid)
                .filter(|i| i + mid < n)
                .map(|i| (indices[i], indices[i + mid]))
                .collect();
            let unpaired = leftover(&indices, &pairs);
            Pairing { pairs, unpaired }
        }
        PairingStrategy::Complementary => {
            sort_by_fitness_desc(&mut indices, population);
            let pairs: Vec<(usize, usize)> = (0..n / 2)
                .map(|i| (indices[i], indices[n - 1 - i]))
                .collect();
            let unpaired = leftover(&indices, &pairs);
            Pairing { pairs, unpaired }
        }
    }
}

/// Stable fitness sort, highest first; index order breaks ties
fn sort_by_fitness_desc(indices: &mut [usize], population: &[Organism]) {
    indices.sort_by(|&a, &b| population[b].fitness.total_cmp(&population[a].fitness));
}

fn consecutive_pairs(indices: &[usize]) -> Pairing {
    let pairs: Vec<(usize, usize)> = indices.chunks_exact(2).map(|c| (c[0], c[1])).collect();
    let unpaired = if indices.len() % 2 == 1 {
        vec![indices[indices.len() - 1]]
    } else {
        Vec::new()
    };
    Pairing { pairs, unpaired }
}

fn leftover(indices: &[usize], pairs: &[(usize, usize)]) -> Vec<usize> {
    let mut paired = vec![false; indices.len()];
    for &(a, b) in pairs {
        paired[a] = true;
        paired[b] = true;
    }
    indices.iter().copied().filter(|&i| !paired[i]).collect()
}
