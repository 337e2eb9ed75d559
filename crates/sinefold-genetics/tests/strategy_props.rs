//! Property checks for dual-encoded strategy parsing

use std::sync::Arc;

use proptest::prelude::*;
use sinefold_core::{is_permutation, Blake3Xof};
use sinefold_genetics::{OrganismConfig, ReproductionStrategy};

proptest! {
    /// Parsing is total: any byte sequence decodes to a usable strategy.
    #[test]
    fn decode_accepts_any_bytes(genome in proptest::collection::vec(any::<u8>(), 0..300)) {
        let config = OrganismConfig::basic(128, Arc::new(Blake3Xof));
        let strategy = ReproductionStrategy::decode(&genome, &config);

        for mask in &strategy.mutation_masks {
            prop_assert_eq!(mask.len(), 128);
        }
        for map in &strategy.permutation_maps {
            prop_assert!(is_permutation(map));
        }
        for &position in &strategy.rotation_positions {
            prop_assert!((0..128).contains(&position));
        }
        for &weight in &strategy.method_weights {
            prop_assert!((0.0..=1.0).contains(&weight));
        }
    }

    /// Combination is symmetric in the enabled set and weights.
    #[test]
    fn combine_is_symmetric_in_sets(
        a in proptest::collection::vec(any::<u8>(), 0..260),
        b in proptest::collection::vec(any::<u8>(), 0..260),
    ) {
        let config = OrganismConfig::basic(64, Arc::new(Blake3Xof));
        let left = ReproductionStrategy::decode(&a, &config);
        let right = ReproductionStrategy::decode(&b, &config);

        let ab = left.combine(&right);
        let ba = right.combine(&left);
        prop_assert_eq!(ab.enabled, ba.enabled);
        prop_assert_eq!(ab.combination, ba.combination);
        for i in 0..8 {
            prop_assert!((ab.method_weights[i] - ba.method_weights[i]).abs() < 1e-12);
        }
    }
}
