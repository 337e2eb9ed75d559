//! Property checks for the sample shuffler

use proptest::prelude::*;
use sinefold_signal::SampleShuffler;

proptest! {
    #[test]
    fn shuffle_round_trips(
        swap in 0.0f64..1.0,
        frame_count in 1usize..300,
        fill in -1000.0f64..1000.0,
    ) {
        let shuffler = SampleShuffler::new(frame_count);
        let samples: Vec<f64> = (0..frame_count).map(|i| fill + i as f64).collect();
        let shuffled = shuffler.shuffle(&samples, swap).unwrap();
        let restored = shuffler.unshuffle(&shuffled, swap).unwrap();
        prop_assert_eq!(restored, samples);
    }

    #[test]
    fn shuffle_preserves_multiset(
        swap in 0.0f64..1.0,
        frame_count in 1usize..300,
    ) {
        let shuffler = SampleShuffler::new(frame_count);
        let samples: Vec<f64> = (0..frame_count).map(|i| i as f64).collect();
        let mut shuffled = shuffler.shuffle(&samples, swap).unwrap();
        shuffled.sort_by(f64::total_cmp);
        prop_assert_eq!(shuffled, samples);
    }
}
