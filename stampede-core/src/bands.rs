//! Fairness band assignment
//!
//! When any band carries a positive explicit count, the batch is exactly the
//! multiset of those counts, shuffled so submission order does not follow band
//! order. Otherwise bands are handed out round-robin over the requested count.

use crate::types::{default_bands, Band};
use rand::Rng;

/// Turns a set of weighted bands into the ordered band sequence for a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandAssigner {
    bands: Vec<Band>,
}

impl BandAssigner {
    /// Create an assigner; an empty band list falls back to the default bands
    pub fn new(bands: Vec<Band>) -> Self {
        let bands = if bands.is_empty() {
            default_bands()
        } else {
            bands
        };
        Self { bands }
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Whether at least one band fixes its own count
    pub fn has_explicit_counts(&self) -> bool {
        self.bands.iter().any(|band| band.explicit_count() > 0)
    }

    /// Batch size actually launched: the sum of explicit counts when present,
    /// otherwise the requested count
    pub fn effective_count(&self, requested: u64) -> u64 {
        if self.has_explicit_counts() {
            self.bands
                .iter()
                .map(|band| u64::from(band.explicit_count()))
                .sum()
        } else {
            requested
        }
    }

    /// Band for a 1-based ordinal in round-robin mode
    pub fn round_robin(&self, ordinal: u64) -> &Band {
        let index = (ordinal.max(1) - 1) % self.bands.len() as u64;
        &self.bands[index as usize]
    }

    /// Full band sequence for a batch, in submission order
    pub fn assign<R: Rng + ?Sized>(&self, requested: u64, rng: &mut R) -> Vec<Band> {
        if self.has_explicit_counts() {
            let mut submission_order: Vec<Band> = self
                .bands
                .iter()
                .flat_map(|band| {
                    std::iter::repeat(band.clone()).take(band.explicit_count() as usize)
                })
                .collect();
            shuffle(&mut submission_order, rng);
            submission_order
        } else {
            (1..=requested)
                .map(|ordinal| self.round_robin(ordinal).clone())
                .collect()
        }
    }
}

/// In-place Fisher-Yates shuffle
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn tally(bands: &[Band]) -> HashMap<String, u64> {
        let mut counts = HashMap::new();
        for band in bands {
            *counts.entry(band.key.clone()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_empty_bands_use_defaults() {
        let assigner = BandAssigner::new(Vec::new());
        assert_eq!(assigner.bands().len(), 3);
        assert_eq!(assigner.bands()[0].key, "first-class");
    }

    #[test]
    fn test_round_robin_order() {
        let assigner = BandAssigner::new(vec![Band::new("a", 3), Band::new("b", 1)]);
        let mut rng = StdRng::seed_from_u64(7);
        let keys: Vec<String> = assigner
            .assign(5, &mut rng)
            .into_iter()
            .map(|band| band.key)
            .collect();
        assert_eq!(keys, vec!["a", "b", "a", "b", "a"]);
        assert!(!assigner.has_explicit_counts());
        assert_eq!(assigner.effective_count(5), 5);
    }

    #[test]
    fn test_explicit_counts_override_requested() {
        let assigner = BandAssigner::new(vec![
            Band::new("a", 10).with_count(4),
            Band::new("b", 5),
            Band::new("c", 1).with_count(2),
        ]);
        assert!(assigner.has_explicit_counts());
        assert_eq!(assigner.effective_count(100), 6);

        let mut rng = StdRng::seed_from_u64(1);
        let sequence = assigner.assign(100, &mut rng);
        assert_eq!(sequence.len(), 6);
        let counts = tally(&sequence);
        assert_eq!(counts.get("a"), Some(&4));
        assert_eq!(counts.get("b"), None);
        assert_eq!(counts.get("c"), Some(&2));
    }

    #[test]
    fn test_zero_counts_are_round_robin() {
        let assigner = BandAssigner::new(vec![
            Band::new("a", 10).with_count(0),
            Band::new("b", 5),
        ]);
        assert!(!assigner.has_explicit_counts());
        assert_eq!(assigner.effective_count(3), 3);
    }

    #[test]
    fn test_seeded_shuffle_is_reproducible() {
        let assigner = BandAssigner::new(vec![
            Band::new("a", 10).with_count(20),
            Band::new("b", 5).with_count(20),
        ]);
        let first = assigner.assign(0, &mut StdRng::seed_from_u64(42));
        let second = assigner.assign(0, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut items: Vec<u32> = (0..50).collect();
        shuffle(&mut items, &mut StdRng::seed_from_u64(3));
        let mut sorted = items.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..50).collect::<Vec<u32>>());
    }

    proptest! {
        #[test]
        fn prop_explicit_counts_realized_exactly(
            counts in proptest::collection::vec(0u32..40, 1..6),
            seed in any::<u64>(),
        ) {
            let bands: Vec<Band> = counts
                .iter()
                .enumerate()
                .map(|(i, count)| Band::new(format!("band-{}", i), i as u32 + 1).with_count(*count))
                .collect();
            let assigner = BandAssigner::new(bands);
            let sequence = assigner.assign(999, &mut StdRng::seed_from_u64(seed));
            let realized = tally(&sequence);

            if counts.iter().any(|c| *c > 0) {
                prop_assert_eq!(sequence.len() as u64, counts.iter().map(|c| u64::from(*c)).sum::<u64>());
                for (i, count) in counts.iter().enumerate() {
                    let key = format!("band-{}", i);
                    prop_assert_eq!(realized.get(&key).copied().unwrap_or(0), u64::from(*count));
                }
            } else {
                prop_assert_eq!(sequence.len(), 999);
            }
        }
    }
}
