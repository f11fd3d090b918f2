//! Property tests for the detection engine and cover extraction.

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use slpa::community::{label_histogram, Listener, Speaker};
use slpa::{AdjacencyList, GraphModel, OverlappingCommunityDetection, Slpa};
use std::collections::HashSet;

const TOL: f64 = 1e-9;

fn graph_strategy() -> impl Strategy<Value = AdjacencyList> {
    (1usize..12).prop_flat_map(|n| {
        prop::collection::vec((0..n, 0..n), 0..30)
            .prop_map(move |edges| AdjacencyList::from_edges(n, &edges).unwrap())
    })
}

fn rules_strategy() -> impl Strategy<Value = (Speaker, Listener)> {
    (
        prop_oneof![Just(Speaker::Uniform), Just(Speaker::Latest)],
        prop_oneof![Just(Listener::Popularity), Just(Listener::Lowest)],
    )
}

proptest! {
    #[test]
    fn memories_have_fixed_length(
        graph in graph_strategy(),
        memory_size in 1usize..30,
        seed in any::<u64>(),
        (speaker, listener) in rules_strategy(),
    ) {
        let slpa = Slpa::new()
            .with_memory_size(memory_size)
            .with_speaker_rule(speaker)
            .with_listener_rule(listener);
        let mut rng = StdRng::seed_from_u64(seed);
        let memories = slpa.propagate(&graph, &mut rng).unwrap();

        prop_assert_eq!(memories.len(), graph.node_count());
        for (i, memory) in memories.iter().enumerate() {
            prop_assert_eq!(memory.len(), memory_size);
            prop_assert_eq!(memory[0], i);
            prop_assert_eq!(label_histogram(memory).total(), memory_size);
        }
    }

    #[test]
    fn cover_rows_are_distributions(
        graph in graph_strategy(),
        memory_size in 1usize..30,
        threshold in 0.0f64..=1.0,
        seed in any::<u64>(),
        (speaker, listener) in rules_strategy(),
    ) {
        let cover = Slpa::new()
            .with_memory_size(memory_size)
            .with_probability_threshold(threshold)
            .with_speaker_rule(speaker)
            .with_listener_rule(listener)
            .with_seed(seed)
            .detect_overlapping(&graph)
            .unwrap();

        for (i, row) in cover.memberships().rows().into_iter().enumerate() {
            prop_assert!((row.sum() - 1.0).abs() < TOL, "row {} sums to {}", i, row.sum());
            prop_assert!(row.iter().any(|&d| d > 0.0));
            prop_assert!(row.iter().all(|&d| (0.0..=1.0 + TOL).contains(&d)));
        }
    }

    #[test]
    fn columns_follow_first_seen_order(
        graph in graph_strategy(),
        memory_size in 1usize..30,
        threshold in 0.0f64..=1.0,
        seed in any::<u64>(),
    ) {
        let slpa = Slpa::new()
            .with_memory_size(memory_size)
            .with_probability_threshold(threshold);
        let mut rng = StdRng::seed_from_u64(seed);
        let memories = slpa.propagate(&graph, &mut rng).unwrap();

        // Independent registry: scan nodes in order, retained labels ascending.
        let mut expected = Vec::new();
        let mut seen = HashSet::new();
        let mut sizes = Vec::new();
        for memory in memories.iter() {
            let filtered = label_histogram(memory).filter(memory_size, threshold);
            for &label in filtered.entries.keys() {
                if seen.insert(label) {
                    expected.push(label);
                }
            }
            sizes.push(expected.len());
        }
        prop_assert!(sizes.windows(2).all(|w| w[0] <= w[1]));

        let cover = slpa::extract_cover(&graph, memories, memory_size, threshold).unwrap();
        prop_assert_eq!(cover.labels(), expected.as_slice());
        prop_assert_eq!(cover.community_count(), expected.len());
    }

    #[test]
    fn seeded_runs_replay(
        graph in graph_strategy(),
        memory_size in 1usize..20,
        seed in any::<u64>(),
    ) {
        let slpa = Slpa::new().with_memory_size(memory_size).with_seed(seed);
        let a = slpa.detect_overlapping(&graph).unwrap();
        let b = slpa.detect_overlapping(&graph).unwrap();
        prop_assert_eq!(a.memberships(), b.memberships());
        prop_assert_eq!(a.labels(), b.labels());
    }
}
