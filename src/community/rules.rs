//! Speaker and listener decision rules.
//!
//! Each round, every node acts once as a **listener**. Each of its successors
//! acts as a **speaker** and broadcasts one label drawn from its own memory;
//! the listener then picks one of the broadcasts and appends it to its memory.
//!
//! Rules receive the engine's generator as `&mut dyn RngCore`, so a seeded run
//! replays exactly no matter which rules are plugged in.
//!
//! | Identifier   | Role     | Policy                                              |
//! |--------------|----------|-----------------------------------------------------|
//! | `UNIFORM`    | speaker  | random memory position (frequency-proportional)     |
//! | `LATEST`     | speaker  | most recent memory entry                            |
//! | `POPULARITY` | listener | most frequent broadcast, random among ties          |
//! | `LOWEST`     | listener | smallest broadcast label                            |
//!
//! Both listeners fall back to the listener's own index when nothing was
//! received (a node without successors).

use crate::error::{Error, Result};
use crate::graph::GraphModel;
use rand::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Decides which label a speaker broadcasts.
pub trait SpeakerRule {
    /// Identifier reported in the parameter view.
    fn name(&self) -> &str;

    /// Pick the label `speaker` broadcasts, looking only at its own memory.
    fn choose_broadcast_label<G: GraphModel + ?Sized>(
        &self,
        graph: &G,
        speaker: usize,
        memory: &[usize],
        rng: &mut dyn RngCore,
    ) -> usize;
}

/// Decides which received label a listener adopts.
pub trait ListenerRule {
    /// Identifier reported in the parameter view.
    fn name(&self) -> &str;

    /// Pick the label `listener` adopts from this round's broadcasts.
    ///
    /// `received` maps each speaking neighbor to the label it broadcast and
    /// may be empty.
    fn choose_accepted_label<G: GraphModel + ?Sized>(
        &self,
        graph: &G,
        listener: usize,
        received: &BTreeMap<usize, usize>,
        rng: &mut dyn RngCore,
    ) -> usize;
}

/// Broadcasts a uniformly random memory entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UniformSpeaker;

impl SpeakerRule for UniformSpeaker {
    fn name(&self) -> &str {
        "UNIFORM"
    }

    fn choose_broadcast_label<G: GraphModel + ?Sized>(
        &self,
        _graph: &G,
        speaker: usize,
        memory: &[usize],
        rng: &mut dyn RngCore,
    ) -> usize {
        memory.choose(rng).copied().unwrap_or(speaker)
    }
}

/// Broadcasts the most recent memory entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatestSpeaker;

impl SpeakerRule for LatestSpeaker {
    fn name(&self) -> &str {
        "LATEST"
    }

    fn choose_broadcast_label<G: GraphModel + ?Sized>(
        &self,
        _graph: &G,
        speaker: usize,
        memory: &[usize],
        _rng: &mut dyn RngCore,
    ) -> usize {
        memory.last().copied().unwrap_or(speaker)
    }
}

/// Adopts the label broadcast by the most neighbors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopularityListener;

impl ListenerRule for PopularityListener {
    fn name(&self) -> &str {
        "POPULARITY"
    }

    fn choose_accepted_label<G: GraphModel + ?Sized>(
        &self,
        _graph: &G,
        listener: usize,
        received: &BTreeMap<usize, usize>,
        rng: &mut dyn RngCore,
    ) -> usize {
        let mut label_counts: BTreeMap<usize, usize> = BTreeMap::new();
        for &label in received.values() {
            *label_counts.entry(label).or_insert(0) += 1;
        }

        let Some(&max_count) = label_counts.values().max() else {
            return listener;
        };

        // Ascending label order keeps seeded tie-breaks reproducible.
        let candidates: Vec<usize> = label_counts
            .iter()
            .filter(|(_, &count)| count == max_count)
            .map(|(&label, _)| label)
            .collect();

        if candidates.len() == 1 {
            candidates[0]
        } else {
            candidates[rng.random_range(0..candidates.len())]
        }
    }
}

/// Adopts the smallest received label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LowestLabelListener;

impl ListenerRule for LowestLabelListener {
    fn name(&self) -> &str {
        "LOWEST"
    }

    fn choose_accepted_label<G: GraphModel + ?Sized>(
        &self,
        _graph: &G,
        listener: usize,
        received: &BTreeMap<usize, usize>,
        _rng: &mut dyn RngCore,
    ) -> usize {
        received.values().min().copied().unwrap_or(listener)
    }
}

/// Built-in speaker rules, selectable by identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Speaker {
    /// See [`UniformSpeaker`].
    #[default]
    Uniform,
    /// See [`LatestSpeaker`].
    Latest,
}

impl SpeakerRule for Speaker {
    fn name(&self) -> &str {
        match self {
            Speaker::Uniform => "UNIFORM",
            Speaker::Latest => "LATEST",
        }
    }

    fn choose_broadcast_label<G: GraphModel + ?Sized>(
        &self,
        graph: &G,
        speaker: usize,
        memory: &[usize],
        rng: &mut dyn RngCore,
    ) -> usize {
        match self {
            Speaker::Uniform => UniformSpeaker.choose_broadcast_label(graph, speaker, memory, rng),
            Speaker::Latest => LatestSpeaker.choose_broadcast_label(graph, speaker, memory, rng),
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Speaker {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UNIFORM" => Ok(Speaker::Uniform),
            "LATEST" => Ok(Speaker::Latest),
            other => Err(Error::invalid(
                "speakerRule",
                format!("unknown speaker rule '{other}'"),
            )),
        }
    }
}

/// Built-in listener rules, selectable by identifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Listener {
    /// See [`PopularityListener`].
    #[default]
    Popularity,
    /// See [`LowestLabelListener`].
    Lowest,
}

impl ListenerRule for Listener {
    fn name(&self) -> &str {
        match self {
            Listener::Popularity => "POPULARITY",
            Listener::Lowest => "LOWEST",
        }
    }

    fn choose_accepted_label<G: GraphModel + ?Sized>(
        &self,
        graph: &G,
        listener: usize,
        received: &BTreeMap<usize, usize>,
        rng: &mut dyn RngCore,
    ) -> usize {
        match self {
            Listener::Popularity => {
                PopularityListener.choose_accepted_label(graph, listener, received, rng)
            }
            Listener::Lowest => {
                LowestLabelListener.choose_accepted_label(graph, listener, received, rng)
            }
        }
    }
}

impl fmt::Display for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Listener {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "POPULARITY" => Ok(Listener::Popularity),
            "LOWEST" => Ok(Listener::Lowest),
            other => Err(Error::invalid(
                "listenerRule",
                format!("unknown listener rule '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AdjacencyList;
    use rand::rngs::StdRng;

    fn star() -> AdjacencyList {
        AdjacencyList::new(vec![vec![1, 2, 3], vec![], vec![], vec![]]).unwrap()
    }

    #[test]
    fn test_uniform_speaker_draws_from_memory() {
        let g = star();
        let mut rng = StdRng::seed_from_u64(42);
        let memory = [4, 4, 7, 9];
        for _ in 0..100 {
            let label = UniformSpeaker.choose_broadcast_label(&g, 1, &memory, &mut rng);
            assert!(memory.contains(&label));
        }
    }

    #[test]
    fn test_uniform_speaker_single_entry() {
        let g = star();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            UniformSpeaker.choose_broadcast_label(&g, 2, &[2], &mut rng),
            2
        );
    }

    #[test]
    fn test_latest_speaker() {
        let g = star();
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            LatestSpeaker.choose_broadcast_label(&g, 1, &[1, 3, 0], &mut rng),
            0
        );
        assert_eq!(LatestSpeaker.choose_broadcast_label(&g, 1, &[], &mut rng), 1);
    }

    #[test]
    fn test_popularity_listener_majority() {
        let g = star();
        let mut rng = StdRng::seed_from_u64(0);
        let received = BTreeMap::from([(1, 5), (2, 8), (3, 5)]);
        assert_eq!(
            PopularityListener.choose_accepted_label(&g, 0, &received, &mut rng),
            5
        );
    }

    #[test]
    fn test_popularity_listener_tie_picks_a_candidate() {
        let g = star();
        let mut rng = StdRng::seed_from_u64(7);
        let received = BTreeMap::from([(1, 5), (2, 8)]);
        for _ in 0..50 {
            let label = PopularityListener.choose_accepted_label(&g, 0, &received, &mut rng);
            assert!(label == 5 || label == 8);
        }
    }

    #[test]
    fn test_listeners_handle_empty_input() {
        let g = star();
        let mut rng = StdRng::seed_from_u64(0);
        let received = BTreeMap::new();
        assert_eq!(
            PopularityListener.choose_accepted_label(&g, 3, &received, &mut rng),
            3
        );
        assert_eq!(
            LowestLabelListener.choose_accepted_label(&g, 2, &received, &mut rng),
            2
        );
    }

    #[test]
    fn test_lowest_listener() {
        let g = star();
        let mut rng = StdRng::seed_from_u64(0);
        let received = BTreeMap::from([(1, 9), (2, 4), (3, 6)]);
        assert_eq!(
            LowestLabelListener.choose_accepted_label(&g, 0, &received, &mut rng),
            4
        );
    }

    #[test]
    fn test_rule_identifiers_parse() -> Result<()> {
        assert_eq!("UNIFORM".parse::<Speaker>()?, Speaker::Uniform);
        assert_eq!(" latest ".parse::<Speaker>()?, Speaker::Latest);
        assert_eq!("Popularity".parse::<Listener>()?, Listener::Popularity);
        assert_eq!("LOWEST".parse::<Listener>()?, Listener::Lowest);
        assert_eq!(Speaker::default().to_string(), "UNIFORM");
        assert_eq!(Listener::default().to_string(), "POPULARITY");
        assert!("loudest".parse::<Speaker>().is_err());
        assert!(matches!(
            "nearest".parse::<Listener>(),
            Err(Error::InvalidParameter {
                name: "listenerRule",
                ..
            })
        ));
        Ok(())
    }
}
