//! Extended speaker-listener label propagation (SLPA).
//!
//! Every node keeps a **memory** of labels, starting with its own index.
//! Each round visits all nodes in a fresh random order; the visited node
//! listens to one broadcast from each successor and appends the label it
//! accepts. After `memory_size - 1` rounds every memory holds `memory_size`
//! labels, and the memories are turned into a fuzzy cover (see
//! [`extract_cover`]).
//!
//! Updates are asynchronous within a round: a node visited later sees the
//! memories of neighbors already updated earlier in the same round.
//!
//! Directed graphs are handled by listening to out-neighbors only; on
//! undirected graphs this is the original SLPA.
//!
//! ## Complexity
//!
//! - Time: O(memory_size × E) rule invocations
//! - Space: O(memory_size × n)
//!
//! ## References
//!
//! Xie, Szymanski, Liu (2011). "SLPA: Uncovering Overlapping Communities in
//! Social Networks via A Speaker-listener Interaction Dynamic Process."

use super::cover::{extract_cover, Cover, CoverOrigin};
use super::rules::{Listener, ListenerRule, Speaker, SpeakerRule};
use super::traits::{AlgorithmType, Configurable, OverlappingCommunityDetection};
use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::graph::{GraphModel, GraphType};
use log::{debug, trace};
use rand::prelude::*;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::str::FromStr;

/// Parameter key for the memory size.
pub const MEMORY_SIZE_NAME: &str = "memorySize";
/// Parameter key for the probability threshold.
pub const PROBABILITY_THRESHOLD_NAME: &str = "probabilityThreshold";
/// Parameter key for the speaker rule identifier.
pub const SPEAKER_RULE_NAME: &str = "speakerRule";
/// Parameter key for the listener rule identifier.
pub const LISTENER_RULE_NAME: &str = "listenerRule";

/// Per-node label histories, indexed by node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memories {
    memories: Vec<Vec<usize>>,
}

impl Memories {
    /// One memory `[i]` per node `i`, with room for `capacity` labels each.
    fn init(n: usize, capacity: usize) -> Self {
        let memories = (0..n)
            .map(|i| {
                let mut memory = Vec::with_capacity(capacity);
                memory.push(i);
                memory
            })
            .collect();
        Self { memories }
    }

    /// Memory of `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is out of range.
    pub fn get(&self, node: usize) -> &[usize] {
        &self.memories[node]
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.memories.len()
    }

    /// Whether there are no nodes.
    pub fn is_empty(&self) -> bool {
        self.memories.is_empty()
    }

    /// Memories in node order.
    pub fn iter(&self) -> impl Iterator<Item = &[usize]> + '_ {
        self.memories.iter().map(Vec::as_slice)
    }

    /// Take the raw per-node vectors.
    pub fn into_inner(self) -> Vec<Vec<usize>> {
        self.memories
    }
}

impl From<Vec<Vec<usize>>> for Memories {
    fn from(memories: Vec<Vec<usize>>) -> Self {
        Self { memories }
    }
}

/// Speaker-listener label propagation detector.
///
/// ```rust
/// use slpa::{AdjacencyList, OverlappingCommunityDetection, Slpa};
///
/// let graph = AdjacencyList::from_edges(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]).unwrap();
/// let cover = Slpa::new()
///     .with_memory_size(5)
///     .with_probability_threshold(0.15)
///     .with_seed(42)
///     .detect_overlapping(&graph)
///     .unwrap();
///
/// assert_eq!(cover.node_count(), 4);
/// for row in cover.memberships().rows() {
///     assert!((row.sum() - 1.0).abs() < 1e-9);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Slpa<S = Speaker, L = Listener> {
    /// Memory length and (plus one) round count.
    memory_size: usize,
    /// Minimum relative label frequency kept in a cover row.
    probability_threshold: f64,
    speaker_rule: S,
    listener_rule: L,
    /// Random seed.
    seed: Option<u64>,
    cancellation: Option<CancellationToken>,
}

impl Slpa {
    /// Create a detector with default settings.
    pub fn new() -> Self {
        Self {
            memory_size: 100,
            probability_threshold: 0.15,
            speaker_rule: Speaker::default(),
            listener_rule: Listener::default(),
            seed: None,
            cancellation: None,
        }
    }
}

impl Default for Slpa {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, L> Slpa<S, L> {
    /// Set memory size (must be >= 1). Also fixes the round count at `memory_size - 1`.
    pub fn with_memory_size(mut self, memory_size: usize) -> Self {
        self.memory_size = memory_size;
        self
    }

    /// Set probability threshold (must be in `[0, 1]`).
    ///
    /// Values between 0.02 and 0.1 usually work well.
    pub fn with_probability_threshold(mut self, threshold: f64) -> Self {
        self.probability_threshold = threshold;
        self
    }

    /// Set random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Abandon runs once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Replace the speaker rule.
    pub fn with_speaker_rule<S2>(self, speaker_rule: S2) -> Slpa<S2, L> {
        Slpa {
            memory_size: self.memory_size,
            probability_threshold: self.probability_threshold,
            speaker_rule,
            listener_rule: self.listener_rule,
            seed: self.seed,
            cancellation: self.cancellation,
        }
    }

    /// Replace the listener rule.
    pub fn with_listener_rule<L2>(self, listener_rule: L2) -> Slpa<S, L2> {
        Slpa {
            memory_size: self.memory_size,
            probability_threshold: self.probability_threshold,
            speaker_rule: self.speaker_rule,
            listener_rule,
            seed: self.seed,
            cancellation: self.cancellation,
        }
    }

    /// Memory size.
    pub fn memory_size(&self) -> usize {
        self.memory_size
    }

    /// Probability threshold.
    pub fn probability_threshold(&self) -> f64 {
        self.probability_threshold
    }

    /// Speaker rule.
    pub fn speaker_rule(&self) -> &S {
        &self.speaker_rule
    }

    /// Listener rule.
    pub fn listener_rule(&self) -> &L {
        &self.listener_rule
    }

    /// Random seed, if set.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Check that the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        check_memory_size(self.memory_size)?;
        check_probability_threshold(self.probability_threshold)
    }

    fn check_cancelled(&self, round: usize) -> Result<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(Error::Cancelled { round }),
            _ => Ok(()),
        }
    }
}

impl<S: SpeakerRule, L: ListenerRule> Slpa<S, L> {
    /// Detect communities using a caller-supplied generator.
    ///
    /// All randomness of the run, including inside the rules, is drawn from
    /// `rng`.
    pub fn detect_with_rng<'g, G: GraphModel + ?Sized>(
        &self,
        graph: &'g G,
        rng: &mut dyn RngCore,
    ) -> Result<Cover<'g, G>> {
        let memories = self.propagate(graph, rng)?;
        let cover = extract_cover(
            graph,
            memories,
            self.memory_size,
            self.probability_threshold,
        )?
        .with_origin(CoverOrigin {
            algorithm: self.algorithm_type(),
            parameters: self.parameter_view(),
            compatible_graph_types: self.compatible_graph_types(),
        });

        debug!(
            "slpa: {} nodes assigned to {} communities",
            cover.node_count(),
            cover.community_count()
        );
        Ok(cover)
    }

    /// Run the propagation phase only and return the final memories.
    pub fn propagate<G: GraphModel + ?Sized>(
        &self,
        graph: &G,
        rng: &mut dyn RngCore,
    ) -> Result<Memories> {
        self.validate()?;

        let n = graph.node_count();
        debug!(
            "slpa: {} nodes, memory size {}, speaker {}, listener {}",
            n,
            self.memory_size,
            self.speaker_rule.name(),
            self.listener_rule.name()
        );

        let mut memories = Memories::init(n, self.memory_size);
        let mut order: Vec<usize> = graph.nodes().collect();
        self.check_cancelled(0)?;

        for round in 1..self.memory_size {
            // Fisher-Yates, one `random_range` draw per position, descending.
            for i in (1..order.len()).rev() {
                let j = rng.random_range(0..=i);
                order.swap(i, j);
            }

            for &listener in &order {
                self.check_cancelled(round)?;
                let label = self.next_label(graph, &memories, listener, rng);
                memories.memories[listener].push(label);
            }

            trace!("slpa: round {}/{} done", round, self.memory_size - 1);
        }

        Ok(memories)
    }

    /// Collect one broadcast per successor and let the listener choose.
    fn next_label<G: GraphModel + ?Sized>(
        &self,
        graph: &G,
        memories: &Memories,
        listener: usize,
        rng: &mut dyn RngCore,
    ) -> usize {
        let mut received = BTreeMap::new();
        for speaker in graph.successors(listener) {
            let label =
                self.speaker_rule
                    .choose_broadcast_label(graph, speaker, memories.get(speaker), rng);
            received.insert(speaker, label);
        }
        self.listener_rule
            .choose_accepted_label(graph, listener, &received, rng)
    }

    fn parameter_view(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (MEMORY_SIZE_NAME.to_string(), self.memory_size.to_string()),
            (
                PROBABILITY_THRESHOLD_NAME.to_string(),
                self.probability_threshold.to_string(),
            ),
            (
                SPEAKER_RULE_NAME.to_string(),
                self.speaker_rule.name().to_string(),
            ),
            (
                LISTENER_RULE_NAME.to_string(),
                self.listener_rule.name().to_string(),
            ),
        ])
    }
}

impl<S: SpeakerRule, L: ListenerRule> OverlappingCommunityDetection for Slpa<S, L> {
    fn detect_overlapping<'g, G: GraphModel + ?Sized>(
        &self,
        graph: &'g G,
    ) -> Result<Cover<'g, G>> {
        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        self.detect_with_rng(graph, rng.as_mut())
    }

    fn algorithm_type(&self) -> AlgorithmType {
        AlgorithmType::ExtendedSpeakerListenerLabelPropagation
    }

    fn compatible_graph_types(&self) -> BTreeSet<GraphType> {
        BTreeSet::from([GraphType::Weighted, GraphType::Directed])
    }
}

impl<S, L> Configurable for Slpa<S, L>
where
    S: SpeakerRule + FromStr<Err = Error>,
    L: ListenerRule + FromStr<Err = Error>,
{
    fn parameters(&self) -> BTreeMap<String, String> {
        self.parameter_view()
    }

    fn apply_parameters(&mut self, mut parameters: HashMap<String, String>) -> Result<()> {
        let memory_size = match parameters.remove(MEMORY_SIZE_NAME) {
            Some(value) => {
                let size = value.trim().parse::<usize>().map_err(|e| {
                    Error::invalid(MEMORY_SIZE_NAME, format!("'{value}' is not an integer: {e}"))
                })?;
                check_memory_size(size)?;
                Some(size)
            }
            None => None,
        };
        let probability_threshold = match parameters.remove(PROBABILITY_THRESHOLD_NAME) {
            Some(value) => {
                let threshold = value.trim().parse::<f64>().map_err(|e| {
                    Error::invalid(
                        PROBABILITY_THRESHOLD_NAME,
                        format!("'{value}' is not a number: {e}"),
                    )
                })?;
                check_probability_threshold(threshold)?;
                Some(threshold)
            }
            None => None,
        };
        let speaker_rule = parameters
            .remove(SPEAKER_RULE_NAME)
            .map(|value| value.parse::<S>())
            .transpose()?;
        let listener_rule = parameters
            .remove(LISTENER_RULE_NAME)
            .map(|value| value.parse::<L>())
            .transpose()?;

        if !parameters.is_empty() {
            let mut keys: Vec<String> = parameters.into_keys().collect();
            keys.sort();
            return Err(Error::UnrecognizedParameters(keys));
        }

        if let Some(size) = memory_size {
            self.memory_size = size;
        }
        if let Some(threshold) = probability_threshold {
            self.probability_threshold = threshold;
        }
        if let Some(rule) = speaker_rule {
            self.speaker_rule = rule;
        }
        if let Some(rule) = listener_rule {
            self.listener_rule = rule;
        }
        Ok(())
    }
}

pub(super) fn check_memory_size(memory_size: usize) -> Result<()> {
    if memory_size == 0 {
        return Err(Error::invalid(MEMORY_SIZE_NAME, "must be >= 1"));
    }
    Ok(())
}

pub(super) fn check_probability_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Error::invalid(
            PROBABILITY_THRESHOLD_NAME,
            format!("must be in [0, 1], got {threshold}"),
        ));
    }
    Ok(())
}
