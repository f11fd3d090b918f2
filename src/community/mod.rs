//! Overlapping community detection by label propagation.
//!
//! Hard partitions force every node into exactly one group. In many networks
//! nodes genuinely sit between groups: a researcher publishing in two fields,
//! a router bridging two subnets. An **overlapping** detector returns, for
//! each node, a distribution of membership degrees over the communities.
//!
//! ## Speaker-Listener Label Propagation
//!
//! SLPA ([Xie et al. 2011](https://arxiv.org/abs/1109.5720)) extends plain
//! label propagation with per-node memory:
//!
//! 1. **Initialize**: node `i` remembers the single label `i`.
//! 2. **Propagate**: for `T = memory_size - 1` rounds, visit nodes in random
//!    order. Each successor of the visited node (the listener) speaks one
//!    label from its memory; the listener accepts one and remembers it.
//! 3. **Post-process**: turn each memory into a label histogram, drop labels
//!    rarer than the probability threshold `r`, and normalize what is left.
//!
//! ```text
//! memory(i) = [i, l₁, l₂, …, l_T]
//! degree(i, c) = count_i(c) / Σ_{kept c'} count_i(c')
//! ```
//!
//! Unlike plain label propagation, nothing is ever overwritten: a label that
//! a node keeps hearing accumulates in its memory, and a label it only
//! occasionally hears survives as a minor membership if it clears `r`.
//!
//! ## The Threshold `r`
//!
//! - **small r** (0.02–0.1): many overlapping memberships
//! - **large r** (≥ 0.5): approaches a hard partition
//!
//! The most frequent label of each node is always kept, so no node ends up
//! without a community.
//!
//! ## Pluggable Rules
//!
//! How speakers pick what to say and listeners what to accept is delegated to
//! [`SpeakerRule`] and [`ListenerRule`]. The defaults are a uniform speaker
//! and a popularity listener; see [`rules`] for the built-in policies.
//!
//! ## Usage
//!
//! ```rust
//! use petgraph::graph::DiGraph;
//! use slpa::community::{OverlappingCommunityDetection, Slpa};
//!
//! let mut graph = DiGraph::<(), ()>::new();
//! let a = graph.add_node(());
//! let b = graph.add_node(());
//! let c = graph.add_node(());
//! graph.add_edge(a, b, ());
//! graph.add_edge(b, c, ());
//! graph.add_edge(c, a, ());
//!
//! let cover = Slpa::new().with_seed(7).detect_overlapping(&graph).unwrap();
//! // cover.membership(i, c) = degree of node i in community c
//! assert_eq!(cover.node_count(), 3);
//! ```
//!
//! ## References
//!
//! - Xie, Szymanski, Liu (2011). "SLPA: Uncovering Overlapping Communities in
//!   Social Networks via A Speaker-listener Interaction Dynamic Process."
//! - Raghavan, Albert, Kumara (2007). "Near linear time algorithm to detect
//!   community structures in large-scale networks."

mod cover;
pub mod rules;
mod slpa;
mod traits;

pub use cover::{
    extract_cover, label_histogram, CommunityRegistry, Cover, CoverOrigin, FilteredHistogram,
    Histogram,
};
pub use rules::{
    LatestSpeaker, Listener, ListenerRule, LowestLabelListener, PopularityListener, Speaker,
    SpeakerRule, UniformSpeaker,
};
pub use slpa::{
    Memories, Slpa, LISTENER_RULE_NAME, MEMORY_SIZE_NAME, PROBABILITY_THRESHOLD_NAME,
    SPEAKER_RULE_NAME,
};
pub use traits::{AlgorithmType, Configurable, OverlappingCommunityDetection};
