//! Community detection traits.

use super::cover::Cover;
use crate::error::Result;
use crate::graph::{GraphModel, GraphType};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Identifies the algorithm that produced a cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlgorithmType {
    /// Unknown or external origin.
    Undefined,
    /// Extended speaker-listener label propagation.
    ExtendedSpeakerListenerLabelPropagation,
}

impl fmt::Display for AlgorithmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlgorithmType::Undefined => write!(f, "UNDEFINED"),
            AlgorithmType::ExtendedSpeakerListenerLabelPropagation => {
                write!(f, "EXTENDED_SPEAKER_LISTENER_LABEL_PROPAGATION_ALGORITHM")
            }
        }
    }
}

/// Trait for overlapping community detection algorithms.
pub trait OverlappingCommunityDetection {
    /// Detect overlapping communities in a graph.
    ///
    /// Returns a cover whose rows are the nodes' membership distributions.
    fn detect_overlapping<'g, G: GraphModel + ?Sized>(&self, graph: &'g G)
        -> Result<Cover<'g, G>>;

    /// Which algorithm this is.
    fn algorithm_type(&self) -> AlgorithmType;

    /// Graph types the algorithm handles.
    ///
    /// Advisory only: detection does not reject other graphs.
    fn compatible_graph_types(&self) -> BTreeSet<GraphType>;
}

/// String-keyed parameter view for hosting layers.
pub trait Configurable {
    /// Current parameters, stringified.
    fn parameters(&self) -> BTreeMap<String, String>;

    /// Consume recognized keys from `parameters` and apply them.
    ///
    /// Fails if a value is invalid or keys remain after the known ones are
    /// removed. On failure nothing is applied.
    fn apply_parameters(&mut self, parameters: HashMap<String, String>) -> Result<()>;
}
